// ==========================================
// 生产订单分配排产系统 - 排产计划领域模型
// ==========================================
// 计划为只增集合, 被替代的分配不删除, 整表重建时整体更换
// 规模假设: 数十名工人 / 数百订单 / 滚动数十天, 线性扫描即可
// ==========================================

use crate::domain::types::WorkerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Allocation - 工时分配
// ==========================================
// 不可变三元组 (订单, 工人, 日期) + 工时, 完成标志由进度上报回填
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Allocation {
    pub doc_number: String,    // 订单单据号
    pub worker_id: WorkerId,   // 工人标识
    pub date: NaiveDate,       // 分配日期
    pub hours: f64,            // 分配工时
    pub completed: bool,       // 完成标志
}

impl Allocation {
    pub fn new(doc_number: impl Into<String>, worker_id: WorkerId, date: NaiveDate, hours: f64) -> Self {
        Self {
            doc_number: doc_number.into(),
            worker_id,
            date,
            hours,
            completed: false,
        }
    }

    /// 分配的唯一键
    pub fn key(&self) -> String {
        format!("{}_{}_{}", self.doc_number, self.worker_id, self.date)
    }
}

// ==========================================
// WorkSchedule - 排产计划
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub allocations: Vec<Allocation>,
}

impl WorkSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一条分配
    pub fn add_allocation(&mut self, allocation: Allocation) {
        self.allocations.push(allocation);
    }

    /// 按工人查询
    pub fn worker_schedule(&self, worker_id: WorkerId) -> Vec<&Allocation> {
        self.allocations
            .iter()
            .filter(|a| a.worker_id == worker_id)
            .collect()
    }

    /// 按订单查询
    pub fn order_schedule(&self, doc_number: &str) -> Vec<&Allocation> {
        self.allocations
            .iter()
            .filter(|a| a.doc_number == doc_number)
            .collect()
    }

    /// 按日期查询
    pub fn day_schedule(&self, day: NaiveDate) -> Vec<&Allocation> {
        self.allocations
            .iter()
            .filter(|a| a.date == day)
            .collect()
    }

    /// 订单累计分配工时
    pub fn hours_for_order(&self, doc_number: &str) -> f64 {
        self.allocations
            .iter()
            .filter(|a| a.doc_number == doc_number)
            .map(|a| a.hours)
            .sum()
    }

    /// 标记首条匹配 (订单, 工人, 日期) 的分配为已完成
    ///
    /// # 返回
    /// 是否找到并标记
    pub fn mark_completed(&mut self, doc_number: &str, worker_id: WorkerId, day: NaiveDate) -> bool {
        for allocation in self.allocations.iter_mut() {
            if allocation.doc_number == doc_number
                && allocation.worker_id == worker_id
                && allocation.date == day
            {
                allocation.completed = true;
                return true;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn sample_schedule() -> WorkSchedule {
        let mut schedule = WorkSchedule::new();
        schedule.add_allocation(Allocation::new("DOC-001", 1, day(1), 4.0));
        schedule.add_allocation(Allocation::new("DOC-001", 2, day(1), 2.0));
        schedule.add_allocation(Allocation::new("DOC-002", 1, day(2), 8.0));
        schedule
    }

    #[test]
    fn test_queries_by_worker_order_day() {
        let schedule = sample_schedule();
        assert_eq!(schedule.worker_schedule(1).len(), 2);
        assert_eq!(schedule.order_schedule("DOC-001").len(), 2);
        assert_eq!(schedule.day_schedule(day(1)).len(), 2);
        assert_eq!(schedule.day_schedule(day(3)).len(), 0);
    }

    #[test]
    fn test_hours_for_order_accumulates() {
        let schedule = sample_schedule();
        assert!((schedule.hours_for_order("DOC-001") - 6.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_mark_completed_first_match_only() {
        let mut schedule = sample_schedule();
        assert!(schedule.mark_completed("DOC-001", 1, day(1)));
        assert!(schedule.allocations[0].completed);
        assert!(!schedule.allocations[1].completed);
        assert!(!schedule.mark_completed("DOC-009", 1, day(1)));
    }

    #[test]
    fn test_allocation_key_unique_per_triple() {
        let a = Allocation::new("DOC-001", 1, day(1), 4.0);
        assert_eq!(a.key(), "DOC-001_1_2026-03-01");
    }
}
