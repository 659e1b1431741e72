// ==========================================
// 生产订单分配排产系统 - 工人领域模型
// ==========================================
// 红线: 可用工时表只允许调度逻辑修改, 不存在并发写入方
// ==========================================

use crate::domain::types::WorkerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// ==========================================
// Worker - 工人 (产能载体)
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
    // ===== 标识 =====
    pub id: WorkerId, // 整数标识

    // ===== 属性 =====
    pub name: String,       // 姓名
    pub hours_per_day: f64, // 名义日工时

    /// 技能集 (可生产的产品代码)
    ///
    /// 空集合表示"全能工", 对所有产品代码均合格
    #[serde(default)]
    pub skills: HashSet<String>,

    /// 按日可用工时表
    ///
    /// 未出现的日期默认为名义日工时, 被分配后逐步扣减
    #[serde(default)]
    pub availability: HashMap<NaiveDate, f64>,
}

impl Worker {
    /// 构造函数 (空技能集, 空可用表)
    pub fn new(id: WorkerId, name: impl Into<String>, hours_per_day: f64) -> Self {
        Self {
            id,
            name: name.into(),
            hours_per_day,
            skills: HashSet::new(),
            availability: HashMap::new(),
        }
    }

    /// 指定日期的可用工时
    pub fn available_hours(&self, day: NaiveDate) -> f64 {
        self.availability
            .get(&day)
            .copied()
            .unwrap_or(self.hours_per_day)
    }

    /// 在指定日期分配工时
    ///
    /// # 参数
    /// - `day`: 分配日期
    /// - `hours`: 期望分配的工时
    ///
    /// # 返回
    /// 实际分配的工时 = min(可用工时, 期望工时), 并同步扣减可用表
    pub fn allocate_hours(&mut self, day: NaiveDate, hours: f64) -> f64 {
        let available = self.available_hours(day);
        let allocated = available.min(hours);
        self.availability.insert(day, available - allocated);
        allocated
    }

    /// 重置可用工时表 (恢复满产能)
    ///
    /// 全量重排前调用
    pub fn reset_availability(&mut self) {
        self.availability.clear();
    }

    /// 资格判定: 技能集为空或包含该产品代码
    pub fn is_eligible(&self, product_code: &str) -> bool {
        self.skills.is_empty() || self.skills.contains(product_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_available_hours_defaults_to_nominal() {
        let worker = Worker::new(1, "张三", 8.0);
        assert!((worker.available_hours(day(1)) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_allocate_hours_decrements_availability() {
        let mut worker = Worker::new(1, "张三", 8.0);
        let allocated = worker.allocate_hours(day(1), 5.0);
        assert!((allocated - 5.0).abs() < f64::EPSILON);
        assert!((worker.available_hours(day(1)) - 3.0).abs() < f64::EPSILON);

        // 超出剩余量时只分配剩余部分
        let allocated = worker.allocate_hours(day(1), 5.0);
        assert!((allocated - 3.0).abs() < f64::EPSILON);
        assert!(worker.available_hours(day(1)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_reset_availability_restores_full_capacity() {
        let mut worker = Worker::new(1, "张三", 8.0);
        worker.allocate_hours(day(1), 8.0);
        worker.reset_availability();
        assert!((worker.available_hours(day(1)) - 8.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_eligibility_empty_skills_accepts_all() {
        let mut worker = Worker::new(1, "李四", 8.0);
        assert!(worker.is_eligible("P-100"));

        worker.skills.insert("P-200".to_string());
        assert!(worker.is_eligible("P-200"));
        assert!(!worker.is_eligible("P-100"));
    }
}
