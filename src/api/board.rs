// ==========================================
// 生产订单分配排产系统 - 排产看板 (只读查询面)
// ==========================================
// 职责: 向外部观察者 (看板/持久化) 暴露只读查询
// 写入方只有协调者; 收到 ScheduleUpdated 后观察者来此读取
// ==========================================

use crate::domain::order::Order;
use crate::domain::schedule::{Allocation, WorkSchedule};
use crate::domain::types::WorkerId;
use crate::domain::worker::Worker;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

// ==========================================
// BoardSnapshot - 看板快照
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct BoardSnapshot {
    pub orders: Vec<Order>,
    pub workers: Vec<Worker>,
    pub schedule: WorkSchedule,
    pub delays: HashMap<String, i64>,
    pub worker_load: HashMap<WorkerId, HashMap<NaiveDate, f64>>,
    pub progress: HashMap<String, f64>,
}

// ==========================================
// PlanningBoard - 共享看板
// ==========================================
#[derive(Clone, Default)]
pub struct PlanningBoard {
    inner: Arc<RwLock<BoardSnapshot>>,
}

impl PlanningBoard {
    pub fn new() -> Self {
        Self::default()
    }

    // 快照整体替换, 不存在半更新状态, 锁中毒时内层数据仍完整
    fn read(&self) -> std::sync::RwLockReadGuard<'_, BoardSnapshot> {
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// 发布新快照 (仅协调者调用)
    pub fn publish(&self, snapshot: BoardSnapshot) {
        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *guard = snapshot;
    }

    /// 完整快照 (克隆)
    pub fn snapshot(&self) -> BoardSnapshot {
        self.read().clone()
    }

    /// 按工人查询分配
    pub fn worker_schedule(&self, worker_id: WorkerId) -> Vec<Allocation> {
        self.read()
            .schedule
            .worker_schedule(worker_id)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 按订单查询分配
    pub fn order_schedule(&self, doc_number: &str) -> Vec<Allocation> {
        self.read()
            .schedule
            .order_schedule(doc_number)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 按日期查询分配
    pub fn day_schedule(&self, day: NaiveDate) -> Vec<Allocation> {
        self.read()
            .schedule
            .day_schedule(day)
            .into_iter()
            .cloned()
            .collect()
    }

    /// 延期表: 单据号 → 延期天数
    pub fn delay_map(&self) -> HashMap<String, i64> {
        self.read().delays.clone()
    }

    /// 工人负荷表: 工人 → 日期 → 工时
    pub fn worker_load_map(&self) -> HashMap<WorkerId, HashMap<NaiveDate, f64>> {
        self.read().worker_load.clone()
    }

    /// 进度表: 单据号 → 百分比
    pub fn progress_map(&self) -> HashMap<String, f64> {
        self.read().progress.clone()
    }

    /// 当前订单清单
    pub fn orders(&self) -> Vec<Order> {
        self.read().orders.clone()
    }

    /// 当前工人清单
    pub fn workers(&self) -> Vec<Worker> {
        self.read().workers.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schedule::Allocation;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn test_publish_replaces_snapshot() {
        let board = PlanningBoard::new();
        assert!(board.orders().is_empty());

        let mut schedule = WorkSchedule::new();
        schedule.add_allocation(Allocation::new("DOC-001", 1, day(1), 4.0));

        let mut delays = HashMap::new();
        delays.insert("DOC-001".to_string(), 2i64);

        board.publish(BoardSnapshot {
            schedule,
            delays,
            ..Default::default()
        });

        assert_eq!(board.worker_schedule(1).len(), 1);
        assert_eq!(board.order_schedule("DOC-001").len(), 1);
        assert_eq!(board.day_schedule(day(1)).len(), 1);
        assert_eq!(board.delay_map()["DOC-001"], 2);
    }

    #[test]
    fn test_clones_share_state() {
        let board = PlanningBoard::new();
        let other = board.clone();

        let mut schedule = WorkSchedule::new();
        schedule.add_allocation(Allocation::new("DOC-002", 7, day(2), 3.0));
        board.publish(BoardSnapshot {
            schedule,
            ..Default::default()
        });

        assert_eq!(other.worker_schedule(7).len(), 1);
    }
}
