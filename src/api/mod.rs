// ==========================================
// 生产订单分配排产系统 - 对外查询层
// ==========================================
// 职责: 外部观察者的只读查询面
// ==========================================

pub mod board;

pub use board::{BoardSnapshot, PlanningBoard};
