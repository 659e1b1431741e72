// ==========================================
// 生产订单分配排产系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体与基础类型
// 红线: 不含数据访问逻辑, 不含引擎逻辑
// ==========================================

pub mod order;
pub mod schedule;
pub mod types;
pub mod worker;

// 重导出核心类型
pub use order::Order;
pub use schedule::{Allocation, WorkSchedule};
pub use types::{OrderPhase, PriorityLevel, WorkerId};
pub use worker::Worker;
