// ==========================================
// 生产订单分配排产系统 - 引擎层
// ==========================================
// 职责: 优先级模型 / 贪心产能调度 / 事件与总线
// 红线: 引擎为纯计算, 不持有通道, 不做 IO
// ==========================================

pub mod events;
pub mod priority;
pub mod scheduler;

// 重导出核心引擎
pub use events::{EventBus, EventReceivers, PlanningEvent};
pub use priority::PriorityCalculator;
pub use scheduler::CapacityScheduler;
