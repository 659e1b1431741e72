// ==========================================
// 生产订单分配排产系统 - 智能体层
// ==========================================
// 职责: 协调者与逐工人智能体的消息驱动循环
// 并发模型: 协作式, 每个智能体只在等待下一条消息时挂起
// ==========================================

pub mod coordinator;
pub mod worker;

pub use coordinator::CoordinatorAgent;
pub use worker::WorkerAgent;
