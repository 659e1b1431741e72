// ==========================================
// 生产订单分配排产系统 - 仓储模块
// ==========================================

pub mod error;
pub mod mirror;
pub mod schedule_repository;

pub use error::RepositoryError;
pub use mirror::spawn_mirror_task;
pub use schedule_repository::ScheduleRepository;
