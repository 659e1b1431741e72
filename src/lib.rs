// ==========================================
// 生产订单分配排产系统 - 核心库
// ==========================================
// 技术栈: Tokio + Rust + SQLite
// 系统定位: 多代理竞标式产能分配 (协调者统一裁决)
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎层 - 优先级、排产与事件总线
pub mod engine;

// 代理层 - 协调者与工位代理
pub mod agent;

// 导入层 - 订单数据源监控
pub mod importer;

// 数据仓储层 - SQLite 镜像
pub mod repository;

// API 层 - 排产看板
pub mod api;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{OrderPhase, PriorityLevel, WorkerId};

// 领域实体
pub use domain::{Allocation, Order, Worker, WorkSchedule};

// 引擎
pub use engine::{CapacityScheduler, EventBus, EventReceivers, PlanningEvent, PriorityCalculator};

// 代理
pub use agent::{CoordinatorAgent, WorkerAgent};

// API
pub use api::board::{BoardSnapshot, PlanningBoard};

// 配置
pub use config::AppConfig;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产订单分配排产系统";

// ==========================================
// 预编译检查
// ==========================================

// 确保编译时所有模块可见
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
