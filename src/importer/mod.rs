// ==========================================
// 生产订单分配排产系统 - 摄取层
// ==========================================
// 职责: 外部订单数据接入, 转换为内部事件
// 支持: Excel (.xlsx/.xls), CSV (.csv)
// ==========================================

pub mod error;
pub mod order_feed;

pub use error::FeedError;
pub use order_feed::OrderFeedMonitor;
