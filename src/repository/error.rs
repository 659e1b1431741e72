// ==========================================
// 生产订单分配排产系统 - 持久化层错误类型
// ==========================================

use thiserror::Error;

/// 持久化层错误
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("数据库错误: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("连接锁获取失败")]
    LockPoisoned,

    #[error("数据反序列化失败: {0}")]
    Deserialize(String),
}
