// ==========================================
// 生产订单分配排产系统 - 领域类型定义
// ==========================================
// 职责: 定义优先级等级、订单阶段等基础类型
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 工人标识
pub type WorkerId = u32;

// ==========================================
// 优先级等级 (Priority Level)
// ==========================================
// 序数 0 (低) 到 5 (红线), 全序, 同时用于排序键和展示
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PriorityLevel {
    Low,        // 0 低
    MediumLow,  // 1 中低
    Medium,     // 2 中 (默认)
    MediumHigh, // 3 中高
    High,       // 4 高
    Critical,   // 5 红线
}

impl PriorityLevel {
    /// 转换为序数值 (0-5)
    pub fn value(&self) -> i32 {
        match self {
            PriorityLevel::Low => 0,
            PriorityLevel::MediumLow => 1,
            PriorityLevel::Medium => 2,
            PriorityLevel::MediumHigh => 3,
            PriorityLevel::High => 4,
            PriorityLevel::Critical => 5,
        }
    }

    /// 从序数值构造 (展示用, 两端饱和)
    ///
    /// # 参数
    /// - `value`: 序数值, 超出 [0, 5] 时向边界饱和
    pub fn from_value(value: i32) -> Self {
        match value {
            i32::MIN..=0 => PriorityLevel::Low,
            1 => PriorityLevel::MediumLow,
            2 => PriorityLevel::Medium,
            3 => PriorityLevel::MediumHigh,
            4 => PriorityLevel::High,
            _ => PriorityLevel::Critical,
        }
    }
}

impl Default for PriorityLevel {
    fn default() -> Self {
        PriorityLevel::Medium
    }
}

impl fmt::Display for PriorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriorityLevel::Low => write!(f, "LOW"),
            PriorityLevel::MediumLow => write!(f, "MEDIUM_LOW"),
            PriorityLevel::Medium => write!(f, "MEDIUM"),
            PriorityLevel::MediumHigh => write!(f, "MEDIUM_HIGH"),
            PriorityLevel::High => write!(f, "HIGH"),
            PriorityLevel::Critical => write!(f, "CRITICAL"),
        }
    }
}

// ==========================================
// 订单阶段 (Order Phase)
// ==========================================
// 状态机: New → BiddingOpen → Allocated → (更新回访) → Completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderPhase {
    New,         // 新建, 尚未开启竞标
    BiddingOpen, // 竞标进行中
    Allocated,   // 已分配工时
    Completed,   // 已完成 (consumed >= ordered)
}

impl fmt::Display for OrderPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderPhase::New => write!(f, "NEW"),
            OrderPhase::BiddingOpen => write!(f, "BIDDING_OPEN"),
            OrderPhase::Allocated => write!(f, "ALLOCATED"),
            OrderPhase::Completed => write!(f, "COMPLETED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_level_total_order() {
        assert!(PriorityLevel::Critical > PriorityLevel::High);
        assert!(PriorityLevel::High > PriorityLevel::Medium);
        assert!(PriorityLevel::MediumLow > PriorityLevel::Low);
    }

    #[test]
    fn test_priority_level_value_round_trip() {
        for v in 0..=5 {
            assert_eq!(PriorityLevel::from_value(v).value(), v);
        }
    }

    #[test]
    fn test_priority_level_from_value_saturates() {
        assert_eq!(PriorityLevel::from_value(-3), PriorityLevel::Low);
        assert_eq!(PriorityLevel::from_value(9), PriorityLevel::Critical);
    }

    #[test]
    fn test_default_is_medium() {
        assert_eq!(PriorityLevel::default(), PriorityLevel::Medium);
    }
}
