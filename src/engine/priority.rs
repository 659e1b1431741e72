// ==========================================
// 生产订单分配排产系统 - 优先级计算引擎
// ==========================================
// 纯函数: (Order, today) → PriorityLevel, 同输入必同输出
// 红线: 人工覆盖永远优先, 仅做高侧截断
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::PriorityLevel;
use chrono::NaiveDate;

// ==========================================
// PriorityCalculator - 优先级计算器
// ==========================================
#[derive(Debug, Clone)]
pub struct PriorityCalculator {
    /// 紧急度阈值 (天, 升序): [高紧急, 中紧急, 低紧急]
    urgency_thresholds: [i64; 3],
    /// 大单阈值 (小时): 剩余工时超过则加一级
    size_threshold_hours: f64,
}

impl PriorityCalculator {
    /// 构造函数
    ///
    /// # 参数
    /// - `urgency_thresholds`: 三档升序天数阈值
    /// - `size_threshold_hours`: 大单工时阈值
    pub fn new(urgency_thresholds: [i64; 3], size_threshold_hours: f64) -> Self {
        Self {
            urgency_thresholds,
            size_threshold_hours,
        }
    }

    /// 计算订单优先级
    ///
    /// 规则:
    /// 1. 有人工覆盖时直接返回 min(覆盖值, 5), 不做低侧截断
    ///    (负覆盖按原样通过, 表示层饱和为 Low)
    /// 2. 否则 紧急度(0-3) + 大单位(0-1) + 1, 上限 5
    ///    "+1" 保证任何订单至少为 1 级
    ///
    /// # 参数
    /// - `order`: 待评估订单
    /// - `today`: 当前日期
    ///
    /// # 返回
    /// 优先级等级 (0-5)
    pub fn compute_priority(&self, order: &Order, today: NaiveDate) -> PriorityLevel {
        // 1. 人工覆盖优先
        if let Some(manual) = order.priority_manual {
            return PriorityLevel::from_value(manual.min(5));
        }

        // 2. 紧急度: 距交付期剩余天数落入的阈值档
        let days_left = (order.due_date - today).num_days();
        let [t_high, t_med, t_low] = self.urgency_thresholds;
        let urgency = if days_left <= t_high {
            3
        } else if days_left <= t_med {
            2
        } else if days_left <= t_low {
            1
        } else {
            0
        };

        // 3. 大单位: 剩余工时超阈值加一级
        let size = if order.remaining_work_hours() > self.size_threshold_hours {
            1
        } else {
            0
        };

        PriorityLevel::from_value((urgency + size + 1).min(5))
    }
}
