// ==========================================
// 生产订单分配排产系统 - 订单领域模型
// ==========================================
// 主键: 单据号 doc_number (产品代码不唯一, 多个订单可共享)
// 红线: 模型不校验 consumed <= ordered, 负的剩余量由调度侧视为已满足
// ==========================================

use crate::domain::types::PriorityLevel;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// Order - 生产订单
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    // ===== 标识 =====
    pub doc_number: String,   // 单据号 (唯一键)
    pub product_code: String, // 产品代码 (不唯一)

    // ===== 属性 =====
    pub description: String,          // 描述
    pub ordered_qty: i64,             // 订货数量
    pub consumed_qty: i64,            // 已完成数量
    pub cycle_time_hours: f64,        // 节拍 (小时/件)
    pub doc_date: NaiveDate,          // 单据日期
    pub due_date: NaiveDate,          // 交付期
    pub priority_manual: Option<i32>, // 人工优先级覆盖 (0-5)

    // ===== 派生状态 =====
    pub calculated_priority: PriorityLevel, // 计算优先级 (默认中等)
}

impl Order {
    /// 剩余待产数量
    ///
    /// consumed > ordered 时为负, 调度侧按"已满足"处理
    pub fn pending_qty(&self) -> i64 {
        self.ordered_qty - self.consumed_qty
    }

    /// 剩余工时 (小时)
    pub fn remaining_work_hours(&self) -> f64 {
        self.pending_qty() as f64 * self.cycle_time_hours
    }

    /// 完成订单所需总工时 (小时)
    pub fn total_work_hours(&self) -> f64 {
        self.ordered_qty as f64 * self.cycle_time_hours
    }

    /// 已完成工时 (小时)
    pub fn consumed_work_hours(&self) -> f64 {
        self.consumed_qty as f64 * self.cycle_time_hours
    }

    /// 是否已完成 (consumed 达到/超过 ordered)
    pub fn is_complete(&self) -> bool {
        self.consumed_qty >= self.ordered_qty
    }
}
