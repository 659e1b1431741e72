// ==========================================
// 集成测试共享辅助
// ==========================================
// 提供订单/工人构造与固定日期工具
// ==========================================

use chrono::NaiveDate;
use order_allocation_aps::domain::types::PriorityLevel;
use order_allocation_aps::domain::{Order, Worker};

/// 2026-03 固定测试日期
#[allow(dead_code)]
pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, d).expect("valid test date")
}

/// 构造测试订单
#[allow(dead_code)]
pub fn make_order(doc_number: &str, ordered_qty: i64, cycle_time_hours: f64, due: NaiveDate) -> Order {
    Order {
        doc_number: doc_number.to_string(),
        product_code: "P-100".to_string(),
        description: "测试产品".to_string(),
        ordered_qty,
        consumed_qty: 0,
        cycle_time_hours,
        doc_date: day(1),
        due_date: due,
        priority_manual: None,
        calculated_priority: PriorityLevel::default(),
    }
}

/// 构造测试工人
#[allow(dead_code)]
pub fn make_worker(id: u32, hours_per_day: f64) -> Worker {
    Worker::new(id, format!("工位-{}", id), hours_per_day)
}
