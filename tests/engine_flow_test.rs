// ==========================================
// 引擎层集成测试
// ==========================================
// 测试目标: 优先级模型 + 整表重建排产 + 派生报表的端到端一致性
// ==========================================

mod test_helpers;

use order_allocation_aps::domain::types::PriorityLevel;
use order_allocation_aps::engine::{CapacityScheduler, PriorityCalculator};
use test_helpers::{day, make_order, make_worker};

fn scheduler() -> CapacityScheduler {
    CapacityScheduler::new(PriorityCalculator::new([2, 5, 10], 8.0))
}

#[test]
fn test_urgent_order_preempts_capacity() {
    // 紧急订单 (明日交付) 与宽松订单争夺同一工人
    let mut orders = vec![
        make_order("DOC-RELAXED", 16, 1.0, day(30)),
        make_order("DOC-URGENT", 16, 1.0, day(2)),
    ];
    let mut workers = vec![make_worker(1, 8.0)];

    let schedule = scheduler().create_schedule(&mut orders, &mut workers, day(1), 14);

    // 紧急订单占据前两天, 宽松订单从第三天开始
    let urgent_first = schedule
        .order_schedule("DOC-URGENT")
        .iter()
        .map(|a| a.date)
        .min()
        .expect("urgent order should be scheduled");
    let relaxed_first = schedule
        .order_schedule("DOC-RELAXED")
        .iter()
        .map(|a| a.date)
        .min()
        .expect("relaxed order should be scheduled");
    assert_eq!(urgent_first, day(1));
    assert_eq!(relaxed_first, day(3));
}

#[test]
fn test_manual_priority_overrides_computed() {
    // 人工优先级 9 高侧截断为 5, 压过紧急度计算出的低优先级
    let mut orders = vec![
        make_order("DOC-NATURAL", 4, 1.0, day(2)),
        make_order("DOC-MANUAL", 4, 1.0, day(30)),
    ];
    orders[1].priority_manual = Some(9);
    let mut workers = vec![make_worker(1, 8.0)];

    let s = scheduler();
    s.prioritize_orders(&mut orders, day(1));

    let manual = orders
        .iter()
        .find(|o| o.doc_number == "DOC-MANUAL")
        .expect("order present");
    assert_eq!(manual.calculated_priority, PriorityLevel::Critical);
    // 自然计算的紧急订单停在 4 级 (3+0+1), 人工覆盖订单反而更高
    let natural = orders
        .iter()
        .find(|o| o.doc_number == "DOC-NATURAL")
        .expect("order present");
    assert_eq!(natural.calculated_priority, PriorityLevel::High);

    // 两单合计 8h, 首日产能足够, 均落在首日
    let schedule = s.create_schedule(&mut orders, &mut workers, day(1), 14);
    assert_eq!(schedule.day_schedule(day(1)).len(), 2);
}

#[test]
fn test_delay_report_only_flags_allocated_orders() {
    let mut orders = vec![
        // 24 小时工作量, 交付期第 2 天, 单工人 8h/天 → 第 3 天完成, 延期 1 天
        make_order("DOC-LATE", 24, 1.0, day(2)),
        // 技能不匹配, 零分配 → 即使交付期已过也不标记
        make_order("DOC-UNALLOCATED", 8, 1.0, day(1)),
    ];
    orders[1].product_code = "P-999".to_string();
    let mut workers = vec![make_worker(1, 8.0)];
    workers[0].skills.insert("P-100".to_string());

    let s = scheduler();
    let schedule = s.create_schedule(&mut orders, &mut workers, day(1), 14);
    let delays = s.check_delays(&schedule, &orders);

    assert_eq!(delays.get("DOC-LATE"), Some(&1));
    assert!(!delays.contains_key("DOC-UNALLOCATED"));
}

#[test]
fn test_reports_reconcile_with_schedule() {
    let mut orders = vec![make_order("DOC-001", 20, 1.0, day(10))];
    let mut workers = vec![make_worker(1, 8.0), make_worker(2, 8.0)];

    let s = scheduler();
    let schedule = s.create_schedule(&mut orders, &mut workers, day(1), 14);

    // 负荷报表合计 = 订单总工时
    let load = s.worker_load(&schedule, &workers);
    let total_load: f64 = load.values().flat_map(|days| days.values()).sum();
    assert!((total_load - 20.0).abs() < 1e-9);

    // 尚未开工, 进度为 0
    let progress = s.order_progress(&orders);
    assert_eq!(progress.get("DOC-001"), Some(&0.0));

    // 部分完工后进度按工时占比
    orders[0].consumed_qty = 5;
    let progress = s.order_progress(&orders);
    assert_eq!(progress.get("DOC-001"), Some(&25.0));
}

#[test]
fn test_full_rebuild_restores_worker_capacity() {
    let mut orders = vec![make_order("DOC-001", 8, 1.0, day(5))];
    let mut workers = vec![make_worker(1, 8.0)];

    let s = scheduler();
    let first = s.create_schedule(&mut orders, &mut workers, day(1), 14);
    assert_eq!(first.hours_for_order("DOC-001"), 8.0);

    // 重建前工人产能已被扣空, 重建应先恢复满产能
    let second = s.create_schedule(&mut orders, &mut workers, day(1), 14);
    assert_eq!(second.hours_for_order("DOC-001"), 8.0);
}
