// ==========================================
// 订单数据源监控集成测试
// ==========================================
// 测试目标: CSV 解析、字段校验、差分事件发布、重启预置
// ==========================================

mod test_helpers;

use chrono::NaiveDate;
use order_allocation_aps::engine::{EventBus, EventReceivers, PlanningEvent};
use order_allocation_aps::importer::error::FeedError;
use order_allocation_aps::importer::order_feed::OrderFeedMonitor;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::make_order;

const CSV_HEADER: &str =
    "doc_number,product_code,description,ordered_qty,consumed_qty,cycle_time,doc_date,due_date,priority_manual";

fn write_csv(dir: &Path, name: &str, rows: &[&str]) -> std::path::PathBuf {
    let path = dir.join(name);
    let mut file = std::fs::File::create(&path).expect("create csv file");
    writeln!(file, "{}", CSV_HEADER).expect("write header");
    for row in rows {
        writeln!(file, "{}", row).expect("write row");
    }
    path
}

fn monitor_for(path: &Path) -> (OrderFeedMonitor, EventReceivers) {
    let (bus, receivers) = EventBus::new(&[]);
    let monitor = OrderFeedMonitor::new(path, Duration::from_secs(10), 0.5, Arc::clone(&bus));
    (monitor, receivers)
}

#[test]
fn test_parse_csv_feed() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        dir.path(),
        "orders.csv",
        &[
            "DOC-001,P-100,铜轴承,100,20,0.25,2026-03-01,2026-03-10,",
            "DOC-002,P-200,钢衬套,50,0,,2026-03-01,2026-03-05,4",
        ],
    );

    let (monitor, _rx) = monitor_for(&path);
    let orders = monitor.parse_file().expect("feed should parse");

    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0].doc_number, "DOC-001");
    assert_eq!(orders[0].ordered_qty, 100);
    assert_eq!(orders[0].cycle_time_hours, 0.25);
    assert_eq!(orders[0].priority_manual, None);
    assert_eq!(
        orders[0].due_date,
        NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date")
    );

    // 节拍缺失回退默认值 0.5
    assert_eq!(orders[1].cycle_time_hours, 0.5);
    assert_eq!(orders[1].priority_manual, Some(4));
}

#[test]
fn test_missing_field_reports_row_and_field() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        dir.path(),
        "orders.csv",
        &["DOC-001,,描述,100,0,0.25,2026-03-01,2026-03-10,"],
    );

    let (monitor, _rx) = monitor_for(&path);
    let err = monitor.parse_file().expect_err("missing field should fail");
    match err {
        FeedError::FieldMissing { row, field } => {
            assert_eq!(row, 1);
            assert_eq!(field, "product_code");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn test_bad_date_reports_value() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = write_csv(
        dir.path(),
        "orders.csv",
        &["DOC-001,P-100,描述,100,0,0.25,2026-03-01,03/10/2026,"],
    );

    let (monitor, _rx) = monitor_for(&path);
    let err = monitor.parse_file().expect_err("bad date should fail");
    assert!(matches!(err, FeedError::DateFormat { field: "due_date", .. }));
}

#[test]
fn test_unsupported_extension_rejected() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("orders.txt");
    std::fs::write(&path, "not a feed").expect("write file");

    let (monitor, _rx) = monitor_for(&path);
    assert!(matches!(
        monitor.parse_file(),
        Err(FeedError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_legacy_xls_extension_enters_spreadsheet_parser() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("orders.xls");
    std::fs::write(&path, b"not a real workbook").expect("write file");

    // .xls 走表格解析路径 (内容无效时报解析错误), 而非被扩展名拒绝
    let (monitor, _rx) = monitor_for(&path);
    let err = monitor.parse_file().expect_err("garbage workbook should fail");
    assert!(matches!(err, FeedError::ExcelParse(_)));
}

#[test]
fn test_detect_changes_emits_created_then_updated() {
    let (bus, mut receivers) = EventBus::new(&[]);
    let mut monitor = OrderFeedMonitor::new(
        Path::new("orders.csv"),
        Duration::from_secs(10),
        0.5,
        Arc::clone(&bus),
    );

    let day = |d: u32| NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date");
    let order = make_order("DOC-001", 100, 0.25, day(10));

    // 首次出现: OrderCreated
    monitor.detect_changes(vec![order.clone()]);
    let event = receivers.coordinator.try_recv().expect("event expected");
    assert_eq!(event.kind(), "OrderCreated");

    // 无变化: 不发事件
    monitor.detect_changes(vec![order.clone()]);
    assert!(receivers.coordinator.try_recv().is_err());

    // 数量变化: OrderUpdated
    let mut changed = order.clone();
    changed.consumed_qty = 30;
    monitor.detect_changes(vec![changed]);
    match receivers.coordinator.try_recv().expect("event expected") {
        PlanningEvent::OrderUpdated {
            doc_number,
            consumed_qty,
            ..
        } => {
            assert_eq!(doc_number, "DOC-001");
            assert_eq!(consumed_qty, 30);
        }
        other => panic!("unexpected event: {}", other.kind()),
    }
}

#[test]
fn test_seeded_orders_not_reannounced() {
    let (bus, mut receivers) = EventBus::new(&[]);
    let mut monitor = OrderFeedMonitor::new(
        Path::new("orders.csv"),
        Duration::from_secs(10),
        0.5,
        Arc::clone(&bus),
    );

    let day = |d: u32| NaiveDate::from_ymd_opt(2026, 3, d).expect("valid date");
    let restored = make_order("DOC-001", 100, 0.25, day(10));
    monitor.seed_known_orders(std::slice::from_ref(&restored));

    // 镜像恢复的订单再次出现在数据源时不重复发 OrderCreated
    monitor.detect_changes(vec![restored]);
    assert!(receivers.coordinator.try_recv().is_err());
}
