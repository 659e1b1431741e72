// ==========================================
// 排产镜像仓储集成测试
// ==========================================
// 测试目标: 订单/工人/分配的镜像写入与重启恢复读取
// ==========================================

mod test_helpers;

use order_allocation_aps::domain::{Allocation, WorkSchedule};
use order_allocation_aps::repository::ScheduleRepository;
use test_helpers::{day, make_order, make_worker};

fn temp_repository() -> (tempfile::TempDir, ScheduleRepository) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let db_path = dir.path().join("mirror.db");
    let repo = ScheduleRepository::new(db_path.to_str().expect("utf-8 path"))
        .expect("repository should open");
    (dir, repo)
}

#[test]
fn test_orders_round_trip() {
    let (_dir, repo) = temp_repository();

    let mut order = make_order("DOC-001", 100, 0.25, day(10));
    order.priority_manual = Some(4);
    repo.save_orders(&[order.clone()]).expect("save orders");

    let loaded = repo.load_orders().expect("load orders");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].doc_number, "DOC-001");
    assert_eq!(loaded[0].ordered_qty, 100);
    assert_eq!(loaded[0].cycle_time_hours, 0.25);
    assert_eq!(loaded[0].due_date, day(10));
    assert_eq!(loaded[0].priority_manual, Some(4));
}

#[test]
fn test_save_orders_upserts_by_doc_number() {
    let (_dir, repo) = temp_repository();

    let mut order = make_order("DOC-001", 100, 0.25, day(10));
    repo.save_orders(&[order.clone()]).expect("save orders");

    // 同单据号更新而非新增
    order.consumed_qty = 40;
    order.due_date = day(12);
    repo.save_orders(&[order]).expect("save orders again");

    let loaded = repo.load_orders().expect("load orders");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].consumed_qty, 40);
    assert_eq!(loaded[0].due_date, day(12));
}

#[test]
fn test_workers_round_trip_with_skills() {
    let (_dir, repo) = temp_repository();

    let mut worker = make_worker(1, 8.0);
    worker.skills.insert("P-100".to_string());
    worker.skills.insert("P-200".to_string());
    repo.save_workers(&[worker]).expect("save workers");

    let loaded = repo.load_workers().expect("load workers");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, 1);
    assert_eq!(loaded[0].hours_per_day, 8.0);
    assert!(loaded[0].skills.contains("P-100"));
    assert!(loaded[0].skills.contains("P-200"));
}

#[test]
fn test_schedule_snapshot_replaces_previous() {
    let (_dir, repo) = temp_repository();

    let mut first = WorkSchedule::new();
    first.add_allocation(Allocation::new("DOC-001", 1, day(1), 8.0));
    first.add_allocation(Allocation::new("DOC-001", 1, day(2), 4.0));
    repo.save_schedule(&first).expect("save first snapshot");

    // 快照整表替换, 旧分配不残留
    let mut second = WorkSchedule::new();
    second.add_allocation(Allocation::new("DOC-002", 2, day(3), 6.0));
    repo.save_schedule(&second).expect("save second snapshot");

    let loaded = repo.load_schedule().expect("load schedule");
    assert_eq!(loaded.allocations.len(), 1);
    assert_eq!(loaded.allocations[0].doc_number, "DOC-002");
    assert_eq!(loaded.allocations[0].worker_id, 2);
    assert_eq!(loaded.allocations[0].hours, 6.0);
}

#[test]
fn test_completed_flag_survives_round_trip() {
    let (_dir, repo) = temp_repository();

    let mut schedule = WorkSchedule::new();
    let mut allocation = Allocation::new("DOC-001", 1, day(1), 8.0);
    allocation.completed = true;
    schedule.add_allocation(allocation);
    repo.save_schedule(&schedule).expect("save schedule");

    let loaded = repo.load_schedule().expect("load schedule");
    assert!(loaded.allocations[0].completed);
}
