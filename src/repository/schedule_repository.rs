// ==========================================
// 生产订单分配排产系统 - 排产镜像仓储
// ==========================================
// 职责: 把订单 / 工人 / 分配镜像到 SQLite, 供外部读取与重启恢复
// 写入方: 镜像任务 (收到 ScheduleUpdated 后整体快照)
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::order::Order;
use crate::domain::schedule::{Allocation, WorkSchedule};
use crate::domain::types::PriorityLevel;
use crate::domain::worker::Worker;
use crate::repository::error::RepositoryError;
use rusqlite::{params, Connection};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

// ==========================================
// ScheduleRepository - 镜像仓储
// ==========================================
pub struct ScheduleRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ScheduleRepository {
    /// 打开 (或创建) 镜像数据库
    ///
    /// # 参数
    /// - `db_path`: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, RepositoryError> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.create_tables()?;
        Ok(repo)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn.lock().map_err(|_| RepositoryError::LockPoisoned)
    }

    fn create_tables(&self) -> Result<(), RepositoryError> {
        let conn = self.lock()?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS orders (
                doc_number      TEXT PRIMARY KEY,
                product_code    TEXT NOT NULL,
                description     TEXT NOT NULL DEFAULT '',
                ordered_qty     INTEGER NOT NULL,
                consumed_qty    INTEGER NOT NULL,
                cycle_time      REAL NOT NULL,
                doc_date        TEXT NOT NULL,
                due_date        TEXT NOT NULL,
                priority_manual INTEGER
            );
            CREATE TABLE IF NOT EXISTS workers (
                id            INTEGER PRIMARY KEY,
                name          TEXT NOT NULL,
                hours_per_day REAL NOT NULL,
                skills        TEXT NOT NULL DEFAULT '[]'
            );
            CREATE TABLE IF NOT EXISTS allocations (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                doc_number TEXT NOT NULL,
                worker_id  INTEGER NOT NULL,
                date       TEXT NOT NULL,
                hours      REAL NOT NULL,
                completed  INTEGER NOT NULL DEFAULT 0
            );",
        )?;
        Ok(())
    }

    /// 订单 upsert 镜像
    pub fn save_orders(&self, orders: &[Order]) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for order in orders {
            tx.execute(
                "INSERT INTO orders (doc_number, product_code, description, ordered_qty,
                                     consumed_qty, cycle_time, doc_date, due_date, priority_manual)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                 ON CONFLICT(doc_number) DO UPDATE SET
                     product_code = excluded.product_code,
                     description = excluded.description,
                     ordered_qty = excluded.ordered_qty,
                     consumed_qty = excluded.consumed_qty,
                     cycle_time = excluded.cycle_time,
                     doc_date = excluded.doc_date,
                     due_date = excluded.due_date,
                     priority_manual = excluded.priority_manual",
                params![
                    order.doc_number,
                    order.product_code,
                    order.description,
                    order.ordered_qty,
                    order.consumed_qty,
                    order.cycle_time_hours,
                    order.doc_date,
                    order.due_date,
                    order.priority_manual,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// 工人 upsert 镜像 (技能集序列化为 JSON)
    pub fn save_workers(&self, workers: &[Worker]) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        for worker in workers {
            let skills = serde_json::to_string(&worker.skills)
                .map_err(|e| RepositoryError::Deserialize(e.to_string()))?;
            tx.execute(
                "INSERT INTO workers (id, name, hours_per_day, skills)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     name = excluded.name,
                     hours_per_day = excluded.hours_per_day,
                     skills = excluded.skills",
                params![worker.id, worker.name, worker.hours_per_day, skills],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// 分配快照镜像 (整表替换)
    pub fn save_schedule(&self, schedule: &WorkSchedule) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM allocations", [])?;
        for allocation in &schedule.allocations {
            tx.execute(
                "INSERT INTO allocations (doc_number, worker_id, date, hours, completed)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    allocation.doc_number,
                    allocation.worker_id,
                    allocation.date,
                    allocation.hours,
                    allocation.completed,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// 读取镜像中的全部订单 (重启恢复用)
    pub fn load_orders(&self) -> Result<Vec<Order>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT doc_number, product_code, description, ordered_qty, consumed_qty,
                    cycle_time, doc_date, due_date, priority_manual
             FROM orders",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(Order {
                doc_number: row.get(0)?,
                product_code: row.get(1)?,
                description: row.get(2)?,
                ordered_qty: row.get(3)?,
                consumed_qty: row.get(4)?,
                cycle_time_hours: row.get(5)?,
                doc_date: row.get(6)?,
                due_date: row.get(7)?,
                priority_manual: row.get(8)?,
                calculated_priority: PriorityLevel::default(),
            })
        })?;

        let mut orders = Vec::new();
        for row in rows {
            orders.push(row?);
        }
        Ok(orders)
    }

    /// 读取镜像中的全部工人
    pub fn load_workers(&self) -> Result<Vec<Worker>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, hours_per_day, skills FROM workers")?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, u32>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, String>(3)?,
            ))
        })?;

        let mut workers = Vec::new();
        for row in rows {
            let (id, name, hours_per_day, skills_json) = row?;
            let skills: HashSet<String> = serde_json::from_str(&skills_json)
                .map_err(|e| RepositoryError::Deserialize(e.to_string()))?;
            let mut worker = Worker::new(id, name, hours_per_day);
            worker.skills = skills;
            workers.push(worker);
        }
        Ok(workers)
    }

    /// 读取镜像中的全部分配
    pub fn load_schedule(&self) -> Result<WorkSchedule, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT doc_number, worker_id, date, hours, completed FROM allocations")?;

        let rows = stmt.query_map([], |row| {
            Ok(Allocation {
                doc_number: row.get(0)?,
                worker_id: row.get(1)?,
                date: row.get(2)?,
                hours: row.get(3)?,
                completed: row.get(4)?,
            })
        })?;

        let mut schedule = WorkSchedule::new();
        for row in rows {
            schedule.add_allocation(row?);
        }
        Ok(schedule)
    }
}
