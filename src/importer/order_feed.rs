// ==========================================
// 生产订单分配排产系统 - 订单数据源监控
// ==========================================
// 职责: 轮询外部表格文件 (.xlsx/.xls/.csv), 变更时解析并
//       与已知订单差分, 发布 OrderCreated / OrderUpdated
// 差分键: doc_number (唯一键; 产品代码不唯一, 不可作键)
// 解析失败只记日志, 轮询继续
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::PriorityLevel;
use crate::engine::events::{EventBus, PlanningEvent};
use crate::importer::error::FeedError;
use calamine::{open_workbook_auto, Reader};
use chrono::NaiveDate;
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tracing::{debug, error, info};

// 列名约定
const COL_DOC_NUMBER: &str = "doc_number";
const COL_PRODUCT_CODE: &str = "product_code";
const COL_DESCRIPTION: &str = "description";
const COL_ORDERED_QTY: &str = "ordered_qty";
const COL_CONSUMED_QTY: &str = "consumed_qty";
const COL_CYCLE_TIME: &str = "cycle_time";
const COL_DOC_DATE: &str = "doc_date";
const COL_DUE_DATE: &str = "due_date";
const COL_PRIORITY_MANUAL: &str = "priority_manual";

// ==========================================
// OrderFeedMonitor - 订单数据源监控器
// ==========================================
pub struct OrderFeedMonitor {
    path: PathBuf,
    poll_interval: Duration,
    default_cycle_time: f64,
    bus: Arc<EventBus>,
    last_modified: Option<SystemTime>,
    known_orders: HashMap<String, Order>,
}

impl OrderFeedMonitor {
    /// 构造函数
    ///
    /// # 参数
    /// - `path`: 被监控的表格文件
    /// - `poll_interval`: 轮询间隔
    /// - `default_cycle_time`: 节拍缺失时的默认值 (小时/件)
    /// - `bus`: 事件总线
    pub fn new(
        path: impl Into<PathBuf>,
        poll_interval: Duration,
        default_cycle_time: f64,
        bus: Arc<EventBus>,
    ) -> Self {
        Self {
            path: path.into(),
            poll_interval,
            default_cycle_time,
            bus,
            last_modified: None,
            known_orders: HashMap::new(),
        }
    }

    /// 预置已知订单 (重启恢复路径)
    ///
    /// 镜像库中的订单预先登记为已知, 避免重启后把存量订单重复发为 OrderCreated
    pub fn seed_known_orders(&mut self, orders: &[Order]) {
        for order in orders {
            self.known_orders
                .insert(order.doc_number.clone(), order.clone());
        }
    }

    /// 轮询主循环
    pub async fn run(mut self) {
        info!(path = %self.path.display(), "订单数据源监控启动");

        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            self.poll_once();
        }
    }

    /// 单次轮询: mtime 前进时重新解析并差分
    pub fn poll_once(&mut self) {
        let modified = match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(t) => t,
            Err(_) => {
                debug!(path = %self.path.display(), "数据源文件不可达, 跳过本轮");
                return;
            }
        };

        if Some(modified) <= self.last_modified {
            return;
        }

        info!(path = %self.path.display(), "检测到数据源文件变更");
        match self.parse_file() {
            Ok(orders) => {
                self.detect_changes(orders);
                self.last_modified = Some(modified);
            }
            Err(err) => {
                // 解析失败不推进 mtime, 下一轮重试
                error!(path = %self.path.display(), error = %err, "数据源解析失败");
            }
        }
    }

    // ==========================================
    // 解析
    // ==========================================

    /// 按扩展名解析整个文件为订单列表
    pub fn parse_file(&self) -> Result<Vec<Order>, FeedError> {
        if !self.path.exists() {
            return Err(FeedError::FileNotFound(self.path.display().to_string()));
        }

        let ext = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let rows = match ext.as_str() {
            "csv" => read_csv_rows(&self.path)?,
            "xlsx" | "xls" => read_excel_rows(&self.path)?,
            other => return Err(FeedError::UnsupportedFormat(other.to_string())),
        };

        let mut orders = Vec::with_capacity(rows.len());
        for (idx, row) in rows.iter().enumerate() {
            orders.push(self.map_record(idx + 1, row)?);
        }
        Ok(orders)
    }

    /// 把一行表格映射为订单
    fn map_record(&self, row: usize, record: &HashMap<String, String>) -> Result<Order, FeedError> {
        let get = |field: &'static str| -> Result<&str, FeedError> {
            record
                .get(field)
                .map(|s| s.as_str())
                .filter(|s| !s.is_empty())
                .ok_or(FeedError::FieldMissing { row, field })
        };

        let parse_i64 = |field: &'static str, value: &str| -> Result<i64, FeedError> {
            value.parse::<i64>().map_err(|_| FeedError::TypeConversion {
                row,
                field,
                value: value.to_string(),
            })
        };
        let parse_date = |field: &'static str, value: &str| -> Result<NaiveDate, FeedError> {
            NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| FeedError::DateFormat {
                row,
                field,
                value: value.to_string(),
            })
        };

        // 节拍缺失回退默认值
        let cycle_time_hours = match record.get(COL_CYCLE_TIME).map(|s| s.as_str()) {
            Some(v) if !v.is_empty() => {
                v.parse::<f64>().map_err(|_| FeedError::TypeConversion {
                    row,
                    field: COL_CYCLE_TIME,
                    value: v.to_string(),
                })?
            }
            _ => self.default_cycle_time,
        };

        let priority_manual = match record.get(COL_PRIORITY_MANUAL).map(|s| s.as_str()) {
            Some(v) if !v.is_empty() => {
                Some(v.parse::<i32>().map_err(|_| FeedError::TypeConversion {
                    row,
                    field: COL_PRIORITY_MANUAL,
                    value: v.to_string(),
                })?)
            }
            _ => None,
        };

        Ok(Order {
            doc_number: get(COL_DOC_NUMBER)?.to_string(),
            product_code: get(COL_PRODUCT_CODE)?.to_string(),
            description: record
                .get(COL_DESCRIPTION)
                .cloned()
                .unwrap_or_default(),
            ordered_qty: parse_i64(COL_ORDERED_QTY, get(COL_ORDERED_QTY)?)?,
            consumed_qty: parse_i64(COL_CONSUMED_QTY, get(COL_CONSUMED_QTY)?)?,
            cycle_time_hours,
            doc_date: parse_date(COL_DOC_DATE, get(COL_DOC_DATE)?)?,
            due_date: parse_date(COL_DUE_DATE, get(COL_DUE_DATE)?)?,
            priority_manual,
            calculated_priority: PriorityLevel::default(),
        })
    }

    // ==========================================
    // 差分
    // ==========================================

    /// 与已知订单差分并发布事件, 随后更新已知集合
    pub fn detect_changes(&mut self, current: Vec<Order>) {
        let mut created = 0usize;
        let mut updated = 0usize;

        for order in &current {
            match self.known_orders.get(&order.doc_number) {
                None => {
                    created += 1;
                    self.bus.publish(PlanningEvent::OrderCreated {
                        order: order.clone(),
                    });
                }
                Some(known) => {
                    let changed = order.ordered_qty != known.ordered_qty
                        || order.consumed_qty != known.consumed_qty
                        || order.due_date != known.due_date
                        || order.priority_manual != known.priority_manual;
                    if changed {
                        updated += 1;
                        self.bus.publish(PlanningEvent::OrderUpdated {
                            doc_number: order.doc_number.clone(),
                            ordered_qty: order.ordered_qty,
                            consumed_qty: order.consumed_qty,
                            due_date: order.due_date,
                            priority_manual: order.priority_manual,
                        });
                    }
                }
            }
        }

        self.known_orders = current
            .into_iter()
            .map(|o| (o.doc_number.clone(), o))
            .collect();

        info!(created, updated, total = self.known_orders.len(), "数据源差分完成");
    }
}

// ==========================================
// 行读取
// ==========================================

fn read_csv_rows(path: &Path) -> Result<Vec<HashMap<String, String>>, FeedError> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        let mut row = HashMap::new();
        for (idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(idx) {
                row.insert(header.clone(), value.trim().to_string());
            }
        }
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}

fn read_excel_rows(path: &Path) -> Result<Vec<HashMap<String, String>>, FeedError> {
    // 按文件内容自动识别格式, 旧版二进制 .xls 与 .xlsx 同路径处理
    let mut workbook =
        open_workbook_auto(path).map_err(|e| FeedError::ExcelParse(e.to_string()))?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| FeedError::ExcelParse("Excel 文件无工作表".to_string()))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| FeedError::ExcelParse(e.to_string()))?;

    let mut row_iter = range.rows();
    let header_row = row_iter
        .next()
        .ok_or_else(|| FeedError::ExcelParse("Excel 文件无数据行".to_string()))?;
    let headers: Vec<String> = header_row
        .iter()
        .map(|cell| cell.to_string().trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for data_row in row_iter {
        let mut row = HashMap::new();
        for (idx, cell) in data_row.iter().enumerate() {
            if let Some(header) = headers.get(idx) {
                row.insert(header.clone(), cell.to_string().trim().to_string());
            }
        }
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        rows.push(row);
    }
    Ok(rows)
}
