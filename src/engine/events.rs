// ==========================================
// 生产订单分配排产系统 - 事件类型与事件总线
// ==========================================
// 职责: 定义智能体间的封闭事件枚举与显式路由总线
// 路由: 每个智能体一条 mpsc 通道, 外部观察者走 broadcast 通道
// 红线: BidRequest 扇出到全部工人通道, 不存在"单一队列抢消息"
// ==========================================

use crate::domain::order::Order;
use crate::domain::types::WorkerId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};
use uuid::Uuid;

// ==========================================
// PlanningEvent - 排产事件
// ==========================================
// 封闭枚举, 各智能体循环内穷尽匹配
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlanningEvent {
    /// 新订单到达 (摄取侧发出)
    OrderCreated { order: Order },

    /// 订单变更: 数量 / 交付期 / 人工优先级 (摄取侧或界面发出)
    OrderUpdated {
        doc_number: String,
        ordered_qty: i64,
        consumed_qty: i64,
        due_date: NaiveDate,
        priority_manual: Option<i32>,
    },

    /// 竞标请求 (协调者 → 全部工人)
    BidRequest {
        doc_number: String,
        product_code: String,
        work_hours: f64,
        due_date: NaiveDate,
    },

    /// 竞标响应 (工人 → 协调者)
    ///
    /// proposed 按产生顺序 (日期升序) 排布
    BidResponse {
        doc_number: String,
        worker_id: WorkerId,
        capacity: f64,
        proposed: BTreeMap<NaiveDate, f64>,
    },

    /// 分配裁定 (协调者 → 指定工人)
    AllocationAward {
        doc_number: String,
        worker_id: WorkerId,
        allocations: BTreeMap<NaiveDate, f64>,
    },

    /// 生产进度上报 (工人或界面 → 协调者)
    ProgressUpdate {
        doc_number: String,
        worker_id: WorkerId,
        qty_done: i64,
        date: NaiveDate,
    },

    /// 人工优先级变更 (界面 → 协调者)
    PriorityChange {
        doc_number: String,
        new_priority: i32,
    },

    /// 竞标回合到期 (内部定时器 → 协调者)
    BidRoundExpired { doc_number: String, round_id: Uuid },

    /// 排产计划已更新 (协调者 → 外部观察者)
    ScheduleUpdated,
}

impl PlanningEvent {
    /// 事件种类标识 (日志用)
    pub fn kind(&self) -> &'static str {
        match self {
            PlanningEvent::OrderCreated { .. } => "OrderCreated",
            PlanningEvent::OrderUpdated { .. } => "OrderUpdated",
            PlanningEvent::BidRequest { .. } => "BidRequest",
            PlanningEvent::BidResponse { .. } => "BidResponse",
            PlanningEvent::AllocationAward { .. } => "AllocationAward",
            PlanningEvent::ProgressUpdate { .. } => "ProgressUpdate",
            PlanningEvent::PriorityChange { .. } => "PriorityChange",
            PlanningEvent::BidRoundExpired { .. } => "BidRoundExpired",
            PlanningEvent::ScheduleUpdated => "ScheduleUpdated",
        }
    }
}

// ==========================================
// EventBus - 显式路由事件总线
// ==========================================
pub struct EventBus {
    coordinator_tx: mpsc::UnboundedSender<PlanningEvent>,
    worker_txs: HashMap<WorkerId, mpsc::UnboundedSender<PlanningEvent>>,
    observer_tx: broadcast::Sender<PlanningEvent>,
}

/// 总线构建时一次性交付的各接收端
pub struct EventReceivers {
    pub coordinator: mpsc::UnboundedReceiver<PlanningEvent>,
    pub workers: HashMap<WorkerId, mpsc::UnboundedReceiver<PlanningEvent>>,
}

impl EventBus {
    /// 为指定工人集合构建总线
    ///
    /// # 参数
    /// - `worker_ids`: 全部工人标识
    ///
    /// # 返回
    /// (共享总线, 各智能体接收端)
    pub fn new(worker_ids: &[WorkerId]) -> (Arc<Self>, EventReceivers) {
        let (coordinator_tx, coordinator_rx) = mpsc::unbounded_channel();
        let (observer_tx, _) = broadcast::channel(64);

        let mut worker_txs = HashMap::new();
        let mut worker_rxs = HashMap::new();
        for &id in worker_ids {
            let (tx, rx) = mpsc::unbounded_channel();
            worker_txs.insert(id, tx);
            worker_rxs.insert(id, rx);
        }

        let bus = Arc::new(Self {
            coordinator_tx,
            worker_txs,
            observer_tx,
        });
        let receivers = EventReceivers {
            coordinator: coordinator_rx,
            workers: worker_rxs,
        };
        (bus, receivers)
    }

    /// 按事件类型路由投递
    ///
    /// - BidRequest: 克隆扇出到全部工人通道
    /// - AllocationAward: 仅投递被裁定的工人; 未知工人属引用错误, 记日志后丢弃
    /// - ScheduleUpdated: broadcast 给外部观察者 (无订阅者时静默)
    /// - 其余事件: 投递协调者
    pub fn publish(&self, event: PlanningEvent) {
        match &event {
            PlanningEvent::BidRequest { doc_number, .. } => {
                debug!(doc_number = %doc_number, workers = self.worker_txs.len(), "扇出竞标请求");
                for (id, tx) in &self.worker_txs {
                    if tx.send(event.clone()).is_err() {
                        warn!(worker_id = id, "工人通道已关闭, 竞标请求未送达");
                    }
                }
            }
            PlanningEvent::AllocationAward {
                worker_id,
                doc_number,
                ..
            } => match self.worker_txs.get(worker_id) {
                Some(tx) => {
                    if tx.send(event.clone()).is_err() {
                        warn!(worker_id, doc_number = %doc_number, "工人通道已关闭, 裁定未送达");
                    }
                }
                None => {
                    warn!(worker_id, doc_number = %doc_number, "裁定引用未知工人, 已忽略");
                }
            },
            PlanningEvent::ScheduleUpdated => {
                // 无观察者订阅时 send 返回 Err, 属正常情况
                let _ = self.observer_tx.send(event.clone());
            }
            _ => {
                if self.coordinator_tx.send(event.clone()).is_err() {
                    warn!(kind = event.kind(), "协调者通道已关闭, 事件丢弃");
                }
            }
        }
    }

    /// 外部观察者订阅 (仅收到 ScheduleUpdated)
    pub fn subscribe(&self) -> broadcast::Receiver<PlanningEvent> {
        self.observer_tx.subscribe()
    }

    /// 已注册的工人数量
    pub fn worker_count(&self) -> usize {
        self.worker_txs.len()
    }
}
