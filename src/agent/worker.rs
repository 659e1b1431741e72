// ==========================================
// 生产订单分配排产系统 - 工人智能体
// ==========================================
// 职责: 响应竞标请求 / 落实裁定 / 上报生产进度
// 本地工人镜像仅用于计算标书, 权威状态在协调者侧
// ==========================================

use crate::domain::schedule::Allocation;
use crate::domain::worker::Worker;
use crate::engine::events::{EventBus, PlanningEvent};
use chrono::{Duration, Local, NaiveDate};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, trace};

// ==========================================
// WorkerAgent - 工人智能体 (每工人一实例)
// ==========================================
pub struct WorkerAgent {
    bus: Arc<EventBus>,
    rx: mpsc::UnboundedReceiver<PlanningEvent>,

    // 本智能体独占的状态
    worker: Worker,
    horizon_days: i64,
    allocations: Vec<Allocation>,
    active_bids: HashSet<String>,
}

impl WorkerAgent {
    /// 构造函数
    ///
    /// # 参数
    /// - `bus`: 事件总线
    /// - `rx`: 本工人的接收端
    /// - `worker`: 工人本地镜像
    /// - `horizon_days`: 提案窗口天数
    pub fn new(
        bus: Arc<EventBus>,
        rx: mpsc::UnboundedReceiver<PlanningEvent>,
        worker: Worker,
        horizon_days: i64,
    ) -> Self {
        Self {
            bus,
            rx,
            worker,
            horizon_days,
            allocations: Vec::new(),
            active_bids: HashSet::new(),
        }
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// 主循环
    pub async fn run(mut self) {
        info!(
            worker_id = self.worker.id,
            name = %self.worker.name,
            "工人智能体启动"
        );

        while let Some(event) = self.rx.recv().await {
            trace!(worker_id = self.worker.id, kind = event.kind(), "工人收到事件");
            match event {
                PlanningEvent::BidRequest {
                    doc_number,
                    product_code,
                    work_hours,
                    due_date,
                } => self.handle_bid_request(&doc_number, &product_code, work_hours, due_date),
                PlanningEvent::AllocationAward {
                    doc_number,
                    worker_id,
                    allocations,
                } => self.handle_allocation_award(&doc_number, worker_id, allocations),
                // 路由不会向工人投递其余事件
                _ => {
                    trace!(worker_id = self.worker.id, "工人忽略非本端事件");
                }
            }
        }

        info!(worker_id = self.worker.id, "工人通道关闭, 退出");
    }

    // ==========================================
    // 竞标: 逐日累积空闲工时直到满足需求或窗口耗尽
    // ==========================================

    fn handle_bid_request(
        &mut self,
        doc_number: &str,
        product_code: &str,
        work_hours: f64,
        due_date: NaiveDate,
    ) {
        // 技能不符: 不响应 (协调者按合格工人数等待)
        if !self.worker.is_eligible(product_code) {
            debug!(
                worker_id = self.worker.id,
                doc_number,
                product_code,
                "技能不符, 不参与竞标"
            );
            return;
        }

        self.active_bids.insert(doc_number.to_string());

        let today = self.today();
        let end_date = due_date.min(today + Duration::days(self.horizon_days));

        let mut proposed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
        let mut remaining_hours = work_hours;
        let mut day = today;
        while day <= end_date {
            let available = self.worker.available_hours(day);
            if available > 0.0 {
                let offered = available.min(remaining_hours);
                proposed.insert(day, offered);
                remaining_hours -= offered;
                if remaining_hours <= 0.0 {
                    break;
                }
            }
            day += Duration::days(1);
        }

        let capacity: f64 = proposed.values().sum();
        debug!(
            worker_id = self.worker.id,
            doc_number,
            capacity,
            days = proposed.len(),
            "提交竞标响应"
        );

        self.bus.publish(PlanningEvent::BidResponse {
            doc_number: doc_number.to_string(),
            worker_id: self.worker.id,
            capacity,
            proposed,
        });
    }

    // ==========================================
    // 裁定落实: 扣减本地可用工时, 记录本地分配
    // ==========================================

    fn handle_allocation_award(
        &mut self,
        doc_number: &str,
        worker_id: crate::domain::types::WorkerId,
        allocations: BTreeMap<NaiveDate, f64>,
    ) {
        // 路由已保证寻址, 此处仅防御性核对
        if worker_id != self.worker.id {
            return;
        }

        self.active_bids.remove(doc_number);

        for (&day, &hours) in &allocations {
            let available = self.worker.available_hours(day);
            self.worker.availability.insert(day, available - hours);
            self.allocations
                .push(Allocation::new(doc_number.to_string(), self.worker.id, day, hours));
        }

        info!(
            worker_id = self.worker.id,
            doc_number,
            days = allocations.len(),
            "收到分配裁定"
        );
    }

    /// 上报生产进度 (外部触发, 例如人工录入实绩)
    ///
    /// 发布 ProgressUpdate 并把首条匹配 (订单, 日期) 的本地分配标记完成
    pub fn report_progress(&mut self, doc_number: &str, qty_done: i64, date: NaiveDate) {
        self.bus.publish(PlanningEvent::ProgressUpdate {
            doc_number: doc_number.to_string(),
            worker_id: self.worker.id,
            qty_done,
            date,
        });

        for allocation in self.allocations.iter_mut() {
            if allocation.doc_number == doc_number && allocation.date == date {
                allocation.completed = true;
                break;
            }
        }
    }

    /// 本地分配账本 (测试与诊断用)
    pub fn allocations(&self) -> &[Allocation] {
        &self.allocations
    }
}
