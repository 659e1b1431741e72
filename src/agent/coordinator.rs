// ==========================================
// 生产订单分配排产系统 - 协调者智能体
// ==========================================
// 职责: 持有订单状态与权威排产计划, 主持逐单竞标,
//       在订单变更时触发整表重建
// 状态机: New → BiddingOpen → Allocated → (变更回访) → Completed
// 红线: 权威工人池与权威计划只在本智能体内被修改
// ==========================================

use crate::api::board::{BoardSnapshot, PlanningBoard};
use crate::domain::order::Order;
use crate::domain::schedule::{Allocation, WorkSchedule};
use crate::domain::types::{OrderPhase, WorkerId};
use crate::domain::worker::Worker;
use crate::engine::events::{EventBus, PlanningEvent};
use crate::engine::priority::PriorityCalculator;
use crate::engine::scheduler::CapacityScheduler;
use chrono::{Local, NaiveDate};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

// ==========================================
// BidRound - 进行中的竞标回合
// ==========================================
struct BidRound {
    round_id: Uuid,
    /// 期望响应数 = 合格工人数 (技能不符者不响应)
    expected: usize,
    responses: Vec<CollectedBid>,
}

struct CollectedBid {
    worker_id: WorkerId,
    capacity: f64,
    proposed: BTreeMap<NaiveDate, f64>,
}

// ==========================================
// CoordinatorAgent - 协调者
// ==========================================
pub struct CoordinatorAgent {
    bus: Arc<EventBus>,
    rx: mpsc::UnboundedReceiver<PlanningEvent>,

    // 权威状态
    workers: Vec<Worker>,
    orders: HashMap<String, Order>,
    phases: HashMap<String, OrderPhase>,
    schedule: WorkSchedule,
    active_bids: HashMap<String, BidRound>,

    calculator: PriorityCalculator,
    scheduler: CapacityScheduler,
    board: PlanningBoard,
    horizon_days: i64,
    bid_timeout: Duration,
}

impl CoordinatorAgent {
    /// 构造函数
    ///
    /// # 参数
    /// - `bus`: 事件总线
    /// - `rx`: 协调者接收端
    /// - `workers`: 权威工人池
    /// - `calculator`: 优先级计算器
    /// - `horizon_days`: 排产滚动窗口天数
    /// - `bid_timeout`: 竞标回合超时
    /// - `board`: 对外只读看板
    pub fn new(
        bus: Arc<EventBus>,
        rx: mpsc::UnboundedReceiver<PlanningEvent>,
        workers: Vec<Worker>,
        calculator: PriorityCalculator,
        horizon_days: i64,
        bid_timeout: Duration,
        board: PlanningBoard,
    ) -> Self {
        Self {
            bus,
            rx,
            workers,
            orders: HashMap::new(),
            phases: HashMap::new(),
            schedule: WorkSchedule::new(),
            active_bids: HashMap::new(),
            scheduler: CapacityScheduler::new(calculator.clone()),
            calculator,
            board,
            horizon_days,
            bid_timeout,
        }
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    /// 主循环: 逐事件处理, 处理期间不让出 (重建同步阻塞本循环)
    pub async fn run(mut self) {
        info!(workers = self.workers.len(), "协调者启动");

        while let Some(event) = self.rx.recv().await {
            trace!(kind = event.kind(), "协调者收到事件");
            match event {
                PlanningEvent::OrderCreated { order } => self.handle_order_created(order),
                PlanningEvent::OrderUpdated {
                    doc_number,
                    ordered_qty,
                    consumed_qty,
                    due_date,
                    priority_manual,
                } => self.handle_order_updated(
                    &doc_number,
                    ordered_qty,
                    consumed_qty,
                    due_date,
                    priority_manual,
                ),
                PlanningEvent::BidResponse {
                    doc_number,
                    worker_id,
                    capacity,
                    proposed,
                } => self.handle_bid_response(&doc_number, worker_id, capacity, proposed),
                PlanningEvent::ProgressUpdate {
                    doc_number,
                    worker_id,
                    qty_done,
                    date,
                } => self.handle_progress_update(&doc_number, worker_id, qty_done, date),
                PlanningEvent::PriorityChange {
                    doc_number,
                    new_priority,
                } => self.handle_priority_change(&doc_number, new_priority),
                PlanningEvent::BidRoundExpired {
                    doc_number,
                    round_id,
                } => self.handle_bid_round_expired(&doc_number, round_id),
                // 路由不会向协调者投递以下事件
                PlanningEvent::BidRequest { .. }
                | PlanningEvent::AllocationAward { .. }
                | PlanningEvent::ScheduleUpdated => {
                    trace!(kind = "misrouted", "协调者忽略非本端事件");
                }
            }
        }

        info!("协调者通道关闭, 退出");
    }

    // ==========================================
    // 订单创建与竞标开启
    // ==========================================

    fn handle_order_created(&mut self, order: Order) {
        info!(
            doc_number = %order.doc_number,
            product_code = %order.product_code,
            ordered_qty = order.ordered_qty,
            "新订单到达"
        );

        let doc_number = order.doc_number.clone();
        // 重复发单只覆盖订单数据, 不回退已进入竞标的阶段
        self.phases
            .entry(doc_number.clone())
            .or_insert(OrderPhase::New);
        self.orders.insert(doc_number.clone(), order);
        self.open_bid_round(&doc_number);
    }

    /// 开启竞标回合: 发布 BidRequest 并挂起到期定时器
    fn open_bid_round(&mut self, doc_number: &str) {
        // 已有进行中的回合时不重复开启 (数据源重复发单的防线)
        if self.phases.get(doc_number) == Some(&OrderPhase::BiddingOpen) {
            debug!(doc_number, "竞标回合已在进行, 忽略重复开启");
            return;
        }

        let order = match self.orders.get(doc_number) {
            Some(o) => o,
            None => return,
        };

        let work_hours = order.remaining_work_hours();
        if work_hours <= 0.0 {
            debug!(doc_number, "订单无剩余工时, 不开竞标");
            if order.is_complete() {
                self.phases
                    .insert(doc_number.to_string(), OrderPhase::Completed);
            }
            return;
        }

        let expected = self
            .workers
            .iter()
            .filter(|w| w.is_eligible(&order.product_code))
            .count();
        if expected == 0 {
            warn!(doc_number, product_code = %order.product_code, "无合格工人, 竞标不开启");
            return;
        }

        let round_id = Uuid::new_v4();
        self.active_bids.insert(
            doc_number.to_string(),
            BidRound {
                round_id,
                expected,
                responses: Vec::new(),
            },
        );
        self.phases
            .insert(doc_number.to_string(), OrderPhase::BiddingOpen);

        info!(doc_number, expected, %round_id, "竞标回合开启");
        self.bus.publish(PlanningEvent::BidRequest {
            doc_number: doc_number.to_string(),
            product_code: order.product_code.clone(),
            work_hours,
            due_date: order.due_date,
        });

        // 到期定时器: 事件驱动投递回本循环, 过期回合按部分响应结算
        let bus = self.bus.clone();
        let doc = doc_number.to_string();
        let timeout = self.bid_timeout;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            bus.publish(PlanningEvent::BidRoundExpired {
                doc_number: doc,
                round_id,
            });
        });
    }

    // ==========================================
    // 竞标响应与结算
    // ==========================================

    fn handle_bid_response(
        &mut self,
        doc_number: &str,
        worker_id: WorkerId,
        capacity: f64,
        proposed: BTreeMap<NaiveDate, f64>,
    ) {
        if !self.orders.contains_key(doc_number) {
            warn!(doc_number, worker_id, "竞标响应引用未知订单, 已忽略");
            return;
        }
        let round = match self.active_bids.get_mut(doc_number) {
            Some(r) => r,
            None => {
                debug!(doc_number, worker_id, "无进行中的竞标回合, 响应忽略");
                return;
            }
        };

        round.responses.push(CollectedBid {
            worker_id,
            capacity,
            proposed,
        });
        debug!(
            doc_number,
            worker_id,
            collected = round.responses.len(),
            expected = round.expected,
            "收到竞标响应"
        );

        if round.responses.len() >= round.expected {
            self.process_bids(doc_number);
        }
    }

    fn handle_bid_round_expired(&mut self, doc_number: &str, round_id: Uuid) {
        let round = match self.active_bids.get(doc_number) {
            Some(r) => r,
            None => return, // 回合已正常结算
        };
        if round.round_id != round_id {
            return; // 过期定时器属于更早的回合
        }

        if round.responses.is_empty() {
            warn!(doc_number, "竞标超时且无响应, 回合丢弃");
            self.active_bids.remove(doc_number);
            self.phases.insert(doc_number.to_string(), OrderPhase::New);
            return;
        }

        info!(
            doc_number,
            collected = round.responses.len(),
            expected = round.expected,
            "竞标超时, 按部分响应结算"
        );
        self.process_bids(doc_number);
    }

    /// 结算竞标: 容量降序走标书, 标书内按产生顺序走 (日期, 工时) 条目
    fn process_bids(&mut self, doc_number: &str) {
        let mut round = match self.active_bids.remove(doc_number) {
            Some(r) => r,
            None => return,
        };
        let order = match self.orders.get(doc_number) {
            Some(o) => o,
            None => return,
        };

        round
            .responses
            .sort_by(|a, b| b.capacity.total_cmp(&a.capacity));

        let mut remaining_hours = order.remaining_work_hours();
        // 保持标书走访顺序, 每工人至多一条裁定
        let mut awards: Vec<(WorkerId, BTreeMap<NaiveDate, f64>)> = Vec::new();

        for bid in &round.responses {
            if remaining_hours <= 0.0 {
                break;
            }

            let mut granted: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            for (&day, &hours) in &bid.proposed {
                if remaining_hours <= 0.0 {
                    break;
                }
                let allocated = hours.min(remaining_hours);
                if allocated > 0.0 {
                    granted.insert(day, allocated);
                    remaining_hours -= allocated;
                }
            }

            if !granted.is_empty() {
                awards.push((bid.worker_id, granted));
            }
        }

        // 裁定落入权威状态: 以权威工人池的实际扣减为准
        // 工人镜像可能乐观 (前一轮裁定尚未落地), 超出权威余量的提案在此截断
        let mut committed_awards = 0usize;
        for (worker_id, granted) in &awards {
            let mut committed: BTreeMap<NaiveDate, f64> = BTreeMap::new();
            if let Some(worker) = self.workers.iter_mut().find(|w| w.id == *worker_id) {
                for (&day, &hours) in granted {
                    let hours = worker.allocate_hours(day, hours);
                    if hours > 0.0 {
                        self.schedule.add_allocation(Allocation::new(
                            doc_number.to_string(),
                            *worker_id,
                            day,
                            hours,
                        ));
                        committed.insert(day, hours);
                    }
                }
            }

            // 零承诺不发裁定, 工人镜像不被多扣
            if committed.is_empty() {
                debug!(doc_number, worker_id, "权威余量不足, 该标书无实际承诺");
                continue;
            }

            committed_awards += 1;
            self.bus.publish(PlanningEvent::AllocationAward {
                doc_number: doc_number.to_string(),
                worker_id: *worker_id,
                allocations: committed,
            });
        }

        info!(
            doc_number,
            awards = committed_awards,
            unallocated_hours = remaining_hours.max(0.0),
            "竞标结算完成"
        );

        if committed_awards > 0 {
            self.phases
                .insert(doc_number.to_string(), OrderPhase::Allocated);
        }

        self.refresh_board();
        self.bus.publish(PlanningEvent::ScheduleUpdated);
    }

    // ==========================================
    // 订单变更与整表重建
    // ==========================================

    fn handle_order_updated(
        &mut self,
        doc_number: &str,
        ordered_qty: i64,
        consumed_qty: i64,
        due_date: NaiveDate,
        priority_manual: Option<i32>,
    ) {
        let today = self.today();
        let order = match self.orders.get_mut(doc_number) {
            Some(o) => o,
            None => {
                warn!(doc_number, "订单变更引用未知订单, 已忽略");
                return;
            }
        };

        order.ordered_qty = ordered_qty;
        order.consumed_qty = consumed_qty;
        order.due_date = due_date;
        if priority_manual.is_some() {
            order.priority_manual = priority_manual;
        }
        order.calculated_priority = self.calculator.compute_priority(order, today);

        info!(doc_number, ordered_qty, consumed_qty, %due_date, "订单已变更");
        self.recalculate_schedule();
    }

    fn handle_priority_change(&mut self, doc_number: &str, new_priority: i32) {
        let today = self.today();
        let order = match self.orders.get_mut(doc_number) {
            Some(o) => o,
            None => {
                warn!(doc_number, "优先级变更引用未知订单, 已忽略");
                return;
            }
        };

        order.priority_manual = Some(new_priority);
        order.calculated_priority = self.calculator.compute_priority(order, today);

        info!(doc_number, new_priority, "人工优先级已变更");
        self.recalculate_schedule();
    }

    fn handle_progress_update(
        &mut self,
        doc_number: &str,
        worker_id: WorkerId,
        qty_done: i64,
        date: NaiveDate,
    ) {
        let order = match self.orders.get_mut(doc_number) {
            Some(o) => o,
            None => {
                warn!(doc_number, worker_id, "进度上报引用未知订单, 已忽略");
                return;
            }
        };

        order.consumed_qty += qty_done;
        let complete = order.is_complete();
        info!(
            doc_number,
            worker_id,
            consumed = order.consumed_qty,
            ordered = order.ordered_qty,
            "进度已更新"
        );

        self.schedule.mark_completed(doc_number, worker_id, date);

        if complete {
            info!(doc_number, "订单完成, 不再排产");
            self.phases
                .insert(doc_number.to_string(), OrderPhase::Completed);
            // 记录保留, 不做整表重建; 看板与镜像仍需刷新
            self.refresh_board();
            self.bus.publish(PlanningEvent::ScheduleUpdated);
        } else {
            self.recalculate_schedule();
        }
    }

    /// 整表重建权威计划 (对所有剩余量为正的订单)
    fn recalculate_schedule(&mut self) {
        let today = self.today();
        let mut active: Vec<Order> = self
            .orders
            .values()
            .filter(|o| o.pending_qty() > 0)
            .cloned()
            .collect();

        self.schedule =
            self.scheduler
                .create_schedule(&mut active, &mut self.workers, today, self.horizon_days);

        // 回写重建中刷新的计算优先级
        for order in &active {
            if let Some(stored) = self.orders.get_mut(&order.doc_number) {
                stored.calculated_priority = order.calculated_priority;
            }
        }

        let delays = self.scheduler.check_delays(&self.schedule, &active);
        for (doc_number, delay_days) in &delays {
            warn!(doc_number = %doc_number, delay_days, "预计延期交付");
        }

        self.refresh_board();
        self.bus.publish(PlanningEvent::ScheduleUpdated);
    }

    /// 把权威状态汇总成看板快照
    fn refresh_board(&self) {
        let orders: Vec<Order> = self.orders.values().cloned().collect();
        let delays = self.scheduler.check_delays(&self.schedule, &orders);
        let worker_load = self.scheduler.worker_load(&self.schedule, &self.workers);
        let progress = self.scheduler.order_progress(&orders);

        self.board.publish(BoardSnapshot {
            orders,
            workers: self.workers.clone(),
            schedule: self.schedule.clone(),
            delays,
            worker_load,
            progress,
        });
    }
}
