// ==========================================
// 生产订单分配排产系统 - 产能调度引擎
// ==========================================
// 贪心填充: 优先级降序 → 逐日扫描 → 可用工时最多的合格工人先分配
// 红线: 整表重建, 运行前重置所有工人可用工时; 不做增量修补
// 窗口耗尽后的剩余工时直接丢弃, 不产生显式"产能不足"信号
// ==========================================

use crate::domain::order::Order;
use crate::domain::schedule::{Allocation, WorkSchedule};
use crate::domain::types::WorkerId;
use crate::domain::worker::Worker;
use crate::engine::priority::PriorityCalculator;
use chrono::{Duration, NaiveDate};
use std::collections::HashMap;
use tracing::{debug, info};

// ==========================================
// CapacityScheduler - 产能调度器
// ==========================================
pub struct CapacityScheduler {
    calculator: PriorityCalculator,
}

impl CapacityScheduler {
    /// 构造函数
    ///
    /// # 参数
    /// - `calculator`: 优先级计算器
    pub fn new(calculator: PriorityCalculator) -> Self {
        Self { calculator }
    }

    /// 刷新优先级并按 (优先级降序, 交付期升序) 排序
    ///
    /// # 参数
    /// - `orders`: 待排序订单 (计算优先级就地刷新)
    /// - `today`: 当前日期
    pub fn prioritize_orders(&self, orders: &mut [Order], today: NaiveDate) {
        for order in orders.iter_mut() {
            order.calculated_priority = self.calculator.compute_priority(order, today);
        }
        orders.sort_by(|a, b| {
            b.calculated_priority
                .cmp(&a.calculated_priority)
                .then(a.due_date.cmp(&b.due_date))
        });
    }

    /// 创建排产计划 (整表重建)
    ///
    /// 算法:
    /// 1. 刷新优先级, 按优先级降序 / 交付期升序排序
    /// 2. 逐订单从 start_date 起扫描 horizon_days 个候选日:
    ///    按技能过滤合格工人, 按当日可用工时降序分配,
    ///    剩余工时归零或窗口耗尽即停
    ///
    /// # 参数
    /// - `orders`: 待排产订单 (优先级就地刷新)
    /// - `workers`: 工人池 (可用工时表先重置再扣减)
    /// - `start_date`: 排产起始日
    /// - `horizon_days`: 滚动窗口天数
    ///
    /// # 返回
    /// 新建的排产计划
    pub fn create_schedule(
        &self,
        orders: &mut [Order],
        workers: &mut [Worker],
        start_date: NaiveDate,
        horizon_days: i64,
    ) -> WorkSchedule {
        info!(
            orders_count = orders.len(),
            workers_count = workers.len(),
            %start_date,
            horizon_days,
            "开始整表重建排产计划"
        );

        self.prioritize_orders(orders, start_date);

        // 整表重建: 恢复所有工人满产能
        for worker in workers.iter_mut() {
            worker.reset_availability();
        }

        let mut schedule = WorkSchedule::new();
        let work_dates: Vec<NaiveDate> =
            (0..horizon_days).map(|i| start_date + Duration::days(i)).collect();

        for order in orders.iter() {
            let mut remaining_hours = order.remaining_work_hours();

            // 负剩余量视为已满足
            if remaining_hours <= 0.0 {
                continue;
            }

            for &day in &work_dates {
                if remaining_hours <= 0.0 {
                    break;
                }

                // 技能过滤 + 当日可用工时降序
                let mut eligible: Vec<usize> = workers
                    .iter()
                    .enumerate()
                    .filter(|(_, w)| w.is_eligible(&order.product_code))
                    .map(|(i, _)| i)
                    .collect();
                eligible.sort_by(|&a, &b| {
                    workers[b]
                        .available_hours(day)
                        .total_cmp(&workers[a].available_hours(day))
                });

                for idx in eligible {
                    let allocated = workers[idx].allocate_hours(day, remaining_hours);
                    if allocated > 0.0 {
                        schedule.add_allocation(Allocation::new(
                            order.doc_number.clone(),
                            workers[idx].id,
                            day,
                            allocated,
                        ));
                        remaining_hours -= allocated;

                        if remaining_hours <= 0.0 {
                            break;
                        }
                    }
                }
            }

            if remaining_hours > 0.0 {
                // 窗口内产能不足, 剩余部分静默丢弃 (仅日志可见)
                debug!(
                    doc_number = %order.doc_number,
                    unallocated_hours = remaining_hours,
                    "订单在窗口内未排满"
                );
            }
        }

        info!(
            allocations_count = schedule.allocations.len(),
            "排产计划重建完成"
        );
        schedule
    }

    /// 延期检测
    ///
    /// 完成日期 = 订单所有分配的最大日期; 超过交付期即记录延期天数。
    /// 零分配订单跳过 (即使显然已逾期也不标记)
    ///
    /// # 返回
    /// HashMap<单据号, 延期天数>
    pub fn check_delays(
        &self,
        schedule: &WorkSchedule,
        orders: &[Order],
    ) -> HashMap<String, i64> {
        let mut delays = HashMap::new();

        for order in orders {
            let completion_date = schedule
                .order_schedule(&order.doc_number)
                .iter()
                .map(|a| a.date)
                .max();

            let completion_date = match completion_date {
                Some(d) => d,
                None => continue,
            };

            if completion_date > order.due_date {
                let delay_days = (completion_date - order.due_date).num_days();
                delays.insert(order.doc_number.clone(), delay_days);
            }
        }

        delays
    }

    /// 工人负荷汇总: 工人 → 日期 → 分配工时合计
    pub fn worker_load(
        &self,
        schedule: &WorkSchedule,
        workers: &[Worker],
    ) -> HashMap<WorkerId, HashMap<NaiveDate, f64>> {
        let mut load: HashMap<WorkerId, HashMap<NaiveDate, f64>> =
            workers.iter().map(|w| (w.id, HashMap::new())).collect();

        for allocation in &schedule.allocations {
            *load
                .entry(allocation.worker_id)
                .or_default()
                .entry(allocation.date)
                .or_insert(0.0) += allocation.hours;
        }

        load
    }

    /// 订单进度百分比: consumed_hours / total_hours × 100, 上限 100
    ///
    /// total_hours <= 0 时定义为 100 (覆盖零数量/零节拍订单)
    pub fn order_progress(&self, orders: &[Order]) -> HashMap<String, f64> {
        let mut progress = HashMap::new();

        for order in orders {
            let total_hours = order.total_work_hours();
            let pct = if total_hours <= 0.0 {
                100.0
            } else {
                (order.consumed_work_hours() / total_hours * 100.0).min(100.0)
            };
            progress.insert(order.doc_number.clone(), pct);
        }

        progress
    }
}
