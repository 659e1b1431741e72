// ==========================================
// 生产订单分配排产系统 - 镜像任务
// ==========================================
// 职责: 订阅 ScheduleUpdated, 把看板快照写入 SQLite 镜像
// 失败只记日志, 下一次 ScheduleUpdated 重试整体快照
// ==========================================

use crate::api::board::PlanningBoard;
use crate::engine::events::PlanningEvent;
use crate::repository::schedule_repository::ScheduleRepository;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// 启动镜像任务
///
/// # 参数
/// - `repository`: 镜像仓储
/// - `board`: 只读看板
/// - `rx`: 观察者订阅端 (只收到 ScheduleUpdated)
pub fn spawn_mirror_task(
    repository: Arc<ScheduleRepository>,
    board: PlanningBoard,
    mut rx: broadcast::Receiver<PlanningEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("排产镜像任务启动");

        loop {
            match rx.recv().await {
                Ok(PlanningEvent::ScheduleUpdated) => {
                    let snapshot = board.snapshot();
                    let result = repository
                        .save_orders(&snapshot.orders)
                        .and_then(|_| repository.save_workers(&snapshot.workers))
                        .and_then(|_| repository.save_schedule(&snapshot.schedule));
                    match result {
                        Ok(()) => debug!(
                            orders = snapshot.orders.len(),
                            allocations = snapshot.schedule.allocations.len(),
                            "镜像快照已写入"
                        ),
                        Err(err) => error!(error = %err, "镜像写入失败"),
                    }
                }
                Ok(other) => {
                    debug!(kind = other.kind(), "镜像任务忽略事件");
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // 快照是全量的, 丢失中间信号无碍, 下一条补齐
                    warn!(skipped, "镜像任务滞后, 跳过中间信号");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }

        info!("镜像任务退出");
    })
}
