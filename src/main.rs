// ==========================================
// 生产订单分配排产系统 - 主入口
// ==========================================
// 技术栈: Tokio + Rust + SQLite
// 系统定位: 多代理竞标式产能分配
// ==========================================

use anyhow::Context;
use order_allocation_aps::agent::{CoordinatorAgent, WorkerAgent};
use order_allocation_aps::api::board::PlanningBoard;
use order_allocation_aps::config::AppConfig;
use order_allocation_aps::domain::{Order, Worker};
use order_allocation_aps::engine::{EventBus, PlanningEvent, PriorityCalculator};
use order_allocation_aps::importer::order_feed::OrderFeedMonitor;
use order_allocation_aps::logging;
use order_allocation_aps::repository::{spawn_mirror_task, ScheduleRepository};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", order_allocation_aps::APP_NAME);
    tracing::info!("系统版本: {}", order_allocation_aps::VERSION);
    tracing::info!("==================================================");

    // 加载配置 (第一个命令行参数为配置文件路径, 默认 config.json)
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config.json".to_string());
    let config = AppConfig::load(Path::new(&config_path));

    // 构建工人池
    let workers: Vec<Worker> = config
        .resources
        .workers
        .iter()
        .map(|w| {
            let mut worker = Worker::new(w.id, w.name.clone(), w.hours_per_day);
            worker.skills = w.skills.iter().cloned().collect();
            worker
        })
        .collect();
    let worker_ids: Vec<_> = workers.iter().map(|w| w.id).collect();
    tracing::info!(workers = workers.len(), "工人池已构建");

    // 事件总线
    let (bus, mut receivers) = EventBus::new(&worker_ids);

    // 排产看板
    let board = PlanningBoard::new();

    // SQLite 镜像仓储
    let db_path = config.database.resolve_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("创建数据目录失败: {}", parent.display()))?;
    }
    let db_path_str = db_path.to_string_lossy().to_string();
    tracing::info!(path = %db_path.display(), "使用镜像数据库");
    let repository = Arc::new(
        ScheduleRepository::new(&db_path_str).context("初始化镜像数据库失败")?,
    );

    // 重启恢复: 读取镜像中的存量订单
    let restored_orders: Vec<Order> = repository.load_orders().context("读取镜像订单失败")?;
    if !restored_orders.is_empty() {
        tracing::info!(orders = restored_orders.len(), "从镜像恢复存量订单");
    }

    // 镜像任务 (订阅 ScheduleUpdated)
    spawn_mirror_task(Arc::clone(&repository), board.clone(), bus.subscribe());

    // 工人代理
    for worker in &workers {
        let rx = receivers
            .workers
            .remove(&worker.id)
            .context("工人接收端缺失")?;
        let agent = WorkerAgent::new(
            Arc::clone(&bus),
            rx,
            worker.clone(),
            config.schedule.horizon_days,
        );
        tokio::spawn(agent.run());
    }

    // 协调者代理
    let calculator = PriorityCalculator::new(
        config.priority.urgency_thresholds,
        config.priority.size_threshold_hours,
    );
    let coordinator = CoordinatorAgent::new(
        Arc::clone(&bus),
        receivers.coordinator,
        workers,
        calculator,
        config.schedule.horizon_days,
        Duration::from_secs(config.schedule.bid_timeout_secs),
        board,
    );
    tokio::spawn(coordinator.run());

    // 存量订单重新进入排产流程
    let mut monitor = OrderFeedMonitor::new(
        config.feed.path.clone(),
        Duration::from_secs(config.feed.poll_interval_secs),
        config.feed.default_cycle_time_hours,
        Arc::clone(&bus),
    );
    monitor.seed_known_orders(&restored_orders);
    for order in restored_orders {
        bus.publish(PlanningEvent::OrderCreated { order });
    }
    tokio::spawn(monitor.run());

    tracing::info!("系统启动完成, Ctrl+C 退出");
    tokio::signal::ctrl_c().await.context("等待退出信号失败")?;
    tracing::info!("收到退出信号, 系统关闭");

    Ok(())
}
