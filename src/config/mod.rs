// ==========================================
// 生产订单分配排产系统 - 配置模块
// ==========================================
// 职责: 应用配置的加载与默认值管理
// 存储: JSON 配置文件 (缺失时退回默认配置)
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

// ==========================================
// 优先级配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityConfig {
    /// 紧急度阈值 (天): [特急, 紧急, 一般]
    #[serde(default = "default_urgency_thresholds")]
    pub urgency_thresholds: [i64; 3],
    /// 大单工时阈值 (小时)
    #[serde(default = "default_size_threshold_hours")]
    pub size_threshold_hours: f64,
}

fn default_urgency_thresholds() -> [i64; 3] {
    [2, 5, 10]
}

fn default_size_threshold_hours() -> f64 {
    8.0
}

impl Default for PriorityConfig {
    fn default() -> Self {
        Self {
            urgency_thresholds: default_urgency_thresholds(),
            size_threshold_hours: default_size_threshold_hours(),
        }
    }
}

// ==========================================
// 工位资源配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub id: u32,
    pub name: String,
    #[serde(default = "default_hours_per_day")]
    pub hours_per_day: f64,
    /// 技能标签, 空表示通用工位
    #[serde(default)]
    pub skills: Vec<String>,
}

fn default_hours_per_day() -> f64 {
    8.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceConfig {
    #[serde(default = "default_workers")]
    pub workers: Vec<WorkerConfig>,
}

fn default_workers() -> Vec<WorkerConfig> {
    (1..=3)
        .map(|id| WorkerConfig {
            id,
            name: format!("工位-{}", id),
            hours_per_day: default_hours_per_day(),
            skills: Vec::new(),
        })
        .collect()
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

// ==========================================
// 排产与竞标配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// 排产视野 (天)
    #[serde(default = "default_horizon_days")]
    pub horizon_days: i64,
    /// 竞标轮超时 (秒)
    #[serde(default = "default_bid_timeout_secs")]
    pub bid_timeout_secs: u64,
}

fn default_horizon_days() -> i64 {
    14
}

fn default_bid_timeout_secs() -> u64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            horizon_days: default_horizon_days(),
            bid_timeout_secs: default_bid_timeout_secs(),
        }
    }
}

// ==========================================
// 订单数据源配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// 订单文件路径 (.xlsx 或 .csv)
    #[serde(default = "default_feed_path")]
    pub path: PathBuf,
    /// 轮询间隔 (秒)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// 缺省单件工时 (小时/件)
    #[serde(default = "default_cycle_time_hours")]
    pub default_cycle_time_hours: f64,
}

fn default_feed_path() -> PathBuf {
    PathBuf::from("orders.xlsx")
}

fn default_poll_interval_secs() -> u64 {
    10
}

fn default_cycle_time_hours() -> f64 {
    0.5
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            path: default_feed_path(),
            poll_interval_secs: default_poll_interval_secs(),
            default_cycle_time_hours: default_cycle_time_hours(),
        }
    }
}

// ==========================================
// 数据库配置
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// 镜像数据库路径, 未配置时落在用户数据目录
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self { path: None }
    }
}

impl DatabaseConfig {
    /// 解析实际数据库路径
    pub fn resolve_path(&self) -> PathBuf {
        if let Some(path) = &self.path {
            return path.clone();
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("order-allocation-aps")
            .join("schedule.db")
    }
}

// ==========================================
// AppConfig - 应用配置总成
// ==========================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub priority: PriorityConfig,
    #[serde(default)]
    pub resources: ResourceConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    ///
    /// # 参数
    /// - path: 配置文件路径
    ///
    /// # 返回
    /// - 文件不存在或解析失败时记录日志并返回默认配置
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<AppConfig>(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件已加载");
                    config
                }
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "配置文件解析失败, 使用默认配置");
                    AppConfig::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "配置文件不存在, 使用默认配置");
                AppConfig::default()
            }
        }
    }
}
