// ==========================================
// 生产订单分配排产系统 - 订单摄取错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 订单摄取错误
#[derive(Error, Debug)]
pub enum FeedError {
    // ===== 文件相关 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("Excel 解析失败: {0}")]
    ExcelParse(String),

    #[error("CSV 解析失败: {0}")]
    CsvParse(#[from] csv::Error),

    // ===== 字段映射 =====
    #[error("字段缺失 (行 {row}): {field}")]
    FieldMissing { row: usize, field: &'static str },

    #[error("类型转换失败 (行 {row}, 字段 {field}): {value}")]
    TypeConversion {
        row: usize,
        field: &'static str,
        value: String,
    },

    #[error("日期格式错误 (行 {row}, 字段 {field}): 期望 YYYY-MM-DD, 实际 {value}")]
    DateFormat {
        row: usize,
        field: &'static str,
        value: String,
    },
}
