// ==========================================
// 设备时间损失 - API层错误类型
// ==========================================
// 职责: 汇总配置/导入/计算三类错误, 保留原始原因
// ==========================================

use crate::config::ConfigError;
use crate::domain::error::LossError;
use crate::importer::error::ImportError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    #[error("文件导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("损失计算失败: {0}")]
    Loss(#[from] LossError),
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
