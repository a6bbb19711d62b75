// ==========================================
// 设备时间损失 - API 层
// ==========================================
// 职责: 提供面向调用方的计算入口与报告结构
// ==========================================

pub mod dto;
pub mod error;
pub mod loss_api;

// 重导出核心类型
pub use dto::{LossReport, MetricsDto, ParetoItemDto, WaterfallDto};
pub use error::{ApiError, ApiResult};
pub use loss_api::LossApi;
