// ==========================================
// 设备时间损失 - 核心库
// ==========================================
// 用途: 可用性/产量汇总 -> 时间损失瀑布 -> OEE 指标
// 系统定位: 纯计算归约, 不做调度与轮询
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 损失类别、数量、瀑布模型
pub mod domain;

// 数据仓储层 - 汇总存储实现
pub mod repository;

// 引擎层 - 损失聚合
pub mod engine;

// 导入层 - 汇总文件
pub mod importer;

// 配置层 - 工厂配置
pub mod config;

// 日志系统
pub mod logging;

// API 层 - 计算入口与报告
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::{
    AvailabilitySummary, LossError, LossResult, LossWaterfall, ProductionKind, ProductionSummary,
    Quantity, QuantityArithmetic, Reason, StandardArithmetic, TimeLoss, Unit, WorkSchedule,
};

// 引擎
pub use engine::{LossAggregator, LossRepositories};

// API
pub use api::{LossApi, LossReport};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "设备时间损失分析";
