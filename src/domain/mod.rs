// ==========================================
// 设备时间损失 - 领域模型层
// ==========================================
// 职责: 损失类别、数量与单位、汇总记录、工作日历、损失瀑布
// 红线: 不含 I/O, 不含数据获取逻辑
// ==========================================

pub mod error;
pub mod quantity;
pub mod summary;
pub mod types;
pub mod waterfall;
pub mod work_schedule;

// 重导出核心类型
pub use error::{LossError, LossResult};
pub use quantity::{
    Dimension, MaterialDimension, MaterialUnit, Quantity, QuantityArithmetic,
    StandardArithmetic, TimeUnit, Unit,
};
pub use summary::{AvailabilitySummary, ProductionSummary, Reason, TimeSpan};
pub use types::{ProductionKind, TimeLoss};
pub use waterfall::LossWaterfall;
pub use work_schedule::{NonWorkingPeriod, NonWorkingTime, Shift, WorkSchedule};
