// ==========================================
// 设备时间损失 - 引擎层
// ==========================================
// 职责: 编排协作方, 将汇总记录归约为损失瀑布
// 红线: 引擎不做 I/O, 协作方通过接口注入
// ==========================================

pub mod loss_aggregator;
pub mod repositories;

// 重导出核心引擎
pub use loss_aggregator::LossAggregator;
pub use repositories::{DesignSpeedResolver, LossRepositories, ScheduleResolver, SummaryStore};
