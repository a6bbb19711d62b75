// ==========================================
// 设备时间损失 - 引擎层协作方接口
// ==========================================
// 职责: 定义聚合器依赖的外部协作方, 并聚合为一个注入参数
// 红线: 引擎只依赖接口, 不关心数据来源 (内存/文件/数据库)
// ==========================================

use crate::domain::error::LossResult;
use crate::domain::quantity::{Quantity, QuantityArithmetic, StandardArithmetic};
use crate::domain::summary::{AvailabilitySummary, ProductionSummary};
use crate::domain::work_schedule::NonWorkingTime;
use chrono::{DateTime, FixedOffset};
use std::sync::Arc;

// ==========================================
// Trait: SummaryStore
// ==========================================
// 用途: 按设备与时间窗口读取汇总记录
// 实现者: InMemorySummaryStore
pub trait SummaryStore: Send + Sync {
    /// 读取可用性汇总 (顺序不作要求, 可为空)
    fn fetch_availability_summaries(
        &self,
        equipment: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> LossResult<Vec<AvailabilitySummary>>;

    /// 读取产量汇总 (顺序不作要求, 可为空)
    fn fetch_production_summaries(
        &self,
        equipment: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> LossResult<Vec<ProductionSummary>>;
}

// ==========================================
// Trait: ScheduleResolver
// ==========================================
// 实现者: ConfigManager
pub trait ScheduleResolver: Send + Sync {
    /// 查询设备的工作日历, 未定义时返回 None
    fn resolve_schedule(&self, equipment: &str) -> Option<Arc<dyn NonWorkingTime>>;
}

// ==========================================
// Trait: DesignSpeedResolver
// ==========================================
// 实现者: ConfigManager
pub trait DesignSpeedResolver: Send + Sync {
    /// 查询设备 + 物料的设计速度, 未配置时返回 None
    fn resolve_design_speed(&self, equipment: &str, material: &str) -> Option<Quantity>;
}

/// 损失聚合协作方集合
///
/// 将汇总存储、工作日历、设计速度与单位运算合并为一个注入参数,
/// 单元测试时可整体替换为内存实现。
#[derive(Clone)]
pub struct LossRepositories {
    /// 汇总存储
    pub summary_store: Arc<dyn SummaryStore>,
    /// 工作日历
    pub schedule_resolver: Arc<dyn ScheduleResolver>,
    /// 设计速度
    pub design_speed_resolver: Arc<dyn DesignSpeedResolver>,
    /// 单位运算
    pub arithmetic: Arc<dyn QuantityArithmetic>,
}

impl LossRepositories {
    /// 创建协作方集合, 单位运算使用标准单位制
    pub fn new(
        summary_store: Arc<dyn SummaryStore>,
        schedule_resolver: Arc<dyn ScheduleResolver>,
        design_speed_resolver: Arc<dyn DesignSpeedResolver>,
    ) -> Self {
        Self {
            summary_store,
            schedule_resolver,
            design_speed_resolver,
            arithmetic: Arc::new(StandardArithmetic::new()),
        }
    }

    /// 替换单位运算实现
    pub fn with_arithmetic(mut self, arithmetic: Arc<dyn QuantityArithmetic>) -> Self {
        self.arithmetic = arithmetic;
        self
    }
}
