// ==========================================
// 设备时间损失 - 报告 DTO 定义
// ==========================================
// 职责: 将损失瀑布展开为可序列化的报告结构
// 时长统一以秒表示
// ==========================================

use crate::domain::error::LossResult;
use crate::domain::quantity::Quantity;
use crate::domain::types::TimeLoss;
use crate::domain::waterfall::LossWaterfall;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// 损失报告
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossReport {
    /// 报告 ID
    pub report_id: String,

    pub equipment: String,
    pub material: String,

    /// 观测时间范围（无记录时为空）
    pub start_time: Option<DateTime<FixedOffset>>,
    pub end_time: Option<DateTime<FixedOffset>>,

    /// 十个损失桶 (秒)
    pub losses: BTreeMap<TimeLoss, i64>,

    /// 瀑布各级时间
    pub waterfall: WaterfallDto,

    /// 百分比指标
    pub metrics: MetricsDto,

    /// 产量
    pub good_quantity: Option<Quantity>,
    pub reject_quantity: Option<Quantity>,
    pub startup_quantity: Option<Quantity>,
    pub design_speed: Option<Quantity>,

    /// 非零损失, 按时长降序
    pub pareto: Vec<ParetoItemDto>,
}

/// 瀑布各级时间 DTO (秒)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterfallDto {
    pub total_secs: i64,
    pub required_operations_secs: i64,
    pub available_secs: i64,
    pub scheduled_production_secs: i64,
    pub production_secs: i64,
    pub reported_production_secs: i64,
    pub net_production_secs: i64,
    pub efficient_net_production_secs: i64,
    pub effective_net_production_secs: i64,
    pub value_adding_secs: i64,
}

/// 百分比指标 DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsDto {
    pub high_level_oee_pct: f64,
    pub oee_pct: f64,
    pub availability_pct: f64,
    pub performance_pct: f64,
    pub quality_pct: f64,
}

/// 帕累托项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParetoItemDto {
    pub loss: TimeLoss,
    pub secs: i64,
}

impl LossReport {
    /// 从已完成的损失瀑布生成报告
    pub fn from_waterfall(waterfall: &LossWaterfall) -> LossResult<Self> {
        let metrics = MetricsDto {
            high_level_oee_pct: waterfall.high_level_oee_percentage()?,
            oee_pct: waterfall.oee_percentage(),
            availability_pct: waterfall.availability_percentage(),
            performance_pct: waterfall.performance_percentage(),
            quality_pct: waterfall.quality_percentage(),
        };

        let stages = WaterfallDto {
            total_secs: waterfall.total_duration().num_seconds(),
            required_operations_secs: waterfall.required_operations_time().num_seconds(),
            available_secs: waterfall.available_time().num_seconds(),
            scheduled_production_secs: waterfall.scheduled_production_time().num_seconds(),
            production_secs: waterfall.production_time().num_seconds(),
            reported_production_secs: waterfall.reported_production_time().num_seconds(),
            net_production_secs: waterfall.net_production_time().num_seconds(),
            efficient_net_production_secs: waterfall
                .efficient_net_production_time()
                .num_seconds(),
            effective_net_production_secs: waterfall
                .effective_net_production_time()
                .num_seconds(),
            value_adding_secs: waterfall.value_adding_time().num_seconds(),
        };

        Ok(Self {
            report_id: Uuid::new_v4().to_string(),
            equipment: waterfall.equipment().to_string(),
            material: waterfall.material().to_string(),
            start_time: waterfall.start_time(),
            end_time: waterfall.end_time(),
            losses: waterfall
                .buckets()
                .iter()
                .map(|(loss, duration)| (*loss, duration.num_seconds()))
                .collect(),
            waterfall: stages,
            metrics,
            good_quantity: waterfall.good_quantity(),
            reject_quantity: waterfall.reject_quantity(),
            startup_quantity: waterfall.startup_quantity(),
            design_speed: waterfall.design_speed(),
            pareto: waterfall
                .loss_pareto()
                .into_iter()
                .map(|(loss, duration)| ParetoItemDto {
                    loss,
                    secs: duration.num_seconds(),
                })
                .collect(),
        })
    }
}
