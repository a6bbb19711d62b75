// ==========================================
// 设备时间损失 - 损失聚合器
// ==========================================
// 用途: 从汇总记录与工作日历生成一份损失瀑布
// 流程: 工作日历 -> 可用性汇总 -> 设计速度 -> 产量汇总 -> 降速残差 -> 非计划时间
// 红线: 单次调用要么返回完整瀑布, 要么返回错误, 不返回部分结果
// ==========================================

use crate::domain::error::{LossError, LossResult};
use crate::domain::types::{ProductionKind, TimeLoss};
use crate::domain::waterfall::LossWaterfall;
use crate::engine::repositories::LossRepositories;
use chrono::{DateTime, Duration, FixedOffset};
use tracing::{debug, info, warn};

// ==========================================
// LossAggregator - 损失聚合器
// ==========================================
pub struct LossAggregator {
    repos: LossRepositories,
}

impl LossAggregator {
    pub fn new(repos: LossRepositories) -> Self {
        Self { repos }
    }

    /// 计算设备在 [from, to] 内的损失瀑布
    ///
    /// # 参数
    /// - equipment: 设备标识
    /// - material: 物料标识 (用于查询设计速度)
    /// - from / to: 请求时间窗口
    ///
    /// # 返回
    /// - Ok(LossWaterfall): 时间范围为实际观测到的记录范围, 不是请求窗口
    /// - Err(LossError): 工作日历/设计速度缺失, 单位换算失败, 汇总读取失败
    pub fn compute_loss(
        &self,
        equipment: &str,
        material: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> LossResult<LossWaterfall> {
        info!(
            equipment = %equipment,
            material = %material,
            from = %from,
            to = %to,
            "开始计算设备时间损失"
        );

        let mut waterfall =
            LossWaterfall::new(equipment, material, self.repos.arithmetic.clone());

        // ==========================================
        // 步骤1: 工作日历
        // ==========================================
        let schedule = self
            .repos
            .schedule_resolver
            .resolve_schedule(equipment)
            .ok_or_else(|| LossError::MissingSchedule {
                equipment: equipment.to_string(),
            })?;

        // ==========================================
        // 步骤2: 可用性汇总 -> 损失桶
        // ==========================================
        let availability = self
            .repos
            .summary_store
            .fetch_availability_summaries(equipment, from, to)?;
        debug!(count = availability.len(), "读取可用性汇总");

        for summary in &availability {
            waterfall.extend_time_extent(summary.start_time, summary.end_time);

            let loss = summary.loss();
            if loss == TimeLoss::ReducedSpeed {
                // 降速损失只由残差得出
                warn!(
                    reason = %summary.reason.name,
                    start_time = %summary.start_time,
                    "忽略直接标记为降速损失的可用性记录"
                );
                continue;
            }
            waterfall.add_loss(loss, summary.duration());
        }

        // ==========================================
        // 步骤3: 设计速度
        // ==========================================
        let design_speed = self
            .repos
            .design_speed_resolver
            .resolve_design_speed(equipment, material)
            .ok_or_else(|| LossError::MissingDesignSpeed {
                equipment: equipment.to_string(),
                material: material.to_string(),
            })?;
        waterfall.set_design_speed(design_speed);
        debug!(design_speed = %design_speed, "设计速度已确定");

        // ==========================================
        // 步骤4: 产量汇总 -> 良品/废品/启动损耗
        // ==========================================
        let production = self
            .repos
            .summary_store
            .fetch_production_summaries(equipment, from, to)?;
        debug!(count = production.len(), "读取产量汇总");

        for summary in &production {
            waterfall.extend_time_extent(summary.start_time, summary.end_time);

            match summary.kind {
                ProductionKind::Good => waterfall.increment_good_quantity(summary.quantity)?,
                ProductionKind::Reject => waterfall.increment_reject_quantity(summary.quantity)?,
                ProductionKind::Startup => {
                    waterfall.increment_startup_quantity(summary.quantity)?
                }
            }
        }

        // ==========================================
        // 步骤5: 降速残差 (仅此一次)
        // ==========================================
        let reduced_speed = waterfall.finalize_reduced_speed_loss();
        if reduced_speed < Duration::zero() {
            warn!(
                equipment = %equipment,
                reduced_speed_secs = reduced_speed.num_seconds(),
                "降速损失为负: 良品折算时间超过净生产时间"
            );
        }

        // ==========================================
        // 步骤6: 非计划时间 (按观测范围, 本地时间)
        // ==========================================
        if let (Some(start), Some(end)) = (waterfall.start_time(), waterfall.end_time()) {
            let not_scheduled =
                schedule.non_working_duration(start.naive_local(), end.naive_local());
            waterfall.set_loss(TimeLoss::NotScheduled, not_scheduled);
        }

        info!(
            equipment = %equipment,
            availability_records = availability.len(),
            production_records = production.len(),
            available_secs = waterfall.available_time().num_seconds(),
            oee = waterfall.oee_percentage(),
            "设备时间损失计算完成"
        );

        Ok(waterfall)
    }
}
