// ==========================================
// 设备时间损失 - 损失瀑布模型
// ==========================================
// 用途: 单台设备 + 单个时间范围的十类时间损失累加器
// 红线: 瀑布各级时间均在读取时重新计算, 不缓存
// 红线: 不做截断/夹紧, 输入一致性由调用方负责
// ==========================================
//
// 瀑布 (每级只扣减一个损失桶):
//
//   总时长                     = end_time - start_time
//   要求运行时间 (required)    = 总时长 - NOT_SCHEDULED
//   可用时间 (available)       = 要求运行时间 - UNSCHEDULED
//   计划生产时间 (scheduled)   = 可用时间 - PLANNED_DOWNTIME
//   生产时间 (production)      = 计划生产时间 - SETUP
//   报告生产时间 (reported)    = 生产时间 - UNPLANNED_DOWNTIME
//   净生产时间 (net)           = 报告生产时间 - MINOR_STOPPAGES
//   高效净生产时间 (efficient) = 净生产时间 - REDUCED_SPEED
//   有效净生产时间 (effective) = 高效净生产时间 - REJECT_REWORK
//   增值时间 (value adding)    = 有效净生产时间 - STARTUP_YIELD

use crate::domain::error::{LossError, LossResult};
use crate::domain::quantity::{Quantity, QuantityArithmetic};
use crate::domain::types::TimeLoss;
use chrono::{DateTime, Duration, FixedOffset};
use std::collections::BTreeMap;
use std::sync::Arc;

// ==========================================
// LossWaterfall - 损失瀑布
// ==========================================
#[derive(Debug, Clone)]
pub struct LossWaterfall {
    // ===== 归属 =====
    equipment: String,
    material: String,

    // ===== 观测时间范围 (非请求窗口) =====
    start_time: Option<DateTime<FixedOffset>>,
    end_time: Option<DateTime<FixedOffset>>,

    // ===== 损失桶 (十个类别恒存在) =====
    buckets: BTreeMap<TimeLoss, Duration>,

    // ===== 产量 =====
    good_quantity: Option<Quantity>,
    startup_quantity: Option<Quantity>,
    reject_quantity: Option<Quantity>,

    // ===== 设计速度 (物料/时间) =====
    design_speed: Option<Quantity>,

    arithmetic: Arc<dyn QuantityArithmetic>,
}

impl LossWaterfall {
    /// 创建空瀑布: 全部损失桶为零, 无产量, 无时间范围
    pub fn new(
        equipment: impl Into<String>,
        material: impl Into<String>,
        arithmetic: Arc<dyn QuantityArithmetic>,
    ) -> Self {
        let buckets = TimeLoss::ALL
            .iter()
            .map(|loss| (*loss, Duration::zero()))
            .collect();

        Self {
            equipment: equipment.into(),
            material: material.into(),
            start_time: None,
            end_time: None,
            buckets,
            good_quantity: None,
            startup_quantity: None,
            reject_quantity: None,
            design_speed: None,
            arithmetic,
        }
    }

    pub fn equipment(&self) -> &str {
        &self.equipment
    }

    pub fn material(&self) -> &str {
        &self.material
    }

    // ==========================================
    // 时间范围
    // ==========================================

    pub fn start_time(&self) -> Option<DateTime<FixedOffset>> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<FixedOffset>> {
        self.end_time
    }

    pub fn set_start_time(&mut self, start_time: DateTime<FixedOffset>) {
        self.start_time = Some(start_time);
    }

    pub fn set_end_time(&mut self, end_time: DateTime<FixedOffset>) {
        self.end_time = Some(end_time);
    }

    /// 用一条记录的起止时间扩展观测范围 (取最小开始/最大结束)
    pub fn extend_time_extent(
        &mut self,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
    ) {
        self.start_time = Some(match self.start_time {
            Some(current) if current <= start_time => current,
            _ => start_time,
        });
        self.end_time = Some(match self.end_time {
            Some(current) if current >= end_time => current,
            _ => end_time,
        });
    }

    /// 总时长, 起止任一未设置时为零
    pub fn total_duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end - start,
            _ => Duration::zero(),
        }
    }

    // ==========================================
    // 损失桶
    // ==========================================

    pub fn loss(&self, loss: TimeLoss) -> Duration {
        self.buckets.get(&loss).copied().unwrap_or_else(Duration::zero)
    }

    pub fn set_loss(&mut self, loss: TimeLoss, duration: Duration) {
        self.buckets.insert(loss, duration);
    }

    /// 在已有时长上累加
    pub fn add_loss(&mut self, loss: TimeLoss, duration: Duration) {
        let total = self.loss(loss) + duration;
        self.buckets.insert(loss, total);
    }

    /// 全部损失桶 (按瀑布顺序)
    pub fn buckets(&self) -> &BTreeMap<TimeLoss, Duration> {
        &self.buckets
    }

    /// 正值损失按时长降序排列 (帕累托), 时长相同按瀑布顺序
    ///
    /// 负的降速残差不是损失, 不列入
    pub fn loss_pareto(&self) -> Vec<(TimeLoss, Duration)> {
        let mut losses: Vec<(TimeLoss, Duration)> = self
            .buckets
            .iter()
            .filter(|(loss, duration)| loss.is_loss() && **duration > Duration::zero())
            .map(|(loss, duration)| (*loss, *duration))
            .collect();
        losses.sort_by(|a, b| b.1.cmp(&a.1));
        losses
    }

    // ==========================================
    // 瀑布各级时间
    // ==========================================

    pub fn required_operations_time(&self) -> Duration {
        self.total_duration() - self.loss(TimeLoss::NotScheduled)
    }

    pub fn available_time(&self) -> Duration {
        self.required_operations_time() - self.loss(TimeLoss::Unscheduled)
    }

    pub fn scheduled_production_time(&self) -> Duration {
        self.available_time() - self.loss(TimeLoss::PlannedDowntime)
    }

    pub fn production_time(&self) -> Duration {
        self.scheduled_production_time() - self.loss(TimeLoss::Setup)
    }

    pub fn reported_production_time(&self) -> Duration {
        self.production_time() - self.loss(TimeLoss::UnplannedDowntime)
    }

    pub fn net_production_time(&self) -> Duration {
        self.reported_production_time() - self.loss(TimeLoss::MinorStoppages)
    }

    pub fn efficient_net_production_time(&self) -> Duration {
        self.net_production_time() - self.loss(TimeLoss::ReducedSpeed)
    }

    pub fn effective_net_production_time(&self) -> Duration {
        self.efficient_net_production_time() - self.loss(TimeLoss::RejectRework)
    }

    pub fn value_adding_time(&self) -> Duration {
        self.effective_net_production_time() - self.loss(TimeLoss::StartupYield)
    }

    // ==========================================
    // 设计速度与产量
    // ==========================================

    pub fn design_speed(&self) -> Option<Quantity> {
        self.design_speed
    }

    pub fn set_design_speed(&mut self, design_speed: Quantity) {
        self.design_speed = Some(design_speed);
    }

    pub fn good_quantity(&self) -> Option<Quantity> {
        self.good_quantity
    }

    pub fn startup_quantity(&self) -> Option<Quantity> {
        self.startup_quantity
    }

    pub fn reject_quantity(&self) -> Option<Quantity> {
        self.reject_quantity
    }

    /// 设置良品数量, 并重算 NO_LOSS = 良品 ÷ 设计速度
    pub fn set_good_quantity(&mut self, quantity: Quantity) -> LossResult<()> {
        let duration = self.quantity_to_duration(&quantity)?;
        self.good_quantity = Some(quantity);
        self.set_loss(TimeLoss::NoLoss, duration);
        Ok(())
    }

    /// 设置启动损耗数量, 并重算 STARTUP_YIELD
    pub fn set_startup_quantity(&mut self, quantity: Quantity) -> LossResult<()> {
        let duration = self.quantity_to_duration(&quantity)?;
        self.startup_quantity = Some(quantity);
        self.set_loss(TimeLoss::StartupYield, duration);
        Ok(())
    }

    /// 设置废品返工数量, 并重算 REJECT_REWORK
    pub fn set_reject_quantity(&mut self, quantity: Quantity) -> LossResult<()> {
        let duration = self.quantity_to_duration(&quantity)?;
        self.reject_quantity = Some(quantity);
        self.set_loss(TimeLoss::RejectRework, duration);
        Ok(())
    }

    pub fn increment_good_quantity(&mut self, increment: Quantity) -> LossResult<()> {
        let total = self.accumulate(self.good_quantity, &increment)?;
        self.set_good_quantity(total)
    }

    pub fn increment_startup_quantity(&mut self, increment: Quantity) -> LossResult<()> {
        let total = self.accumulate(self.startup_quantity, &increment)?;
        self.set_startup_quantity(total)
    }

    pub fn increment_reject_quantity(&mut self, increment: Quantity) -> LossResult<()> {
        let total = self.accumulate(self.reject_quantity, &increment)?;
        self.set_reject_quantity(total)
    }

    /// 良品 + 废品 + 启动损耗 (单位取第一个已有数量的单位)
    pub fn total_quantity(&self) -> LossResult<Option<Quantity>> {
        let mut total: Option<Quantity> = None;
        for quantity in [self.good_quantity, self.reject_quantity, self.startup_quantity]
            .into_iter()
            .flatten()
        {
            total = Some(self.accumulate(total, &quantity)?);
        }
        Ok(total)
    }

    /// 理想产量 = 可用时间 × 设计速度
    pub fn ideal_quantity(&self) -> LossResult<Quantity> {
        let design_speed = self.design_speed.ok_or(LossError::UnsetReferenceRate)?;
        let available = Quantity::from_duration(self.available_time());
        self.arithmetic.multiply(&available, &design_speed)
    }

    fn accumulate(&self, current: Option<Quantity>, increment: &Quantity) -> LossResult<Quantity> {
        match current {
            Some(current) => self.arithmetic.add(&current, increment),
            None => Ok(*increment),
        }
    }

    /// 数量 ÷ 设计速度 -> 时长 (截断到整秒)
    fn quantity_to_duration(&self, quantity: &Quantity) -> LossResult<Duration> {
        let design_speed = self.design_speed.ok_or(LossError::UnsetReferenceRate)?;
        let time = self.arithmetic.divide(quantity, &design_speed)?;
        self.arithmetic.to_duration(&time)
    }

    // ==========================================
    // 残差: 降速损失
    // ==========================================

    /// REDUCED_SPEED = 净生产时间 - (REJECT_REWORK + STARTUP_YIELD) - NO_LOSS
    ///
    /// 前置条件: 全部记录已累加, 质量与无损失桶已是最终值; 每次聚合只调用一次。
    /// 结果可能为负 (良品折算时间超过净生产时间), 原样保留。
    pub(crate) fn finalize_reduced_speed_loss(&mut self) -> Duration {
        let quality = self.loss(TimeLoss::RejectRework) + self.loss(TimeLoss::StartupYield);
        let reduced_speed =
            self.net_production_time() - quality - self.loss(TimeLoss::NoLoss);
        self.set_loss(TimeLoss::ReducedSpeed, reduced_speed);
        reduced_speed
    }

    // ==========================================
    // 百分比指标 (分母为零时返回 0.0)
    // ==========================================

    /// 高层 OEE = 良品 ÷ (可用时间 × 设计速度) × 100
    pub fn high_level_oee_percentage(&self) -> LossResult<f64> {
        if self.available_time().is_zero() {
            return Ok(0.0);
        }

        let good = match self.good_quantity {
            Some(good) => good,
            None => return Ok(0.0),
        };

        let ideal = self.ideal_quantity()?;
        if ideal.amount == 0.0 {
            return Ok(0.0);
        }

        let ratio = self.arithmetic.divide(&good, &ideal)?;
        Ok(ratio.amount * 100.0)
    }

    /// OEE = 增值时间 / 可用时间
    pub fn oee_percentage(&self) -> f64 {
        percentage(self.value_adding_time(), self.available_time())
    }

    /// 性能 = 高效净生产时间 / 报告生产时间
    pub fn performance_percentage(&self) -> f64 {
        percentage(
            self.efficient_net_production_time(),
            self.reported_production_time(),
        )
    }

    /// 可用率 = 报告生产时间 / 可用时间
    pub fn availability_percentage(&self) -> f64 {
        percentage(self.reported_production_time(), self.available_time())
    }

    /// 质量 = 增值时间 / 高效净生产时间
    pub fn quality_percentage(&self) -> f64 {
        percentage(
            self.value_adding_time(),
            self.efficient_net_production_time(),
        )
    }
}

fn percentage(numerator: Duration, denominator: Duration) -> f64 {
    let denominator = denominator.num_milliseconds();
    if denominator == 0 {
        return 0.0;
    }
    numerator.num_milliseconds() as f64 / denominator as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quantity::{MaterialUnit, StandardArithmetic, TimeUnit, Unit};

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn empty() -> LossWaterfall {
        LossWaterfall::new("PKG-01", "SKU-100", Arc::new(StandardArithmetic::new()))
    }

    fn units(amount: f64) -> Quantity {
        Quantity::new(amount, Unit::Material(MaterialUnit::Unit))
    }

    fn per_minute(amount: f64) -> Quantity {
        Quantity::new(amount, Unit::Rate(MaterialUnit::Unit, TimeUnit::Minute))
    }

    /// 8 小时窗口
    fn eight_hour_window() -> LossWaterfall {
        let mut waterfall = empty();
        waterfall.set_start_time(ts("2026-03-02T08:00:00+08:00"));
        waterfall.set_end_time(ts("2026-03-02T16:00:00+08:00"));
        waterfall
    }

    #[test]
    fn test_new_waterfall_has_all_ten_zero_buckets() {
        let waterfall = empty();
        assert_eq!(waterfall.buckets().len(), 10);
        assert!(waterfall.buckets().values().all(|d| d.is_zero()));
        assert!(waterfall.good_quantity().is_none());
        assert!(waterfall.start_time().is_none());
    }

    #[test]
    fn test_zero_window_returns_zero_everywhere() {
        let waterfall = empty();
        assert!(waterfall.total_duration().is_zero());
        assert!(waterfall.value_adding_time().is_zero());
        assert_eq!(waterfall.oee_percentage(), 0.0);
        assert_eq!(waterfall.availability_percentage(), 0.0);
        assert_eq!(waterfall.performance_percentage(), 0.0);
        assert_eq!(waterfall.quality_percentage(), 0.0);
        assert_eq!(waterfall.high_level_oee_percentage(), Ok(0.0));
    }

    #[test]
    fn test_half_set_window_counts_as_zero() {
        let mut waterfall = empty();
        waterfall.set_start_time(ts("2026-03-02T08:00:00+08:00"));
        assert!(waterfall.total_duration().is_zero());
    }

    #[test]
    fn test_residual_reduced_speed() {
        let mut waterfall = empty();
        waterfall.set_start_time(ts("2026-03-02T08:00:00Z"));
        waterfall.set_end_time(ts("2026-03-02T08:16:40Z")); // 1000 秒
        waterfall.set_loss(TimeLoss::RejectRework, Duration::seconds(50));
        waterfall.set_loss(TimeLoss::StartupYield, Duration::seconds(30));
        waterfall.set_loss(TimeLoss::NoLoss, Duration::seconds(800));
        assert_eq!(waterfall.net_production_time(), Duration::seconds(1000));

        let residual = waterfall.finalize_reduced_speed_loss();
        assert_eq!(residual, Duration::seconds(120));
        assert_eq!(waterfall.loss(TimeLoss::ReducedSpeed), Duration::seconds(120));
        assert_eq!(waterfall.value_adding_time(), Duration::seconds(800));
    }

    #[test]
    fn test_residual_may_go_negative() {
        let mut waterfall = eight_hour_window();
        waterfall.set_loss(TimeLoss::NoLoss, Duration::hours(9));
        let residual = waterfall.finalize_reduced_speed_loss();
        assert_eq!(residual, Duration::hours(-1));
        // 不夹紧: 高效净生产时间大于净生产时间
        assert!(waterfall.efficient_net_production_time() > waterfall.net_production_time());
    }

    #[test]
    fn test_quantity_setter_requires_design_speed() {
        let mut waterfall = eight_hour_window();
        assert_eq!(
            waterfall.set_good_quantity(units(10.0)),
            Err(LossError::UnsetReferenceRate)
        );
        // 失败时不修改状态
        assert!(waterfall.good_quantity().is_none());
        assert!(waterfall.loss(TimeLoss::NoLoss).is_zero());
    }

    #[test]
    fn test_quantity_setters_update_their_buckets() {
        let mut waterfall = eight_hour_window();
        waterfall.set_design_speed(per_minute(2.0));
        waterfall.set_good_quantity(units(100.0)).unwrap();
        waterfall.set_reject_quantity(units(10.0)).unwrap();
        waterfall.set_startup_quantity(units(4.0)).unwrap();

        assert_eq!(waterfall.loss(TimeLoss::NoLoss), Duration::minutes(50));
        assert_eq!(waterfall.loss(TimeLoss::RejectRework), Duration::minutes(5));
        assert_eq!(waterfall.loss(TimeLoss::StartupYield), Duration::minutes(2));

        // 覆盖设置
        waterfall.set_good_quantity(units(20.0)).unwrap();
        assert_eq!(waterfall.loss(TimeLoss::NoLoss), Duration::minutes(10));
    }

    #[test]
    fn test_oversized_quantity_is_rejected_without_mutation() {
        let mut waterfall = eight_hour_window();
        waterfall.set_design_speed(Quantity::new(
            1.0,
            Unit::Rate(MaterialUnit::Unit, TimeUnit::Second),
        ));
        waterfall.set_good_quantity(units(100.0)).unwrap();

        let result = waterfall.set_good_quantity(units(1e17));
        assert!(matches!(result, Err(LossError::InvalidConversion { .. })));
        assert_eq!(waterfall.good_quantity(), Some(units(100.0)));
        assert_eq!(waterfall.loss(TimeLoss::NoLoss), Duration::seconds(100));

        let result = waterfall.increment_reject_quantity(units(1e17));
        assert!(matches!(result, Err(LossError::InvalidConversion { .. })));
        assert!(waterfall.reject_quantity().is_none());
        assert!(waterfall.loss(TimeLoss::RejectRework).is_zero());
    }

    #[test]
    fn test_increments_are_cumulative() {
        let mut stepwise = eight_hour_window();
        stepwise.set_design_speed(per_minute(2.0));
        stepwise.increment_good_quantity(units(10.0)).unwrap();
        stepwise.increment_good_quantity(units(5.0)).unwrap();

        let mut single = eight_hour_window();
        single.set_design_speed(per_minute(2.0));
        single.increment_good_quantity(units(15.0)).unwrap();

        assert_eq!(stepwise.good_quantity(), Some(units(15.0)));
        assert_eq!(stepwise.loss(TimeLoss::NoLoss), single.loss(TimeLoss::NoLoss));
        assert_eq!(single.loss(TimeLoss::NoLoss), Duration::seconds(450));
    }

    #[test]
    fn test_percentages() {
        let mut waterfall = eight_hour_window();
        waterfall.set_loss(TimeLoss::PlannedDowntime, Duration::hours(1));
        waterfall.set_loss(TimeLoss::UnplannedDowntime, Duration::hours(1));
        waterfall.set_loss(TimeLoss::ReducedSpeed, Duration::hours(3));
        waterfall.set_loss(TimeLoss::RejectRework, Duration::hours(1));

        // available 8h, reported 6h, efficient 3h, value adding 2h
        assert_eq!(waterfall.availability_percentage(), 75.0);
        assert_eq!(waterfall.performance_percentage(), 50.0);
        assert_eq!(waterfall.oee_percentage(), 25.0);
        assert!((waterfall.quality_percentage() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_available_time_guard() {
        let mut waterfall = eight_hour_window();
        waterfall.set_loss(TimeLoss::NotScheduled, Duration::hours(8));
        assert!(waterfall.available_time().is_zero());
        assert_eq!(waterfall.oee_percentage(), 0.0);
        assert_eq!(waterfall.availability_percentage(), 0.0);
        assert_eq!(waterfall.high_level_oee_percentage(), Ok(0.0));
    }

    #[test]
    fn test_high_level_oee() {
        let mut waterfall = eight_hour_window();
        waterfall.set_design_speed(per_minute(2.0));
        // 理想产量 = 480 min × 2 = 960
        waterfall.set_good_quantity(units(480.0)).unwrap();
        assert_eq!(waterfall.ideal_quantity().unwrap(), units(960.0));
        assert_eq!(waterfall.high_level_oee_percentage(), Ok(50.0));
    }

    #[test]
    fn test_high_level_oee_without_design_speed() {
        let mut waterfall = eight_hour_window();
        // 绕过数量设置器直接写入良品
        waterfall.good_quantity = Some(units(10.0));
        assert_eq!(
            waterfall.high_level_oee_percentage(),
            Err(LossError::UnsetReferenceRate)
        );
    }

    #[test]
    fn test_extend_time_extent_takes_min_and_max() {
        let mut waterfall = empty();
        waterfall.extend_time_extent(ts("2026-03-02T09:00:00+08:00"), ts("2026-03-02T10:00:00+08:00"));
        waterfall.extend_time_extent(ts("2026-03-02T08:45:00+08:00"), ts("2026-03-02T09:15:00+08:00"));
        waterfall.extend_time_extent(ts("2026-03-02T11:00:00+08:00"), ts("2026-03-02T11:30:00+08:00"));
        assert_eq!(waterfall.start_time(), Some(ts("2026-03-02T08:45:00+08:00")));
        assert_eq!(waterfall.end_time(), Some(ts("2026-03-02T11:30:00+08:00")));
    }

    #[test]
    fn test_loss_pareto_orders_descending_and_skips_no_loss() {
        let mut waterfall = eight_hour_window();
        waterfall.set_loss(TimeLoss::Setup, Duration::minutes(20));
        waterfall.set_loss(TimeLoss::MinorStoppages, Duration::minutes(45));
        waterfall.set_loss(TimeLoss::NoLoss, Duration::hours(5));
        waterfall.add_loss(TimeLoss::Setup, Duration::minutes(5));

        assert_eq!(
            waterfall.loss_pareto(),
            vec![
                (TimeLoss::MinorStoppages, Duration::minutes(45)),
                (TimeLoss::Setup, Duration::minutes(25)),
            ]
        );
    }

    #[test]
    fn test_loss_pareto_skips_negative_residual() {
        let mut waterfall = eight_hour_window();
        waterfall.set_loss(TimeLoss::Setup, Duration::minutes(30));
        waterfall.set_loss(TimeLoss::NoLoss, Duration::hours(9));
        let residual = waterfall.finalize_reduced_speed_loss();
        assert!(residual < Duration::zero());

        assert_eq!(
            waterfall.loss_pareto(),
            vec![(TimeLoss::Setup, Duration::minutes(30))]
        );
    }

    #[test]
    fn test_total_quantity() {
        let mut waterfall = eight_hour_window();
        assert_eq!(waterfall.total_quantity(), Ok(None));
        waterfall.set_design_speed(per_minute(1.0));
        waterfall.set_good_quantity(units(90.0)).unwrap();
        waterfall.set_reject_quantity(Quantity::new(1.0, Unit::Material(MaterialUnit::Dozen))).unwrap();
        assert_eq!(waterfall.total_quantity(), Ok(Some(units(102.0))));
    }
}
