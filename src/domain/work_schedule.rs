// ==========================================
// 设备时间损失 - 工作日历
// ==========================================
// 用途: 计算时间范围内的非工作时间 (NOT_SCHEDULED)
// 口径: 本地时间 (去除时区偏移)
// ==========================================

use chrono::{Duration, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

// ==========================================
// Trait: NonWorkingTime
// ==========================================
// 用途: 聚合器查询非工作时长
// 实现者: WorkSchedule
pub trait NonWorkingTime: Send + Sync {
    /// 计算 [from, to) 内的非工作时长
    fn non_working_duration(&self, from: NaiveDateTime, to: NaiveDateTime) -> Duration;
}

// ==========================================
// Shift - 班次 (每日重复)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    pub name: String,          // 班次名称
    pub start: NaiveTime,      // 开始时刻
    pub duration_minutes: i64, // 时长 (分钟), 可跨零点
}

impl Shift {
    pub fn new(name: impl Into<String>, start: NaiveTime, duration: Duration) -> Self {
        Self {
            name: name.into(),
            start,
            duration_minutes: duration.num_minutes(),
        }
    }

    /// 单个班次最长 7 天
    pub const MAX_DURATION_MINUTES: i64 = 7 * 24 * 60;

    /// 班次时长, 超出 [0, MAX_DURATION_MINUTES] 的配置值按边界计
    pub fn duration(&self) -> Duration {
        Duration::minutes(self.duration_minutes.clamp(0, Self::MAX_DURATION_MINUTES))
    }
}

// ==========================================
// NonWorkingPeriod - 非工作时段 (节假日/停产检修)
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NonWorkingPeriod {
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

// ==========================================
// WorkSchedule - 工作日历
// ==========================================
// 规则:
// - 工作时间 = 班次覆盖时间 - 非工作时段
// - 未配置班次视为连续生产 (全天工作)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkSchedule {
    pub name: String,
    #[serde(default)]
    pub shifts: Vec<Shift>,
    #[serde(default)]
    pub non_working_periods: Vec<NonWorkingPeriod>,
}

type Interval = (NaiveDateTime, NaiveDateTime);

impl WorkSchedule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_shift(mut self, shift: Shift) -> Self {
        self.shifts.push(shift);
        self
    }

    pub fn with_non_working_period(
        mut self,
        name: impl Into<String>,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Self {
        self.non_working_periods.push(NonWorkingPeriod {
            name: name.into(),
            start,
            end,
        });
        self
    }

    /// 计算 [from, to) 内的工作时长
    pub fn working_duration(&self, from: NaiveDateTime, to: NaiveDateTime) -> Duration {
        if to <= from {
            return Duration::zero();
        }

        let shift_time = if self.shifts.is_empty() {
            vec![(from, to)]
        } else {
            merge(self.shift_instances(from, to))
        };

        let breaks = merge(
            self.non_working_periods
                .iter()
                .filter_map(|p| clip((p.start, p.end), from, to))
                .collect(),
        );

        shift_time
            .iter()
            .map(|interval| length(*interval) - overlap_total(*interval, &breaks))
            .fold(Duration::zero(), |acc, d| acc + d)
    }

    /// 与 [from, to) 相交的所有班次实例 (已裁剪)
    fn shift_instances(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<Interval> {
        let longest_days = self
            .shifts
            .iter()
            .map(|s| s.duration().num_days())
            .max()
            .unwrap_or(0);

        let mut instances = Vec::new();
        let mut day = from.date() - Duration::days(longest_days + 1);
        let last_day = to.date();

        while day <= last_day {
            for shift in &self.shifts {
                let start = day.and_time(shift.start);
                let end = start + shift.duration();
                if let Some(clipped) = clip((start, end), from, to) {
                    instances.push(clipped);
                }
            }
            day = day + Duration::days(1);
        }

        instances
    }
}

impl NonWorkingTime for WorkSchedule {
    fn non_working_duration(&self, from: NaiveDateTime, to: NaiveDateTime) -> Duration {
        if to <= from {
            return Duration::zero();
        }
        (to - from) - self.working_duration(from, to)
    }
}

fn length(interval: Interval) -> Duration {
    interval.1 - interval.0
}

fn clip(interval: Interval, from: NaiveDateTime, to: NaiveDateTime) -> Option<Interval> {
    let start = interval.0.max(from);
    let end = interval.1.min(to);
    (start < end).then_some((start, end))
}

/// 合并重叠区间
fn merge(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort();
    let mut merged: Vec<Interval> = Vec::with_capacity(intervals.len());
    for (start, end) in intervals {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

fn overlap_total(interval: Interval, others: &[Interval]) -> Duration {
    others
        .iter()
        .filter_map(|other| clip(*other, interval.0, interval.1))
        .map(length)
        .fold(Duration::zero(), |acc, d| acc + d)
}
