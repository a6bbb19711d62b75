// ==========================================
// 设备时间损失 - 汇总记录领域模型
// ==========================================
// 来源: 汇总存储 (SummaryStore) 按设备与时间窗口返回
// 红线: 记录按整条返回, 不做时间窗口裁剪
// ==========================================

use crate::domain::quantity::Quantity;
use crate::domain::types::{ProductionKind, TimeLoss};
use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

// ==========================================
// Reason - 停机/状态原因
// ==========================================
// 用途: 原因代码 -> 损失类别映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub name: String,                // 原因代码
    #[serde(default)]
    pub description: Option<String>, // 描述
    pub loss: TimeLoss,              // 归属损失类别
}

impl Reason {
    pub fn new(name: impl Into<String>, loss: TimeLoss) -> Self {
        Self {
            name: name.into(),
            description: None,
            loss,
        }
    }
}

// ==========================================
// AvailabilitySummary - 可用性汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AvailabilitySummary {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub reason: Reason,
}

impl AvailabilitySummary {
    pub fn new(
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
        reason: Reason,
    ) -> Self {
        Self {
            start_time,
            end_time,
            reason,
        }
    }

    /// 记录时长
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// 记录归属的损失类别
    pub fn loss(&self) -> TimeLoss {
        self.reason.loss
    }
}

// ==========================================
// ProductionSummary - 产量汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionSummary {
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub kind: ProductionKind,
    pub quantity: Quantity,
}

impl ProductionSummary {
    pub fn new(
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
        kind: ProductionKind,
        quantity: Quantity,
    ) -> Self {
        Self {
            start_time,
            end_time,
            kind,
            quantity,
        }
    }
}

// ==========================================
// Trait: TimeSpan
// ==========================================
// 用途: 观测时间范围统计, 两类汇总统一处理
pub trait TimeSpan {
    fn span_start(&self) -> DateTime<FixedOffset>;
    fn span_end(&self) -> DateTime<FixedOffset>;

    /// 是否与 [from, to] 有交集
    fn overlaps(&self, from: DateTime<FixedOffset>, to: DateTime<FixedOffset>) -> bool {
        self.span_start() <= to && self.span_end() >= from
    }
}

impl TimeSpan for AvailabilitySummary {
    fn span_start(&self) -> DateTime<FixedOffset> {
        self.start_time
    }

    fn span_end(&self) -> DateTime<FixedOffset> {
        self.end_time
    }
}

impl TimeSpan for ProductionSummary {
    fn span_start(&self) -> DateTime<FixedOffset> {
        self.start_time
    }

    fn span_end(&self) -> DateTime<FixedOffset> {
        self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    #[test]
    fn test_availability_duration_and_loss() {
        let summary = AvailabilitySummary::new(
            ts("2026-03-02T09:00:00+08:00"),
            ts("2026-03-02T10:30:00+08:00"),
            Reason::new("PM", TimeLoss::PlannedDowntime),
        );
        assert_eq!(summary.duration(), Duration::minutes(90));
        assert_eq!(summary.loss(), TimeLoss::PlannedDowntime);
    }

    #[test]
    fn test_overlap_is_inclusive_and_offset_aware() {
        let summary = AvailabilitySummary::new(
            ts("2026-03-02T09:00:00+08:00"),
            ts("2026-03-02T10:00:00+08:00"),
            Reason::new("RUN", TimeLoss::NoLoss),
        );
        // 同一时刻的 UTC 表示
        assert!(summary.overlaps(ts("2026-03-02T02:00:00Z"), ts("2026-03-02T03:00:00Z")));
        assert!(summary.overlaps(ts("2026-03-02T10:00:00+08:00"), ts("2026-03-02T11:00:00+08:00")));
        assert!(!summary.overlaps(ts("2026-03-02T10:00:01+08:00"), ts("2026-03-02T11:00:00+08:00")));
    }
}
