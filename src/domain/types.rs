// ==========================================
// 设备时间损失 - 领域类型定义
// ==========================================
// 损失类别: 十个互斥桶, 顺序即瀑布扣减顺序
// 产量类型: 良品 / 废品返工 / 启动损耗
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ==========================================
// 时间损失类别 (Time Loss)
// ==========================================
// 红线: 封闭集合, 顺序是结构性的, 不可配置
// 序列化格式: SCREAMING_SNAKE_CASE (与原始数据一致)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeLoss {
    NotScheduled,      // 非计划时间
    Unscheduled,       // 未排产
    PlannedDowntime,   // 计划停机
    Setup,             // 换型调整
    UnplannedDowntime, // 非计划停机
    MinorStoppages,    // 小停机
    ReducedSpeed,      // 降速 (残差桶)
    RejectRework,      // 废品返工
    StartupYield,      // 启动损耗
    NoLoss,            // 无损失 (价值时间基线)
}

impl TimeLoss {
    /// 全部类别, 按瀑布顺序
    pub const ALL: [TimeLoss; 10] = [
        TimeLoss::NotScheduled,
        TimeLoss::Unscheduled,
        TimeLoss::PlannedDowntime,
        TimeLoss::Setup,
        TimeLoss::UnplannedDowntime,
        TimeLoss::MinorStoppages,
        TimeLoss::ReducedSpeed,
        TimeLoss::RejectRework,
        TimeLoss::StartupYield,
        TimeLoss::NoLoss,
    ];

    /// 是否属于损失 (NO_LOSS 为唯一非损失类别)
    pub fn is_loss(&self) -> bool {
        !matches!(self, TimeLoss::NoLoss)
    }

    /// 序列化使用的代码
    pub fn code(&self) -> &'static str {
        match self {
            TimeLoss::NotScheduled => "NOT_SCHEDULED",
            TimeLoss::Unscheduled => "UNSCHEDULED",
            TimeLoss::PlannedDowntime => "PLANNED_DOWNTIME",
            TimeLoss::Setup => "SETUP",
            TimeLoss::UnplannedDowntime => "UNPLANNED_DOWNTIME",
            TimeLoss::MinorStoppages => "MINOR_STOPPAGES",
            TimeLoss::ReducedSpeed => "REDUCED_SPEED",
            TimeLoss::RejectRework => "REJECT_REWORK",
            TimeLoss::StartupYield => "STARTUP_YIELD",
            TimeLoss::NoLoss => "NO_LOSS",
        }
    }
}

impl fmt::Display for TimeLoss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for TimeLoss {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();
        TimeLoss::ALL
            .iter()
            .copied()
            .find(|loss| loss.code() == normalized)
            .ok_or_else(|| format!("未知的损失类别: {}", s))
    }
}

// ==========================================
// 产量类型 (Production Kind)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProductionKind {
    Good,    // 良品
    Reject,  // 废品/返工
    Startup, // 启动损耗
}

impl fmt::Display for ProductionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductionKind::Good => write!(f, "GOOD"),
            ProductionKind::Reject => write!(f, "REJECT"),
            ProductionKind::Startup => write!(f, "STARTUP"),
        }
    }
}

impl FromStr for ProductionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "GOOD" => Ok(ProductionKind::Good),
            "REJECT" => Ok(ProductionKind::Reject),
            "STARTUP" => Ok(ProductionKind::Startup),
            _ => Err(format!("未知的产量类型: {}", s)),
        }
    }
}
