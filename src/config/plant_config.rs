use crate::domain::quantity::Quantity;
use crate::domain::summary::Reason;
use crate::domain::work_schedule::WorkSchedule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// 工厂配置（持久化对象）
///
/// 存储位置：JSON 文件（见 ConfigManager::default_config_path）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlantConfig {
    /// 工厂/车间名称
    #[serde(default)]
    pub name: String,

    /// 设备列表
    #[serde(default)]
    pub equipment: Vec<EquipmentProfile>,

    /// 原因代码目录（原因 -> 损失类别）
    #[serde(default)]
    pub reasons: Vec<Reason>,
}

/// 设备配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentProfile {
    /// 设备标识
    pub id: String,

    /// 说明（可选）
    #[serde(default)]
    pub description: Option<String>,

    /// 工作日历（未配置时无法计算非计划时间）
    #[serde(default)]
    pub schedule: Option<WorkSchedule>,

    /// 物料 -> 设计速度（如 {"amount": 2.0, "unit": "unit/min"}）
    #[serde(default)]
    pub design_speeds: BTreeMap<String, Quantity>,
}

impl EquipmentProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: None,
            schedule: None,
            design_speeds: BTreeMap::new(),
        }
    }

    pub fn with_schedule(mut self, schedule: WorkSchedule) -> Self {
        self.schedule = Some(schedule);
        self
    }

    pub fn with_design_speed(mut self, material: impl Into<String>, speed: Quantity) -> Self {
        self.design_speeds.insert(material.into(), speed);
        self
    }
}
