// ==========================================
// 设备时间损失 - 配置管理器
// ==========================================
// 职责: 加载工厂配置, 提供工作日历/设计速度/原因代码查询
// 存储: JSON 文件
// ==========================================

use crate::config::plant_config::PlantConfig;
use crate::domain::quantity::{Dimension, Quantity};
use crate::domain::summary::Reason;
use crate::domain::work_schedule::{NonWorkingTime, Shift, WorkSchedule};
use crate::engine::repositories::{DesignSpeedResolver, ScheduleResolver};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// 配置层错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    FileReadError { path: String, message: String },

    #[error("配置解析失败: {0}")]
    ParseError(String),

    #[error("设备重复定义: {0}")]
    DuplicateEquipment(String),

    #[error("工作日历无效 (equipment={equipment}): {message}")]
    InvalidSchedule { equipment: String, message: String },

    #[error("设计速度单位不是速率 (equipment={equipment}, material={material}): {unit}")]
    InvalidDesignSpeed {
        equipment: String,
        material: String,
        unit: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    config: PlantConfig,
    schedules: HashMap<String, Arc<WorkSchedule>>,
    design_speeds: HashMap<(String, String), Quantity>,
    reasons: HashMap<String, Reason>,
}

impl ConfigManager {
    /// 从配置对象创建, 同时校验设备唯一性、工作日历与设计速度单位
    pub fn from_config(config: PlantConfig) -> ConfigResult<Self> {
        let mut schedules = HashMap::new();
        let mut design_speeds = HashMap::new();
        let mut seen = HashSet::new();

        for profile in &config.equipment {
            if !seen.insert(profile.id.clone()) {
                return Err(ConfigError::DuplicateEquipment(profile.id.clone()));
            }

            if let Some(schedule) = &profile.schedule {
                validate_schedule(&profile.id, schedule)?;
                schedules.insert(profile.id.clone(), Arc::new(schedule.clone()));
            }

            for (material, speed) in &profile.design_speeds {
                if !matches!(speed.unit.dimension(), Dimension::Rate(_)) {
                    return Err(ConfigError::InvalidDesignSpeed {
                        equipment: profile.id.clone(),
                        material: material.clone(),
                        unit: speed.unit.symbol(),
                    });
                }
                design_speeds.insert((profile.id.clone(), material.clone()), *speed);
            }
        }

        let reasons = config
            .reasons
            .iter()
            .map(|r| (r.name.trim().to_uppercase(), r.clone()))
            .collect();

        debug!(
            equipment_count = config.equipment.len(),
            reason_count = config.reasons.len(),
            "工厂配置已加载"
        );

        Ok(Self {
            config,
            schedules,
            design_speeds,
            reasons,
        })
    }

    /// 从 JSON 字符串创建
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: PlantConfig = serde_json::from_str(json)?;
        Self::from_config(config)
    }

    /// 从 JSON 文件加载
    pub fn load<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        info!(path = %path.display(), "加载工厂配置");
        Self::from_json(&raw)
    }

    /// 默认配置文件路径
    ///
    /// 优先级: 环境变量 OEE_LOSS_CONFIG > 用户配置目录 > ./plant.json
    pub fn default_config_path() -> PathBuf {
        if let Ok(path) = std::env::var("OEE_LOSS_CONFIG") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return PathBuf::from(trimmed);
            }
        }

        match dirs::config_dir() {
            Some(dir) => dir.join("oee-loss").join("plant.json"),
            None => PathBuf::from("./plant.json"),
        }
    }

    pub fn config(&self) -> &PlantConfig {
        &self.config
    }

    /// 按原因代码查询 (忽略大小写与首尾空白)
    pub fn reason(&self, name: &str) -> Option<&Reason> {
        self.reasons.get(&name.trim().to_uppercase())
    }

    /// 已配置的设备标识
    pub fn equipment_ids(&self) -> Vec<&str> {
        self.config.equipment.iter().map(|e| e.id.as_str()).collect()
    }
}

/// 班次时长须在 (0, Shift::MAX_DURATION_MINUTES] 内, 非工作时段不得倒置
fn validate_schedule(equipment: &str, schedule: &WorkSchedule) -> ConfigResult<()> {
    let invalid = |message: String| ConfigError::InvalidSchedule {
        equipment: equipment.to_string(),
        message,
    };

    for shift in &schedule.shifts {
        if shift.duration_minutes <= 0 || shift.duration_minutes > Shift::MAX_DURATION_MINUTES {
            return Err(invalid(format!(
                "班次 {} 时长 {} 分钟超出范围 (1..={})",
                shift.name,
                shift.duration_minutes,
                Shift::MAX_DURATION_MINUTES
            )));
        }
    }

    for period in &schedule.non_working_periods {
        if period.end < period.start {
            return Err(invalid(format!(
                "非工作时段 {} 结束时间 {} 早于开始时间 {}",
                period.name, period.end, period.start
            )));
        }
    }

    Ok(())
}

impl ScheduleResolver for ConfigManager {
    fn resolve_schedule(&self, equipment: &str) -> Option<Arc<dyn NonWorkingTime>> {
        self.schedules
            .get(equipment)
            .map(|s| s.clone() as Arc<dyn NonWorkingTime>)
    }
}

impl DesignSpeedResolver for ConfigManager {
    fn resolve_design_speed(&self, equipment: &str, material: &str) -> Option<Quantity> {
        self.design_speeds
            .get(&(equipment.to_string(), material.to_string()))
            .copied()
    }
}
