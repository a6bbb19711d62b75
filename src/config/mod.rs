// ==========================================
// 设备时间损失 - 配置层
// ==========================================
// 职责: 工厂配置加载, 工作日历/设计速度/原因代码查询
// 存储: JSON 文件
// ==========================================

pub mod config_manager;
pub mod plant_config;

// 重导出核心配置管理器
pub use config_manager::{ConfigError, ConfigManager, ConfigResult};
pub use plant_config::{EquipmentProfile, PlantConfig};
