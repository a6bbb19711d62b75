// ==========================================
// 设备时间损失 - 命令行入口
// ==========================================
// 用法:
//   oee-loss <availability.csv|xlsx> <production.csv|xlsx> <equipment> <material> <from> <to> [config.json]
//
// from/to 为 RFC 3339 时间; 未指定配置文件时使用默认路径
// (OEE_LOSS_CONFIG 环境变量 > 用户配置目录/oee-loss/plant.json)
// 报告以 JSON 输出到 stdout
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::DateTime;
use oee_loss::config::ConfigManager;
use oee_loss::repository::InMemorySummaryStore;
use oee_loss::{logging, LossApi};
use std::path::PathBuf;
use std::sync::Arc;

const USAGE: &str = "用法: oee-loss <availability> <production> <equipment> <material> <from> <to> [config.json]";

fn main() -> Result<()> {
    logging::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 6 {
        bail!("参数不足\n{}", USAGE);
    }

    let availability_path = PathBuf::from(&args[0]);
    let production_path = PathBuf::from(&args[1]);
    let equipment = args[2].trim();
    let material = args[3].trim();
    let from = DateTime::parse_from_rfc3339(args[4].trim())
        .with_context(|| format!("起始时间格式错误: {}", args[4]))?;
    let to = DateTime::parse_from_rfc3339(args[5].trim())
        .with_context(|| format!("结束时间格式错误: {}", args[5]))?;
    let config_path = args
        .get(6)
        .map(PathBuf::from)
        .unwrap_or_else(ConfigManager::default_config_path);

    tracing::info!("设备时间损失分析 v{}", oee_loss::VERSION);

    let config = ConfigManager::load(&config_path)
        .with_context(|| format!("无法加载配置: {}", config_path.display()))?;

    let api = LossApi::new(Arc::new(config), Arc::new(InMemorySummaryStore::new()));
    api.import_summaries(equipment, &availability_path, &production_path)
        .context("汇总文件导入失败")?;

    let report = api
        .loss_report(equipment, material, from, to)
        .context("损失计算失败")?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
