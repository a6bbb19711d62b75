// ==========================================
// 设备时间损失 - 损失计算 API
// ==========================================
// 职责: 配置 + 汇总存储 + 聚合器的组装入口
// 流程: 导入汇总文件 -> 写入内存仓储 -> 计算损失瀑布 -> 生成报告
// ==========================================

use crate::api::dto::LossReport;
use crate::api::error::{ApiError, ApiResult};
use crate::config::ConfigManager;
use crate::domain::waterfall::LossWaterfall;
use crate::engine::{LossAggregator, LossRepositories};
use crate::importer::SummaryImporter;
use crate::repository::InMemorySummaryStore;
use chrono::{DateTime, FixedOffset};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

pub struct LossApi {
    config: Arc<ConfigManager>,
    store: Arc<InMemorySummaryStore>,
    aggregator: LossAggregator,
}

impl LossApi {
    pub fn new(config: Arc<ConfigManager>, store: Arc<InMemorySummaryStore>) -> Self {
        let repos = LossRepositories::new(store.clone(), config.clone(), config.clone());
        Self {
            config,
            store,
            aggregator: LossAggregator::new(repos),
        }
    }

    pub fn store(&self) -> &InMemorySummaryStore {
        &self.store
    }

    /// 导入设备的可用性与产量汇总文件
    ///
    /// # 返回
    /// (可用性记录数, 产量记录数)
    pub fn import_summaries(
        &self,
        equipment: &str,
        availability_path: &Path,
        production_path: &Path,
    ) -> ApiResult<(usize, usize)> {
        let importer = SummaryImporter::new(&self.config);
        let availability = importer.import_availability(availability_path)?;
        let production = importer.import_production(production_path)?;
        let counts = (availability.len(), production.len());

        self.store.insert_availability(equipment, availability)?;
        self.store.insert_production(equipment, production)?;

        info!(
            equipment = %equipment,
            availability_count = counts.0,
            production_count = counts.1,
            "汇总文件已写入仓储"
        );
        Ok(counts)
    }

    /// 计算损失瀑布
    pub fn compute_loss(
        &self,
        equipment: &str,
        material: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> ApiResult<LossWaterfall> {
        if equipment.trim().is_empty() {
            return Err(ApiError::InvalidInput("设备标识不能为空".to_string()));
        }
        if to < from {
            return Err(ApiError::InvalidInput(format!(
                "时间窗口无效: from={} 晚于 to={}",
                from, to
            )));
        }

        Ok(self.aggregator.compute_loss(equipment, material, from, to)?)
    }

    /// 计算损失瀑布并生成报告
    pub fn loss_report(
        &self,
        equipment: &str,
        material: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> ApiResult<LossReport> {
        let waterfall = self.compute_loss(equipment, material, from, to)?;
        Ok(LossReport::from_waterfall(&waterfall)?)
    }
}
