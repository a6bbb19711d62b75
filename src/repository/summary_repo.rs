// ==========================================
// 设备时间损失 - 汇总记录内存仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 查询口径: 与 [from, to] 有交集的记录整条返回 (不裁剪)
// ==========================================

use crate::domain::error::{LossError, LossResult};
use crate::domain::summary::{AvailabilitySummary, ProductionSummary, TimeSpan};
use crate::engine::repositories::SummaryStore;
use chrono::{DateTime, FixedOffset};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct SummaryTables {
    availability: HashMap<String, Vec<AvailabilitySummary>>,
    production: HashMap<String, Vec<ProductionSummary>>,
}

// ==========================================
// InMemorySummaryStore - 内存汇总仓储
// ==========================================
/// 内存汇总仓储
/// 职责: 按设备保存可用性/产量汇总, 供聚合器按窗口读取
#[derive(Debug, Clone, Default)]
pub struct InMemorySummaryStore {
    tables: Arc<RwLock<SummaryTables>>,
}

impl InMemorySummaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> LossResult<RwLockReadGuard<'_, SummaryTables>> {
        self.tables
            .read()
            .map_err(|e| LossError::SummaryStore(format!("读锁获取失败: {}", e)))
    }

    fn write(&self) -> LossResult<RwLockWriteGuard<'_, SummaryTables>> {
        self.tables
            .write()
            .map_err(|e| LossError::SummaryStore(format!("写锁获取失败: {}", e)))
    }

    /// 追加可用性汇总
    pub fn insert_availability(
        &self,
        equipment: &str,
        summaries: impl IntoIterator<Item = AvailabilitySummary>,
    ) -> LossResult<()> {
        let mut tables = self.write()?;
        tables
            .availability
            .entry(equipment.to_string())
            .or_default()
            .extend(summaries);
        Ok(())
    }

    /// 追加产量汇总
    pub fn insert_production(
        &self,
        equipment: &str,
        summaries: impl IntoIterator<Item = ProductionSummary>,
    ) -> LossResult<()> {
        let mut tables = self.write()?;
        tables
            .production
            .entry(equipment.to_string())
            .or_default()
            .extend(summaries);
        Ok(())
    }

    /// 设备的记录条数 (可用性, 产量)
    pub fn count(&self, equipment: &str) -> LossResult<(usize, usize)> {
        let tables = self.read()?;
        Ok((
            tables.availability.get(equipment).map_or(0, Vec::len),
            tables.production.get(equipment).map_or(0, Vec::len),
        ))
    }
}

fn select<T: TimeSpan + Clone>(
    rows: Option<&Vec<T>>,
    from: DateTime<FixedOffset>,
    to: DateTime<FixedOffset>,
) -> Vec<T> {
    rows.map(|rows| {
        rows.iter()
            .filter(|row| row.overlaps(from, to))
            .cloned()
            .collect()
    })
    .unwrap_or_default()
}

impl SummaryStore for InMemorySummaryStore {
    fn fetch_availability_summaries(
        &self,
        equipment: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> LossResult<Vec<AvailabilitySummary>> {
        let tables = self.read()?;
        Ok(select(tables.availability.get(equipment), from, to))
    }

    fn fetch_production_summaries(
        &self,
        equipment: &str,
        from: DateTime<FixedOffset>,
        to: DateTime<FixedOffset>,
    ) -> LossResult<Vec<ProductionSummary>> {
        let tables = self.read()?;
        Ok(select(tables.production.get(equipment), from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::quantity::{MaterialUnit, Quantity, Unit};
    use crate::domain::summary::Reason;
    use crate::domain::types::{ProductionKind, TimeLoss};

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn store() -> InMemorySummaryStore {
        let store = InMemorySummaryStore::new();
        store
            .insert_availability(
                "PKG-01",
                vec![
                    AvailabilitySummary::new(
                        ts("2026-03-02T07:30:00+08:00"),
                        ts("2026-03-02T08:30:00+08:00"),
                        Reason::new("PM", TimeLoss::PlannedDowntime),
                    ),
                    AvailabilitySummary::new(
                        ts("2026-03-02T17:00:00+08:00"),
                        ts("2026-03-02T18:00:00+08:00"),
                        Reason::new("JAM", TimeLoss::MinorStoppages),
                    ),
                ],
            )
            .unwrap();
        store
            .insert_production(
                "PKG-01",
                vec![ProductionSummary::new(
                    ts("2026-03-02T09:00:00+08:00"),
                    ts("2026-03-02T10:00:00+08:00"),
                    ProductionKind::Good,
                    Quantity::new(100.0, Unit::Material(MaterialUnit::Unit)),
                )],
            )
            .unwrap();
        store
    }

    #[test]
    fn test_fetch_returns_overlapping_records_unclipped() {
        let store = store();
        let rows = store
            .fetch_availability_summaries(
                "PKG-01",
                ts("2026-03-02T08:00:00+08:00"),
                ts("2026-03-02T16:00:00+08:00"),
            )
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].start_time, ts("2026-03-02T07:30:00+08:00"));
    }

    #[test]
    fn test_unknown_equipment_yields_empty() {
        let store = store();
        let rows = store
            .fetch_production_summaries(
                "PKG-99",
                ts("2026-03-02T00:00:00+08:00"),
                ts("2026-03-03T00:00:00+08:00"),
            )
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(store.count("PKG-01").unwrap(), (2, 1));
    }
}
