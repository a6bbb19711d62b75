// ==========================================
// 设备时间损失 - 汇总记录导入器
// ==========================================
// 职责: 原始行记录 -> 可用性/产量汇总 (字段映射 + 类型转换 + 原因代码解析)
// ==========================================
//
// 可用性文件列: start_time, end_time, reason [, loss]
// 产量文件列:   start_time, end_time, kind, amount, unit
// 时间格式:     RFC 3339 (带时区偏移)

use crate::config::ConfigManager;
use crate::domain::quantity::{Quantity, Unit};
use crate::domain::summary::{AvailabilitySummary, ProductionSummary, Reason};
use crate::domain::types::{ProductionKind, TimeLoss};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{RawRow, UniversalFileParser};
use chrono::{DateTime, FixedOffset};
use std::path::Path;
use tracing::info;

pub struct SummaryImporter<'a> {
    config: &'a ConfigManager,
}

impl<'a> SummaryImporter<'a> {
    pub fn new(config: &'a ConfigManager) -> Self {
        Self { config }
    }

    /// 从文件导入可用性汇总
    pub fn import_availability<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> ImportResult<Vec<AvailabilitySummary>> {
        let rows = UniversalFileParser.parse(file_path.as_ref())?;
        let summaries = self.map_availability(&rows)?;
        info!(
            path = %file_path.as_ref().display(),
            count = summaries.len(),
            "可用性汇总导入完成"
        );
        Ok(summaries)
    }

    /// 从文件导入产量汇总
    pub fn import_production<P: AsRef<Path>>(
        &self,
        file_path: P,
    ) -> ImportResult<Vec<ProductionSummary>> {
        let rows = UniversalFileParser.parse(file_path.as_ref())?;
        let summaries = self.map_production(&rows)?;
        info!(
            path = %file_path.as_ref().display(),
            count = summaries.len(),
            "产量汇总导入完成"
        );
        Ok(summaries)
    }

    pub fn map_availability(&self, rows: &[RawRow]) -> ImportResult<Vec<AvailabilitySummary>> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let row_number = idx + 1;
                Ok(AvailabilitySummary::new(
                    parse_timestamp(row, "start_time", row_number)?,
                    parse_timestamp(row, "end_time", row_number)?,
                    self.resolve_reason(row, row_number)?,
                ))
            })
            .collect()
    }

    pub fn map_production(&self, rows: &[RawRow]) -> ImportResult<Vec<ProductionSummary>> {
        rows.iter()
            .enumerate()
            .map(|(idx, row)| {
                let row_number = idx + 1;
                let kind: ProductionKind = parse_field(row, "kind", row_number)?;
                let amount: f64 = parse_field(row, "amount", row_number)?;
                let unit: Unit = parse_field(row, "unit", row_number)?;

                Ok(ProductionSummary::new(
                    parse_timestamp(row, "start_time", row_number)?,
                    parse_timestamp(row, "end_time", row_number)?,
                    kind,
                    Quantity::new(amount, unit),
                ))
            })
            .collect()
    }

    /// 原因代码优先查配置目录; 目录中没有时使用行内 loss 列
    fn resolve_reason(&self, row: &RawRow, row_number: usize) -> ImportResult<Reason> {
        let name = required(row, "reason", row_number)?;
        if let Some(reason) = self.config.reason(name) {
            return Ok(reason.clone());
        }

        match row.get("loss").filter(|v| !v.is_empty()) {
            Some(_) => {
                let loss: TimeLoss = parse_field(row, "loss", row_number)?;
                Ok(Reason::new(name, loss))
            }
            None => Err(ImportError::UnknownReason {
                row: row_number,
                reason: name.to_string(),
            }),
        }
    }
}

fn required<'r>(row: &'r RawRow, field: &str, row_number: usize) -> ImportResult<&'r str> {
    row.get(field)
        .map(|v| v.as_str())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ImportError::MissingField {
            row: row_number,
            field: field.to_string(),
        })
}

fn parse_field<T>(row: &RawRow, field: &str, row_number: usize) -> ImportResult<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let value = required(row, field, row_number)?;
    value
        .parse::<T>()
        .map_err(|e| ImportError::TypeConversionError {
            row: row_number,
            field: field.to_string(),
            message: e.to_string(),
        })
}

fn parse_timestamp(
    row: &RawRow,
    field: &str,
    row_number: usize,
) -> ImportResult<DateTime<FixedOffset>> {
    let value = required(row, field, row_number)?;
    DateTime::parse_from_rfc3339(value).map_err(|_| ImportError::DateFormatError {
        row: row_number,
        field: field.to_string(),
        value: value.to_string(),
    })
}
