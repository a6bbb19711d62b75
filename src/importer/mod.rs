// ==========================================
// 设备时间损失 - 导入层
// ==========================================
// 职责: 外部汇总文件导入, 生成领域汇总记录
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod error;
pub mod file_parser;
pub mod summary_importer;

// 重导出核心类型
pub use error::{ImportError, ImportResult};
pub use file_parser::{CsvParser, ExcelParser, FileParser, RawRow, UniversalFileParser};
pub use summary_importer::SummaryImporter;
