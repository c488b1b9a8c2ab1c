// ==========================================
// 制造成本估算系统 - 参考数据导入模块
// ==========================================
// 职责: MHR 配置 CSV 解析与入库
// ==========================================

pub mod error;
pub mod mhr_csv;

pub use error::{ImportError, ImportResult};
pub use mhr_csv::{parse_mhr_file, parse_mhr_rows, MhrCsvImporter};
