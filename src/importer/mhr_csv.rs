// ==========================================
// 制造成本估算系统 - MHR 配置 CSV 导入
// ==========================================
// 职责: CSV → MhrConfigRow → 参考数据库（单事务）
// 列: operation, duty, machine（必填）
//     investment_cost, elect_power_rating, elect_power_charges,
//     available_hrs_per_annum, utilization_hrs_year, machine_hr_rate（可空）
// ==========================================

use crate::domain::reference::MhrConfigRow;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::reference_data_repo_impl::{MhrImportSummary, ReferenceDataRepository};
use csv::{ReaderBuilder, StringRecord};
use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument};

const REQUIRED_COLUMNS: [&str; 3] = ["operation", "duty", "machine"];

// ==========================================
// 解析
// ==========================================

/// 从任意 Reader 解析 MHR 配置行
///
/// - 表头去空白、不区分大小写
/// - 空行跳过
/// - 可选文本列空串视为 None
pub fn parse_mhr_rows<R: Read>(reader: R) -> ImportResult<Vec<MhrConfigRow>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(reader);

    let headers: HashMap<String, usize> = reader
        .headers()?
        .iter()
        .enumerate()
        .map(|(idx, h)| (h.trim().to_lowercase(), idx))
        .collect();

    for col in REQUIRED_COLUMNS {
        if !headers.contains_key(col) {
            return Err(ImportError::MissingColumn(col.to_string()));
        }
    }

    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result?;
        // 行号按文件计（表头为第 1 行）
        let row_no = idx + 2;
        if record.iter().all(|v| v.trim().is_empty()) {
            continue;
        }

        let cell = |name: &str| -> Option<String> {
            headers
                .get(name)
                .and_then(|&i| record.get(i))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let required = |name: &str| -> ImportResult<String> {
            cell(name).ok_or_else(|| ImportError::RequiredFieldMissing {
                row: row_no,
                field: name.to_string(),
            })
        };

        rows.push(MhrConfigRow {
            operation: required("operation")?,
            duty: required("duty")?,
            machine: required("machine")?,
            investment_cost: cell("investment_cost"),
            elect_power_rating: cell("elect_power_rating"),
            elect_power_charges: cell("elect_power_charges"),
            available_hrs_per_annum: cell("available_hrs_per_annum"),
            utilization_hrs_year: cell("utilization_hrs_year"),
            machine_hr_rate: parse_rate(&record, &headers, row_no)?,
        });
    }

    Ok(rows)
}

fn parse_rate(
    record: &StringRecord,
    headers: &HashMap<String, usize>,
    row_no: usize,
) -> ImportResult<Option<f64>> {
    let raw = match headers.get("machine_hr_rate").and_then(|&i| record.get(i)) {
        Some(v) if !v.trim().is_empty() => v.trim(),
        _ => return Ok(None),
    };
    raw.replace(',', "")
        .parse::<f64>()
        .map(Some)
        .map_err(|e| ImportError::TypeConversionError {
            row: row_no,
            field: "machine_hr_rate".to_string(),
            message: format!("'{}': {}", raw, e),
        })
}

/// 从文件解析 MHR 配置行
pub fn parse_mhr_file(path: &Path) -> ImportResult<Vec<MhrConfigRow>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("csv"))
        .unwrap_or(false);
    if !is_csv {
        return Err(ImportError::UnsupportedFormat(path.display().to_string()));
    }

    parse_mhr_rows(File::open(path)?)
}

// ==========================================
// MhrCsvImporter - 导入器
// ==========================================
pub struct MhrCsvImporter {
    repo: Arc<ReferenceDataRepository>,
}

impl MhrCsvImporter {
    pub fn new(repo: Arc<ReferenceDataRepository>) -> Self {
        Self { repo }
    }

    /// 导入 CSV 文件
    #[instrument(skip(self), fields(path = %path.display()))]
    pub fn import_file(&self, path: &Path) -> ImportResult<MhrImportSummary> {
        let rows = parse_mhr_file(path)?;
        self.import_rows(&rows)
    }

    /// 导入已解析的配置行（单事务，失败整体回滚）
    pub fn import_rows(&self, rows: &[MhrConfigRow]) -> ImportResult<MhrImportSummary> {
        let summary = self.repo.import_mhr_rows(rows)?;
        info!(
            rows = rows.len(),
            operation_types_created = summary.operation_types_created,
            duties_created = summary.duties_created,
            machines_created = summary.machines_created,
            mhr_inserted = summary.mhr_inserted,
            mhr_updated = summary.mhr_updated,
            "MHR 配置导入完成"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows_with_optional_fields() {
        let csv = "\
Operation, Duty ,machine,investment_cost,machine_hr_rate
turning,Medium duty,CNC Lathe,\"1,200,000\",450
milling,Heavy duty,CNC Milling - 5 Axis,,
,,,,
";
        let rows = parse_mhr_rows(csv.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        assert_eq!(rows[0].operation, "turning");
        assert_eq!(rows[0].duty, "Medium duty");
        assert_eq!(rows[0].investment_cost.as_deref(), Some("1,200,000"));
        assert_eq!(rows[0].machine_hr_rate, Some(450.0));
        assert_eq!(rows[0].elect_power_rating, None);

        assert_eq!(rows[1].machine, "CNC Milling - 5 Axis");
        assert_eq!(rows[1].machine_hr_rate, None);
    }

    #[test]
    fn test_missing_required_column() {
        let csv = "operation,machine,machine_hr_rate\nturning,CNC Lathe,450\n";
        let err = parse_mhr_rows(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::MissingColumn(ref c) if c == "duty"));
    }

    #[test]
    fn test_required_field_empty() {
        let csv = "operation,duty,machine\nturning,,CNC Lathe\n";
        let err = parse_mhr_rows(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::RequiredFieldMissing { row: 2, .. }));
    }

    #[test]
    fn test_bad_rate() {
        let csv = "operation,duty,machine,machine_hr_rate\nturning,light,CNC Lathe,abc\n";
        let err = parse_mhr_rows(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, ImportError::TypeConversionError { row: 2, .. }));
    }
}
