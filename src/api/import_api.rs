// ==========================================
// 制造成本估算系统 - MHR 导入 API
// ==========================================
// 职责: 封装机时费率配置文件导入
// ==========================================

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use crate::api::error::{ApiError, ApiResult};
use crate::importer::MhrCsvImporter;
use crate::repository::MhrImportSummary;

/// 导入API响应
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MhrImportResponse {
    /// 导入文件路径
    pub source_file: String,
    #[serde(flatten)]
    pub summary: MhrImportSummary,
    /// 导入耗时（毫秒）
    pub elapsed_ms: i64,
}

pub struct ImportApi {
    importer: Arc<MhrCsvImporter>,
}

impl ImportApi {
    pub fn new(importer: Arc<MhrCsvImporter>) -> Self {
        Self { importer }
    }

    /// 导入 MHR 配置 CSV
    ///
    /// 整个文件在一个事务内写入；任一行解析失败则不写入
    #[instrument(skip(self))]
    pub fn import_mhr_file(&self, file_path: &str) -> ApiResult<MhrImportResponse> {
        if file_path.trim().is_empty() {
            return Err(ApiError::InvalidInput("文件路径不能为空".to_string()));
        }

        let started = Instant::now();
        let summary = self.importer.import_file(Path::new(file_path))?;
        let elapsed_ms = i64::try_from(started.elapsed().as_millis()).unwrap_or(i64::MAX);

        info!(
            inserted = summary.mhr_inserted,
            updated = summary.mhr_updated,
            elapsed_ms,
            "MHR 配置导入完成"
        );

        Ok(MhrImportResponse {
            source_file: file_path.to_string(),
            summary,
            elapsed_ms,
        })
    }
}
