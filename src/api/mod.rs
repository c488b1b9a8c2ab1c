// ==========================================
// 制造成本估算系统 - API 层
// ==========================================
// 职责: 提供业务 API 接口,供外层适配器（CLI/HTTP）调用
// ==========================================

pub mod config_api;
pub mod cost_estimation_api;
pub mod error;
pub mod import_api;

// 重导出核心类型
pub use config_api::{ConfigApi, ConfigOverview};
pub use cost_estimation_api::{CostEstimationApi, CostEstimationResponse, QuickEstimateResponse};
pub use error::{ApiError, ApiResult, ErrorResponse};
pub use import_api::{ImportApi, MhrImportResponse};
