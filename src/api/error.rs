// ==========================================
// 制造成本估算系统 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换 Repository / 引擎错误为用户友好的错误消息
// ==========================================

use crate::engine::error::EstimationError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API层错误类型
/// 所有错误信息必须包含显式原因
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    /// 数据完整性问题，不是系统故障
    #[error("机时费率未配置: {0}")]
    MhrNotConfigured(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// 错误代码（返回给调用方）
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidInput(_) => "INVALID_INPUT",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::MhrNotConfigured(_) => "MHR_NOT_CONFIGURED",
            ApiError::BusinessRuleViolation(_) => "BUSINESS_RULE_VIOLATION",
            ApiError::DatabaseError(_) => "DATABASE_ERROR",
            ApiError::DatabaseConnectionError(_) => "DATABASE_CONNECTION_ERROR",
            ApiError::ImportError(_) => "IMPORT_ERROR",
            ApiError::Other(_) => "OTHER_ERROR",
        }
    }

    /// 对应的 HTTP 状态码（供外层 HTTP 适配器使用）
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::NotFound(_) => 404,
            ApiError::InvalidInput(_)
            | ApiError::MhrNotConfigured(_)
            | ApiError::ImportError(_) => 400,
            ApiError::BusinessRuleViolation(_) => 409,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::Other(_) => 500,
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
            status: self.http_status(),
        }
    }
}

/// 错误响应（返回给调用方）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// 错误代码
    pub code: String,
    /// 错误消息
    pub message: String,
    pub status: u16,
}

// ==========================================
// 从 RepositoryError 转换
// 目的: 将Repository层的技术错误转换为用户友好的业务错误
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("唯一约束违反: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("外键约束违反: {}", msg))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 EstimationError 转换
// ==========================================
impl From<EstimationError> for ApiError {
    fn from(err: EstimationError) -> Self {
        match err {
            EstimationError::MachineNotFound(_) => ApiError::NotFound(err.to_string()),
            EstimationError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            EstimationError::MhrNotConfigured { .. } => {
                ApiError::MhrNotConfigured(err.to_string())
            }
            EstimationError::Repository(e) => ApiError::from(e),
        }
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Repository(e) => ApiError::from(e),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimation_error_mapping() {
        let not_found: ApiError = EstimationError::MachineNotFound("X".to_string()).into();
        assert_eq!(not_found.code(), "NOT_FOUND");
        assert_eq!(not_found.http_status(), 404);

        let invalid: ApiError = EstimationError::InvalidInput("dims".to_string()).into();
        assert_eq!(invalid.code(), "INVALID_INPUT");
        assert_eq!(invalid.http_status(), 400);

        let mhr: ApiError = EstimationError::MhrNotConfigured {
            operation: "turning".to_string(),
            duty: "heavy".to_string(),
            machine: "CNC Lathe".to_string(),
        }
        .into();
        assert_eq!(mhr.code(), "MHR_NOT_CONFIGURED");
        assert_eq!(mhr.http_status(), 400);
        assert!(mhr.to_string().contains("turning"));
    }

    #[test]
    fn test_repository_error_mapping() {
        let db: ApiError = EstimationError::Repository(RepositoryError::DatabaseQueryError(
            "disk I/O".to_string(),
        ))
        .into();
        assert_eq!(db.code(), "DATABASE_ERROR");
        assert_eq!(db.http_status(), 500);

        let lock: ApiError = RepositoryError::LockError("poisoned".to_string()).into();
        assert_eq!(lock.code(), "DATABASE_CONNECTION_ERROR");
        assert_eq!(lock.http_status(), 500);

        let unique: ApiError =
            RepositoryError::UniqueConstraintViolation("mhr.id".to_string()).into();
        assert_eq!(unique.code(), "BUSINESS_RULE_VIOLATION");
        assert_eq!(unique.http_status(), 409);

        let import: ApiError = ImportError::UnsupportedFormat("xlsx".to_string()).into();
        assert_eq!(import.code(), "IMPORT_ERROR");
        assert_eq!(import.http_status(), 400);
    }

    #[test]
    fn test_error_response() {
        let resp = ApiError::NotFound("机床不存在".to_string()).to_response();
        assert_eq!(resp.code, "NOT_FOUND");
        assert_eq!(resp.status, 404);
        assert!(resp.message.contains("机床不存在"));
    }
}
