// ==========================================
// 制造成本估算系统 - 配置管理 API
// ==========================================
// 职责: 估算参数查询、覆写
// 说明: 估算参数在启动时加载一次，覆写值下次启动生效
// ==========================================

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::api::error::{ApiError, ApiResult};
use crate::config::{config_keys, ConfigManager, EstimationSettings, ManHoursMatrix};

/// 配置总览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigOverview {
    /// 数据库文件路径
    pub db_path: String,
    /// 当前生效的估算参数
    pub effective: EstimationSettings,
    /// config_kv 中已存储的 global 配置
    pub stored: BTreeMap<String, String>,
}

// ==========================================
// ConfigApi - 配置管理 API
// ==========================================
pub struct ConfigApi {
    db_path: String,
    config_manager: Arc<ConfigManager>,
    settings: Arc<EstimationSettings>,
}

impl ConfigApi {
    pub fn new(
        db_path: String,
        config_manager: Arc<ConfigManager>,
        settings: Arc<EstimationSettings>,
    ) -> Self {
        Self {
            db_path,
            config_manager,
            settings,
        }
    }

    /// 查询配置总览
    pub fn get_config_overview(&self) -> ApiResult<ConfigOverview> {
        let snapshot = self
            .config_manager
            .get_config_snapshot()
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;
        let stored: BTreeMap<String, String> = serde_json::from_str(&snapshot)
            .map_err(|e| ApiError::DatabaseError(format!("配置快照解析失败: {}", e)))?;

        Ok(ConfigOverview {
            db_path: self.db_path.clone(),
            effective: (*self.settings).clone(),
            stored,
        })
    }

    /// 覆写单个 global 配置
    ///
    /// # 校验
    /// - 键必须是已知的估算参数
    /// - 工资/工时类取值须为正数；工时矩阵须为合法 JSON
    pub fn update_config(&self, key: &str, value: &str) -> ApiResult<()> {
        let key = key.trim();
        if key.is_empty() {
            return Err(ApiError::InvalidInput("配置键不能为空".to_string()));
        }
        if !config_keys::ALL.contains(&key) {
            return Err(ApiError::InvalidInput(format!(
                "未知配置键: {}（可选: {}）",
                key,
                config_keys::ALL.join(", ")
            )));
        }

        let value = value.trim();
        if key == config_keys::MAN_HOURS_MATRIX {
            serde_json::from_str::<ManHoursMatrix>(value)
                .map_err(|e| ApiError::InvalidInput(format!("工时矩阵格式错误: {}", e)))?;
        } else {
            match value.parse::<f64>() {
                Ok(v) if v.is_finite() && v > 0.0 => {}
                _ => {
                    return Err(ApiError::InvalidInput(format!(
                        "配置{}的取值必须为正数: {}",
                        key, value
                    )))
                }
            }
        }

        self.config_manager
            .set_global_config_value(key, value)
            .map_err(|e| ApiError::DatabaseError(e.to_string()))?;

        info!(key, value, "配置已更新，下次启动生效");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;
    use std::sync::Mutex;

    fn config_api() -> ConfigApi {
        let conn = Connection::open_in_memory().unwrap();
        let manager = ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap();
        ConfigApi::new(
            ":memory:".to_string(),
            Arc::new(manager),
            Arc::new(EstimationSettings::default()),
        )
    }

    #[test]
    fn test_update_and_overview() {
        let api = config_api();
        api.update_config(config_keys::WAGE_HOURS_PER_MONTH, " 180 ").unwrap();
        api.update_config(
            config_keys::MAN_HOURS_MATRIX,
            r#"{"turning": {"light": 0.3}}"#,
        )
        .unwrap();

        let overview = api.get_config_overview().unwrap();
        assert_eq!(overview.db_path, ":memory:");
        assert_eq!(overview.stored[config_keys::WAGE_HOURS_PER_MONTH], "180");
        assert_eq!(overview.stored.len(), 2);
        // 生效值保持启动时加载的参数
        assert_eq!(overview.effective.wage_hours_per_month, 200.0);
    }

    #[test]
    fn test_update_rejects_bad_input() {
        let api = config_api();

        let err = api.update_config("overtime_ratio", "1.5").unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        for bad in ["0", "-100", "abc", "NaN"] {
            let err = api
                .update_config(config_keys::CNC_OPERATOR_MONTHLY_WAGE, bad)
                .unwrap_err();
            assert_eq!(err.code(), "INVALID_INPUT");
        }

        let err = api
            .update_config(config_keys::MAN_HOURS_MATRIX, r#"["turning"]"#)
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_INPUT");

        assert!(api.get_config_overview().unwrap().stored.is_empty());
    }
}
