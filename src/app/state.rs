// ==========================================
// 制造成本估算系统 - 应用状态
// ==========================================
// 职责: 管理应用级别的共享状态和API实例
// ==========================================

use std::sync::{Arc, Mutex};

use crate::api::{ConfigApi, CostEstimationApi, ImportApi};
use crate::config::{ConfigManager, EstimationConfigReader, EstimationSettings};
use crate::db::open_sqlite_connection;
use crate::engine::CostEstimationEngine;
use crate::importer::MhrCsvImporter;
use crate::repository::ReferenceDataRepository;

/// 应用状态
///
/// 共享一条 SQLite 连接；估算参数在启动时加载一次
pub struct AppState {
    pub settings: Arc<EstimationSettings>,
    pub cost_estimation_api: Arc<CostEstimationApi>,
    pub config_api: Arc<ConfigApi>,
    pub import_api: Arc<ImportApi>,
}

impl AppState {
    /// 创建AppState
    ///
    /// # 参数
    /// - db_path: 数据库文件路径（不存在则创建并建表）
    pub async fn new(db_path: String) -> Result<Self, String> {
        tracing::info!("初始化AppState，数据库路径: {}", db_path);

        let conn = open_sqlite_connection(&db_path)
            .map_err(|e| format!("无法打开数据库: {}", e))?;
        let conn = Arc::new(Mutex::new(conn));

        // ==========================================
        // 初始化Repository层
        // ==========================================
        let reference_repo = Arc::new(
            ReferenceDataRepository::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ReferenceDataRepository: {}", e))?,
        );

        // ==========================================
        // 加载估算参数
        // ==========================================
        let config_manager = Arc::new(
            ConfigManager::from_connection(conn.clone())
                .map_err(|e| format!("无法创建ConfigManager: {}", e))?,
        );
        let settings = Arc::new(
            config_manager
                .load_settings()
                .await
                .map_err(|e| format!("无法加载估算参数: {}", e))?,
        );
        tracing::debug!(?settings, "估算参数已加载");

        // ==========================================
        // 初始化引擎与API层
        // ==========================================
        let engine = Arc::new(CostEstimationEngine::new(
            reference_repo.clone(),
            settings.clone(),
        ));
        let cost_estimation_api = Arc::new(CostEstimationApi::new(engine, reference_repo.clone()));
        let config_api = Arc::new(ConfigApi::new(db_path, config_manager, settings.clone()));
        let import_api = Arc::new(ImportApi::new(Arc::new(MhrCsvImporter::new(reference_repo))));

        tracing::info!("AppState初始化完成");

        Ok(Self {
            settings,
            cost_estimation_api,
            config_api,
            import_api,
        })
    }
}

/// 获取默认数据库路径
///
/// 顺序:
/// 1) 环境变量 COST_ESTIMATION_DB_PATH
/// 2) 用户数据目录下 cost-estimation/cost_estimation.db
/// 3) 当前目录 ./cost_estimation.db
pub fn get_default_db_path() -> String {
    use std::path::PathBuf;

    // 允许通过环境变量显式指定 DB 路径（便于调试/测试/CI）
    if let Ok(path) = std::env::var("COST_ESTIMATION_DB_PATH") {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./cost_estimation.db");

    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join("cost-estimation");
        // 确保目录存在；失败时回退到当前目录
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("cost_estimation.db");
        }
    }

    path.to_string_lossy().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_default_db_path() {
        let path = get_default_db_path();
        assert!(path.ends_with(".db"));
    }

    #[tokio::test]
    async fn test_app_state_on_fresh_db() {
        let temp = tempfile::NamedTempFile::new().unwrap();
        let db_path = temp.path().to_string_lossy().to_string();

        let state = AppState::new(db_path.clone()).await.unwrap();
        assert_eq!(*state.settings, EstimationSettings::default());
        assert!(state.cost_estimation_api.list_machines().unwrap().is_empty());

        let overview = state.config_api.get_config_overview().unwrap();
        assert_eq!(overview.db_path, db_path);
        assert!(overview.stored.is_empty());
    }
}
