// ==========================================
// 制造成本估算系统 - 配置管理器
// ==========================================
// 职责: 估算参数加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)，仅使用 scope_id='global'
// ==========================================

use crate::config::estimation_config_trait::{ConfigResult, EstimationConfigReader};
use crate::config::settings::{
    default_man_hours_matrix, ManHoursMatrix, DEFAULT_CNC_MONTHLY_WAGE,
    DEFAULT_CONVENTIONAL_MONTHLY_WAGE, DEFAULT_MAN_HOURS, DEFAULT_WAGE_HOURS_PER_MONTH,
};
use crate::db::{ensure_reference_schema, open_sqlite_connection};
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::warn;

const GLOBAL_SCOPE: &str = "global";

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> ConfigResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        ensure_reference_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ConfigResult<Self> {
        {
            let guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&guard)?;
            ensure_reference_schema(&guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    pub fn get_global_config_value(&self, key: &str) -> ConfigResult<Option<String>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = ?1 AND key = ?2",
            params![GLOBAL_SCOPE, key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global 配置（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> ConfigResult<()> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES (?1, ?2, ?3)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?3, updated_at = datetime('now')",
            params![GLOBAL_SCOPE, key, value],
        )?;
        Ok(())
    }

    /// 写入工时矩阵（序列化为 JSON）
    pub fn set_man_hours_matrix(&self, matrix: &ManHoursMatrix) -> ConfigResult<()> {
        let raw = serde_json::to_string(matrix)?;
        self.set_global_config_value(config_keys::MAN_HOURS_MATRIX, &raw)
    }

    /// 获取所有 global 配置的快照（JSON格式，按 key 排序）
    pub fn get_config_snapshot(&self) -> ConfigResult<String> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = ?1 ORDER BY key")?;
        let rows = stmt.query_map(params![GLOBAL_SCOPE], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }

    /// 读取数值配置；不存在或无法解析时取默认值
    fn get_f64_or_default(&self, key: &str, default: f64) -> ConfigResult<f64> {
        match self.get_global_config_value(key)? {
            Some(raw) => match raw.trim().parse::<f64>() {
                Ok(v) => Ok(v),
                Err(_) => {
                    warn!(key, value = %raw, "配置值不是数字，使用默认值 {}", default);
                    Ok(default)
                }
            },
            None => Ok(default),
        }
    }
}

// ==========================================
// 实现 EstimationConfigReader Trait
// ==========================================
#[async_trait]
impl EstimationConfigReader for ConfigManager {
    async fn get_conventional_operator_monthly_wage(&self) -> ConfigResult<f64> {
        self.get_f64_or_default(
            config_keys::CONVENTIONAL_OPERATOR_MONTHLY_WAGE,
            DEFAULT_CONVENTIONAL_MONTHLY_WAGE,
        )
    }

    async fn get_cnc_operator_monthly_wage(&self) -> ConfigResult<f64> {
        self.get_f64_or_default(config_keys::CNC_OPERATOR_MONTHLY_WAGE, DEFAULT_CNC_MONTHLY_WAGE)
    }

    async fn get_wage_hours_per_month(&self) -> ConfigResult<f64> {
        let hours =
            self.get_f64_or_default(config_keys::WAGE_HOURS_PER_MONTH, DEFAULT_WAGE_HOURS_PER_MONTH)?;
        if hours <= 0.0 {
            warn!(hours, "每月工时必须为正数，使用默认值");
            return Ok(DEFAULT_WAGE_HOURS_PER_MONTH);
        }
        Ok(hours)
    }

    async fn get_default_man_hours(&self) -> ConfigResult<f64> {
        self.get_f64_or_default(config_keys::DEFAULT_MAN_HOURS, DEFAULT_MAN_HOURS)
    }

    async fn get_man_hours_matrix(&self) -> ConfigResult<ManHoursMatrix> {
        let raw = match self.get_global_config_value(config_keys::MAN_HOURS_MATRIX)? {
            Some(v) => v,
            None => return Ok(default_man_hours_matrix()),
        };

        match serde_json::from_str::<ManHoursMatrix>(&raw) {
            Ok(matrix) => Ok(matrix),
            Err(e) => {
                warn!(error = %e, "工时矩阵配置格式错误，使用内置矩阵");
                Ok(default_man_hours_matrix())
            }
        }
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 工资口径
    pub const CONVENTIONAL_OPERATOR_MONTHLY_WAGE: &str = "conventional_operator_monthly_wage";
    pub const CNC_OPERATOR_MONTHLY_WAGE: &str = "cnc_operator_monthly_wage";
    pub const WAGE_HOURS_PER_MONTH: &str = "wage_hours_per_month";

    // 工时
    pub const DEFAULT_MAN_HOURS: &str = "default_man_hours";
    pub const MAN_HOURS_MATRIX: &str = "man_hours_matrix"; // JSON

    pub const ALL: [&str; 5] = [
        CONVENTIONAL_OPERATOR_MONTHLY_WAGE,
        CNC_OPERATOR_MONTHLY_WAGE,
        WAGE_HOURS_PER_MONTH,
        DEFAULT_MAN_HOURS,
        MAN_HOURS_MATRIX,
    ];
}
