// ==========================================
// 制造成本估算系统 - 配置层
// ==========================================
// 职责: 估算参数管理（工资口径 / 工时矩阵）
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod estimation_config_trait;
pub mod settings;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use estimation_config_trait::{ConfigResult, EstimationConfigReader};
pub use settings::{default_man_hours_matrix, EstimationSettings, ManHoursMatrix};
