// ==========================================
// 制造成本估算系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 单件成本估算（负荷判定 → 机时费率 → 成本分解）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 参考数据
pub mod importer;

// 配置层 - 估算参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// 应用层 - 组装
pub mod app;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{DutyCategory, MachineCategory, MaterialKind, OperationKind, Shape};

// 领域实体
pub use domain::{CostBreakdown, CostRequest, Dimensions, Machine, MhrRecord};

// 引擎
pub use engine::{
    CostCalculator, CostEstimationEngine, DutyClassifier, EstimationError, MachineResolver,
};

// API
pub use api::{ApiError, CostEstimationApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "制造成本估算系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
