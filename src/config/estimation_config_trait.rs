// ==========================================
// 制造成本估算系统 - 估算参数读取 Trait
// ==========================================
// 职责: 定义估算引擎所需的参数读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::settings::{EstimationSettings, ManHoursMatrix};
use async_trait::async_trait;
use std::error::Error;

pub type ConfigResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

// ==========================================
// EstimationConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait EstimationConfigReader: Send + Sync {
    // ===== 工资口径 =====

    /// 普通机床操作工月薪
    ///
    /// # 默认值
    /// - 15000
    async fn get_conventional_operator_monthly_wage(&self) -> ConfigResult<f64>;

    /// 数控/专机操作工月薪
    ///
    /// # 默认值
    /// - 20000
    async fn get_cnc_operator_monthly_wage(&self) -> ConfigResult<f64>;

    /// 工资率折算的每月工时
    ///
    /// # 默认值
    /// - 200
    async fn get_wage_hours_per_month(&self) -> ConfigResult<f64>;

    // ===== 工时 =====

    /// 工时矩阵未命中时的单件工时
    ///
    /// # 默认值
    /// - 0.5
    async fn get_default_man_hours(&self) -> ConfigResult<f64>;

    /// 工时矩阵（JSON: {"turning": {"light": 0.25, ...}, ...}）
    ///
    /// # 默认值
    /// - 内置矩阵（格式错误时同样回退）
    async fn get_man_hours_matrix(&self) -> ConfigResult<ManHoursMatrix>;

    /// 一次性加载全部估算参数
    async fn load_settings(&self) -> ConfigResult<EstimationSettings> {
        Ok(EstimationSettings {
            conventional_operator_monthly_wage: self.get_conventional_operator_monthly_wage().await?,
            cnc_operator_monthly_wage: self.get_cnc_operator_monthly_wage().await?,
            wage_hours_per_month: self.get_wage_hours_per_month().await?,
            default_man_hours: self.get_default_man_hours().await?,
            man_hours_matrix: self.get_man_hours_matrix().await?,
        })
    }
}
