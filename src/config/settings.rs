// ==========================================
// 制造成本估算系统 - 估算参数
// ==========================================
// 职责: 工资口径 / 工时矩阵等估算参数（启动时加载一次，估算过程只读）
// 存储: config_kv（scope_id='global'），缺省值见 Default
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 普通机床操作工月薪
pub const DEFAULT_CONVENTIONAL_MONTHLY_WAGE: f64 = 15000.0;
/// 数控/精密机床操作工月薪
pub const DEFAULT_CNC_MONTHLY_WAGE: f64 = 20000.0;
/// 工资率折算: 每月工时
pub const DEFAULT_WAGE_HOURS_PER_MONTH: f64 = 200.0;
/// 工时矩阵未命中时的单件工时
pub const DEFAULT_MAN_HOURS: f64 = 0.5;

/// 工时矩阵: 工序 → 负荷 → 单件工时(小时)
pub type ManHoursMatrix = HashMap<String, HashMap<String, f64>>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimationSettings {
    #[serde(default = "default_conventional_wage")]
    pub conventional_operator_monthly_wage: f64,

    #[serde(default = "default_cnc_wage")]
    pub cnc_operator_monthly_wage: f64,

    #[serde(default = "default_wage_hours")]
    pub wage_hours_per_month: f64,

    #[serde(default = "default_man_hours")]
    pub default_man_hours: f64,

    #[serde(default = "default_man_hours_matrix")]
    pub man_hours_matrix: ManHoursMatrix,
}

impl Default for EstimationSettings {
    fn default() -> Self {
        Self {
            conventional_operator_monthly_wage: DEFAULT_CONVENTIONAL_MONTHLY_WAGE,
            cnc_operator_monthly_wage: DEFAULT_CNC_MONTHLY_WAGE,
            wage_hours_per_month: DEFAULT_WAGE_HOURS_PER_MONTH,
            default_man_hours: DEFAULT_MAN_HOURS,
            man_hours_matrix: default_man_hours_matrix(),
        }
    }
}

fn default_conventional_wage() -> f64 {
    DEFAULT_CONVENTIONAL_MONTHLY_WAGE
}

fn default_cnc_wage() -> f64 {
    DEFAULT_CNC_MONTHLY_WAGE
}

fn default_wage_hours() -> f64 {
    DEFAULT_WAGE_HOURS_PER_MONTH
}

fn default_man_hours() -> f64 {
    DEFAULT_MAN_HOURS
}

/// 内置工时矩阵
pub fn default_man_hours_matrix() -> ManHoursMatrix {
    let rows: [(&str, [f64; 3]); 8] = [
        ("turning", [0.25, 0.5, 1.0]),
        ("milling", [0.5, 1.0, 2.0]),
        ("drilling", [0.15, 0.3, 0.6]),
        ("grinding", [0.3, 0.6, 1.2]),
        ("boring", [0.4, 0.8, 1.5]),
        ("heat_treatment", [0.5, 1.0, 2.0]),
        ("welding", [0.3, 0.6, 1.2]),
        ("surface_treatment", [0.2, 0.4, 0.8]),
    ];

    rows.iter()
        .map(|(op, [light, medium, heavy])| {
            let per_duty: HashMap<String, f64> = [
                ("light".to_string(), *light),
                ("medium".to_string(), *medium),
                ("heavy".to_string(), *heavy),
            ]
            .into_iter()
            .collect();
            (op.to_string(), per_duty)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matrix_shape() {
        let m = default_man_hours_matrix();
        assert_eq!(m.len(), 8);
        assert_eq!(m["milling"]["heavy"], 2.0);
        assert_eq!(m["drilling"]["light"], 0.15);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let s: EstimationSettings =
            serde_json::from_str(r#"{"cnc_operator_monthly_wage": 24000}"#).unwrap();
        assert_eq!(s.cnc_operator_monthly_wage, 24000.0);
        assert_eq!(s.conventional_operator_monthly_wage, DEFAULT_CONVENTIONAL_MONTHLY_WAGE);
        assert_eq!(s.man_hours_matrix, default_man_hours_matrix());
    }
}
