// ==========================================
// 制造成本估算系统 - 参考数据实体
// ==========================================
// 职责: 工序 / 机床 / 负荷 / 材料 / 机时费率(MHR) 主数据
// 红线: 引擎只读，不写参考数据
// ==========================================

use serde::{Deserialize, Serialize};

/// 工序类型
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationType {
    pub id: i64,
    pub name: String,
}

/// 机床
///
/// 类别（普通/三轴/五轴/专机）不落库，由名称推断
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Machine {
    pub id: i64,
    pub name: String,
    pub operation_type_id: Option<i64>,
}

/// 负荷等级字典（名称可能为 "Medium duty" 等同义写法）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Duty {
    pub id: i64,
    pub name: String,
}

/// 材料字典
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: i64,
    pub name: String,
}

/// 机时费率配置行
///
/// 引擎只关心 machine_hr_rate，其余字段仅作展示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MhrRecord {
    pub id: i64,
    pub operation_type_id: Option<i64>,
    pub duty_id: Option<i64>,
    pub machine_id: Option<i64>,
    pub investment_cost: Option<String>,
    pub elect_power_rating: Option<String>,
    pub elect_power_charges: Option<String>,
    pub available_hrs_per_annum: Option<String>,
    pub utilization_hrs_year: Option<String>,
    pub machine_hr_rate: Option<f64>,
}

/// 机时费率配置行（关联工序/负荷/机床名称）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MhrRow {
    pub record: MhrRecord,
    pub operation_name: Option<String>,
    pub duty_name: Option<String>,
    pub machine_name: Option<String>,
}

/// 新增机时费率配置（导入/初始化用）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewMhrRecord {
    pub operation_type_id: i64,
    pub duty_id: i64,
    pub machine_id: i64,
    pub investment_cost: Option<String>,
    pub elect_power_rating: Option<String>,
    pub elect_power_charges: Option<String>,
    pub available_hrs_per_annum: Option<String>,
    pub utilization_hrs_year: Option<String>,
    pub machine_hr_rate: Option<f64>,
}

/// 机时费率配置导入行（按名称引用工序/负荷/机床）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MhrConfigRow {
    pub operation: String,
    pub duty: String,
    pub machine: String,
    pub investment_cost: Option<String>,
    pub elect_power_rating: Option<String>,
    pub elect_power_charges: Option<String>,
    pub available_hrs_per_annum: Option<String>,
    pub utilization_hrs_year: Option<String>,
    pub machine_hr_rate: Option<f64>,
}
