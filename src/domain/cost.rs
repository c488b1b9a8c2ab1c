// ==========================================
// 制造成本估算系统 - 成本核算实体
// ==========================================
// 职责: 估算请求 / 尺寸 / 成本分解 / 计算过程说明
// 说明: 均为请求内瞬态对象，不落库
// ==========================================

use crate::domain::types::{DutyCategory, MaterialKind, OperationKind, Shape};
use serde::{Deserialize, Serialize};

// ==========================================
// 尺寸 (单位: mm)
// ==========================================
// 回转体: diameter + length
// 箱体:   length + breadth + height
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breadth: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Dimensions {
    pub fn round(diameter: f64, length: f64) -> Self {
        Self {
            diameter: Some(diameter),
            length: Some(length),
            ..Default::default()
        }
    }

    pub fn rectangular(length: f64, breadth: f64, height: f64) -> Self {
        Self {
            length: Some(length),
            breadth: Some(breadth),
            height: Some(height),
            ..Default::default()
        }
    }
}

// ==========================================
// 成本估算请求
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRequest {
    pub material: MaterialKind,
    pub operation_type: OperationKind,
    pub dimensions: Dimensions,
    /// 机床名称（须与 machines 表完全一致）
    pub machine_name: String,
    /// 单件工时 A (小时)
    pub man_hours_per_unit: f64,
    /// 人工指定负荷等级（为空则自动判定）
    #[serde(default)]
    pub duty_category: Option<DutyCategory>,
}

// ==========================================
// 成本分解
// ==========================================
// A=工时 B=机时费率 C=工资率
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub man_hours_per_unit: f64,
    pub machine_hour_rate: f64,
    pub wage_rate: f64,
    pub basic_cost_per_unit: f64,
    pub overheads_per_unit: f64,
    pub profit_per_unit: f64,
    pub packing_forwarding_per_unit: f64,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub outsourcing_mhr: f64,
}

/// 单件成本分解（不含批量总价）
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UnitCostBreakdown {
    pub man_hours_per_unit: f64,
    pub machine_hour_rate: f64,
    pub wage_rate: f64,
    pub basic_cost_per_unit: f64,
    pub overheads_per_unit: f64,
    pub profit_per_unit: f64,
    pub packing_forwarding_per_unit: f64,
    pub unit_cost: f64,
    pub outsourcing_mhr: f64,
}

impl From<CostBreakdown> for UnitCostBreakdown {
    fn from(b: CostBreakdown) -> Self {
        Self {
            man_hours_per_unit: b.man_hours_per_unit,
            machine_hour_rate: b.machine_hour_rate,
            wage_rate: b.wage_rate,
            basic_cost_per_unit: b.basic_cost_per_unit,
            overheads_per_unit: b.overheads_per_unit,
            profit_per_unit: b.profit_per_unit,
            packing_forwarding_per_unit: b.packing_forwarding_per_unit,
            unit_cost: b.unit_cost,
            outsourcing_mhr: b.outsourcing_mhr,
        }
    }
}

// ==========================================
// 负荷判定结果（可解释性）
// ==========================================

/// 基础负荷的判定依据
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DutyBasis {
    /// 按几何尺寸阈值
    Geometry,
    /// 尺寸字段不全，按体积评分兜底
    VolumeScore { score: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DutyClassification {
    pub duty: DutyCategory,
    pub base_duty: DutyCategory,
    pub basis: DutyBasis,
    /// 调整因子（材料/工序抬升），按应用顺序
    pub factors: Vec<String>,
}

// ==========================================
// 计算过程说明
// ==========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepInputs {
    #[serde(rename = "A_man_hours")]
    pub a_man_hours: f64,
    #[serde(rename = "B_machine_hour_rate")]
    pub b_machine_hour_rate: f64,
    #[serde(rename = "C_wage_rate")]
    pub c_wage_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationStep {
    pub formula: String,
    pub calculation: String,
    pub result: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationSteps {
    pub step_1_inputs: StepInputs,
    pub step_2_basic_cost: CalculationStep,
    pub step_3_overheads: CalculationStep,
    pub step_4_profit: CalculationStep,
    pub step_5_packing_forwarding: CalculationStep,
    pub step_6_unit_cost: CalculationStep,
    pub step_7_outsourcing_mhr: CalculationStep,
}

// ==========================================
// 选定机床
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineDetails {
    pub id: i64,
    pub name: String,
    pub operation_type_id: Option<i64>,
}

/// 零件形状 + 规整后的尺寸 + 体积
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PartGeometry {
    pub shape: Shape,
    pub dimensions: Dimensions,
    /// 体积 (mm³)，保留 2 位小数
    pub volume: f64,
}
