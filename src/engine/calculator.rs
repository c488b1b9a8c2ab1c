// ==========================================
// 制造成本估算系统 - 成本核算引擎
// ==========================================
// 职责: A/B/C → 单件成本分解 + 计算过程说明
// 公式:
//   D      = A × (B + C)
//   OH     = C
//   Profit = 10% × (D + OH)
//   P&F    = 2% × D
//   Unit   = D + OH + Profit + P&F
//   Total  = Unit × quantity
//   外协MHR = B + 2C
// 约束: 纯计算，不做非负校验（调用方保证）
// ==========================================

use crate::config::settings::EstimationSettings;
use crate::domain::cost::{CalculationStep, CalculationSteps, CostBreakdown, StepInputs};
use crate::engine::classifier::round_to;
use std::sync::Arc;

const OVERHEAD_RATIO: f64 = 1.0;
const PROFIT_RATIO: f64 = 0.10;
const PACKING_FORWARDING_RATIO: f64 = 0.02;

// ==========================================
// CostCalculator - 成本核算引擎
// ==========================================
pub struct CostCalculator {
    settings: Arc<EstimationSettings>,
}

impl CostCalculator {
    pub fn new(settings: Arc<EstimationSettings>) -> Self {
        Self { settings }
    }

    /// 成本分解
    ///
    /// 金额保留 2 位小数，工时保留 4 位
    pub fn calculate_costs(
        &self,
        man_hours: f64,
        machine_hour_rate: f64,
        wage_rate: f64,
        quantity: u32,
    ) -> CostBreakdown {
        let basic = man_hours * (machine_hour_rate + wage_rate);
        let overheads = wage_rate * OVERHEAD_RATIO;
        let profit = PROFIT_RATIO * (basic + overheads);
        let packing_forwarding = PACKING_FORWARDING_RATIO * basic;
        let unit_cost = basic + overheads + profit + packing_forwarding;
        let total_cost = unit_cost * f64::from(quantity);
        let outsourcing_mhr = machine_hour_rate + 2.0 * wage_rate;

        CostBreakdown {
            man_hours_per_unit: round_to(man_hours, 4),
            machine_hour_rate: round_to(machine_hour_rate, 2),
            wage_rate: round_to(wage_rate, 2),
            basic_cost_per_unit: round_to(basic, 2),
            overheads_per_unit: round_to(overheads, 2),
            profit_per_unit: round_to(profit, 2),
            packing_forwarding_per_unit: round_to(packing_forwarding, 2),
            unit_cost: round_to(unit_cost, 2),
            total_cost: round_to(total_cost, 2),
            outsourcing_mhr: round_to(outsourcing_mhr, 2),
        }
    }

    /// 单件工时 A
    ///
    /// 非零的人工指定值优先；否则查工时矩阵；矩阵未命中取默认工时
    pub fn calculate_man_hours(&self, operation: &str, duty: &str, override_hours: Option<f64>) -> f64 {
        if let Some(hours) = override_hours.filter(|h| *h != 0.0) {
            return hours;
        }

        self.settings
            .man_hours_matrix
            .get(operation)
            .and_then(|per_duty| per_duty.get(duty))
            .copied()
            .unwrap_or(self.settings.default_man_hours)
    }

    /// 计算过程说明（step_1 ~ step_7）
    ///
    /// 中间值取已舍入的分解结果，与展示口径一致；数值按浮点字面量输出（100.0）
    pub fn build_calculation_steps(
        &self,
        man_hours: f64,
        machine_hour_rate: f64,
        wage_rate: f64,
        breakdown: &CostBreakdown,
    ) -> CalculationSteps {
        let b = breakdown;
        CalculationSteps {
            step_1_inputs: StepInputs {
                a_man_hours: man_hours,
                b_machine_hour_rate: machine_hour_rate,
                c_wage_rate: wage_rate,
            },
            step_2_basic_cost: step(
                "D = A × (B + C)",
                format!("{:?} × ({:?} + {:?})", man_hours, machine_hour_rate, wage_rate),
                b.basic_cost_per_unit,
            ),
            step_3_overheads: step(
                "OH = 100% of C (which is just C)",
                format!("{:?}", wage_rate),
                b.overheads_per_unit,
            ),
            step_4_profit: step(
                "Profit = 10% of (D + OH)",
                format!("0.10 × ({:?} + {:?})", b.basic_cost_per_unit, b.overheads_per_unit),
                b.profit_per_unit,
            ),
            step_5_packing_forwarding: step(
                "P&F = 2% of D",
                format!("0.02 × {:?}", b.basic_cost_per_unit),
                b.packing_forwarding_per_unit,
            ),
            step_6_unit_cost: step(
                "Unit Cost = D + OH + Profit + P&F",
                format!(
                    "{:?} + {:?} + {:?} + {:?}",
                    b.basic_cost_per_unit,
                    b.overheads_per_unit,
                    b.profit_per_unit,
                    b.packing_forwarding_per_unit
                ),
                b.unit_cost,
            ),
            step_7_outsourcing_mhr: step(
                "Outsourcing MHR = B + 2C",
                format!("{:?} + (2 × {:?})", machine_hour_rate, wage_rate),
                b.outsourcing_mhr,
            ),
        }
    }
}

fn step(formula: &str, calculation: String, result: f64) -> CalculationStep {
    CalculationStep {
        formula: formula.to_string(),
        calculation,
        result,
    }
}
