// ==========================================
// 制造成本估算系统 - 引擎编排器
// ==========================================
// 用途: 协调 负荷判定 → 费率解析 → 成本核算 的执行顺序
// 红线: 编排器只读参考数据，不落库
// ==========================================

use crate::config::settings::EstimationSettings;
use crate::domain::cost::{
    CalculationSteps, CostBreakdown, CostRequest, DutyClassification, MachineDetails, PartGeometry,
};
use crate::domain::types::{DutyCategory, MachineCategory};
use crate::engine::calculator::CostCalculator;
use crate::engine::classifier::DutyClassifier;
use crate::engine::error::{EstimationError, EstimationResult};
use crate::engine::resolver::{
    determine_machine_category, select_machine, MachineResolver, MhrLookupIds, MhrResolution,
};
use crate::repository::reference_data_repo::ReferenceDataReader;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// 报价场景的默认材料
const QUICK_ESTIMATE_MATERIAL: &str = "steel";

// ==========================================
// CostEstimate - 单件估算结果
// ==========================================
#[derive(Debug, Clone)]
pub struct CostEstimate {
    pub machine: MachineDetails,
    pub machine_category: MachineCategory,
    pub geometry: PartGeometry,
    pub duty: DutyCategory,
    /// 负荷等级是否由请求人工指定
    pub duty_overridden: bool,
    /// 自动判定时的判定依据（人工指定时为空）
    pub classification: Option<DutyClassification>,
    pub mhr: MhrResolution,
    /// 按数量 1 计算
    pub breakdown: CostBreakdown,
    pub steps: CalculationSteps,
}

// ==========================================
// QuickEstimate - 快速报价结果
// ==========================================
#[derive(Debug, Clone)]
pub struct QuickEstimate {
    pub machine: String,
    pub machine_category: MachineCategory,
    pub duty: DutyCategory,
    pub quantity: u32,
    pub breakdown: CostBreakdown,
}

// ==========================================
// CostEstimationEngine - 估算编排器
// ==========================================
pub struct CostEstimationEngine {
    reader: Arc<dyn ReferenceDataReader>,
    classifier: DutyClassifier,
    resolver: MachineResolver,
    calculator: CostCalculator,
}

impl CostEstimationEngine {
    pub fn new(reader: Arc<dyn ReferenceDataReader>, settings: Arc<EstimationSettings>) -> Self {
        Self {
            classifier: DutyClassifier::new(),
            resolver: MachineResolver::new(reader.clone(), settings.clone()),
            calculator: CostCalculator::new(settings),
            reader,
        }
    }

    pub fn classifier(&self) -> &DutyClassifier {
        &self.classifier
    }

    pub fn resolver(&self) -> &MachineResolver {
        &self.resolver
    }

    pub fn calculator(&self) -> &CostCalculator {
        &self.calculator
    }

    /// 单件成本估算
    ///
    /// 步骤:
    /// 1) 按名称查机床（不存在 → MachineNotFound）
    /// 2) 由机床名称推断类别
    /// 3) 识别形状并计算体积（尺寸不全 → InvalidInput）
    /// 4) 负荷等级: 请求指定优先，否则自动判定
    /// 5) 机时费率 B（两级查找，未配置 → MhrNotConfigured）
    /// 6) 工资率 C
    /// 7) 工时 A 取请求值
    /// 8) 成本分解（数量 1）+ 计算过程
    #[instrument(skip(self, request), fields(machine = %request.machine_name, operation = %request.operation_type))]
    pub fn estimate(&self, request: &CostRequest) -> EstimationResult<CostEstimate> {
        // ===== 步骤1: 机床 =====
        let machine = self
            .reader
            .find_machine_by_name(&request.machine_name)?
            .ok_or_else(|| EstimationError::MachineNotFound(request.machine_name.clone()))?;

        // ===== 步骤2: 机床类别 =====
        let machine_category = determine_machine_category(&machine.name);

        // ===== 步骤3: 形状 + 体积 =====
        let geometry = self.classifier.detect_geometry(&request.dimensions)?;

        // ===== 步骤4: 负荷等级 =====
        let operation = request.operation_type.as_str();
        let material = request.material.as_str();
        let (duty, classification) = match request.duty_category {
            Some(duty) => (duty, None),
            None => {
                let c = self
                    .classifier
                    .classify(geometry.shape, &geometry.dimensions, material, operation);
                (c.duty, Some(c))
            }
        };
        debug!(duty = %duty, overridden = classification.is_none(), "负荷等级已确定");

        // ===== 步骤5: 机时费率 B =====
        let mhr = self.resolver.resolve_machine_hour_rate(
            operation,
            duty.as_str(),
            &machine.name,
            MhrLookupIds {
                machine_id: Some(machine.id),
                op_type_id: machine.operation_type_id,
                duty_id: None,
            },
        )?;

        // ===== 步骤6/7: 工资率 C + 工时 A =====
        let wage_rate = self.resolver.get_wage_rate(&machine.name);
        let man_hours = request.man_hours_per_unit;

        // ===== 步骤8: 成本分解 =====
        let breakdown = self.calculator.calculate_costs(man_hours, mhr.rate, wage_rate, 1);
        let steps = self
            .calculator
            .build_calculation_steps(man_hours, mhr.rate, wage_rate, &breakdown);

        info!(
            machine_id = machine.id,
            duty = %duty,
            rate = mhr.rate,
            wage_rate,
            unit_cost = breakdown.unit_cost,
            "单件成本估算完成"
        );

        Ok(CostEstimate {
            duty_overridden: request.duty_category.is_some(),
            machine: MachineDetails {
                id: machine.id,
                name: machine.name,
                operation_type_id: machine.operation_type_id,
            },
            machine_category,
            geometry,
            duty,
            classification,
            mhr,
            breakdown,
            steps,
        })
    }

    /// 快速报价（仅工序 + 负荷 + 数量）
    ///
    /// 材料固定按 steel 推荐机床，工时取工时矩阵
    #[instrument(skip(self))]
    pub fn quick_estimate(
        &self,
        operation: &str,
        duty: &str,
        quantity: u32,
    ) -> EstimationResult<QuickEstimate> {
        let duty = DutyCategory::parse_normalized(duty).ok_or_else(|| {
            EstimationError::InvalidInput(format!(
                "负荷等级无效: '{}'（可选 light / medium / heavy）",
                duty
            ))
        })?;
        let operation = operation.trim().to_lowercase();

        let (machine_name, machine_category) =
            select_machine(&operation, duty, QUICK_ESTIMATE_MATERIAL, None);

        let machine = self
            .reader
            .find_machine_by_name(&machine_name)?
            .ok_or_else(|| EstimationError::MachineNotFound(machine_name.clone()))?;

        let rate = self.resolver.get_machine_hour_rate(
            &operation,
            duty.as_str(),
            &machine_name,
            MhrLookupIds {
                machine_id: Some(machine.id),
                op_type_id: machine.operation_type_id,
                duty_id: None,
            },
        )?;
        let wage_rate = self.resolver.get_wage_rate(&machine_name);
        let man_hours = self
            .calculator
            .calculate_man_hours(&operation, duty.as_str(), None);

        let breakdown = self
            .calculator
            .calculate_costs(man_hours, rate, wage_rate, quantity);

        info!(
            machine = %machine_name,
            unit_cost = breakdown.unit_cost,
            total_cost = breakdown.total_cost,
            "快速报价完成"
        );

        Ok(QuickEstimate {
            machine: machine_name,
            machine_category,
            duty,
            quantity,
            breakdown,
        })
    }
}
