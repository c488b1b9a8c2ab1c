// ==========================================
// 制造成本估算系统 - 成本估算 API
// ==========================================
// 职责: 单件成本估算 / 快速报价 / 机床列表
// 说明: 外层（HTTP/CLI）只做请求翻译，业务全部在引擎层
// ==========================================

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::api::error::{ApiError, ApiResult};
use crate::domain::cost::{
    CalculationSteps, CostBreakdown, CostRequest, Dimensions, DutyClassification, MachineDetails,
    UnitCostBreakdown,
};
use crate::domain::reference::Machine;
use crate::domain::types::{DutyCategory, MachineCategory, MaterialKind, OperationKind, Shape};
use crate::engine::orchestrator::CostEstimationEngine;
use crate::engine::resolver::MhrLookupTier;
use crate::repository::reference_data_repo_impl::ReferenceDataRepository;

// ==========================================
// CostEstimationResponse - 单件估算响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostEstimationResponse {
    pub estimate_id: String,
    pub generated_at: DateTime<Utc>,
    pub duty_category: DutyCategory,
    /// 负荷等级是否由请求人工指定
    pub duty_overridden: bool,
    /// 自动判定时的判定依据
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duty_classification: Option<DutyClassification>,
    pub selected_machine: MachineDetails,
    pub machine_category: MachineCategory,
    pub shape: Shape,
    pub dimensions: Dimensions,
    pub volume: f64,
    pub mhr_lookup: MhrLookupTier,
    /// 单件口径，不含 total_cost
    pub cost_breakdown: UnitCostBreakdown,
    pub material: MaterialKind,
    pub operation_type: OperationKind,
    pub calculation_steps: CalculationSteps,
}

// ==========================================
// QuickEstimateResponse - 快速报价响应
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickEstimateResponse {
    pub machine: String,
    pub machine_category: MachineCategory,
    pub duty: DutyCategory,
    pub quantity: u32,
    pub unit_cost: f64,
    pub total_cost: f64,
    pub details: CostBreakdown,
}

// ==========================================
// CostEstimationApi - 成本估算 API
// ==========================================

/// 成本估算API
///
/// 职责：
/// 1. 单件成本估算（含计算过程说明）
/// 2. 快速报价（工序 + 负荷 + 数量）
/// 3. 机床列表（供调用方获取合法机床名称）
pub struct CostEstimationApi {
    engine: Arc<CostEstimationEngine>,
    reference_repo: Arc<ReferenceDataRepository>,
}

impl CostEstimationApi {
    pub fn new(
        engine: Arc<CostEstimationEngine>,
        reference_repo: Arc<ReferenceDataRepository>,
    ) -> Self {
        Self {
            engine,
            reference_repo,
        }
    }

    /// 单件成本估算
    ///
    /// # 错误
    /// - NotFound: 机床名称不存在
    /// - InvalidInput: 尺寸既非回转体也非箱体
    /// - MhrNotConfigured: 工序+负荷+机床组合无机时费率
    #[instrument(skip(self, request))]
    pub fn calculate(&self, request: &CostRequest) -> ApiResult<CostEstimationResponse> {
        if !request.man_hours_per_unit.is_finite() {
            return Err(ApiError::InvalidInput(
                "man_hours_per_unit 必须为有限数值".to_string(),
            ));
        }

        let estimate = self.engine.estimate(request)?;
        let estimate_id = Uuid::new_v4().to_string();

        info!(
            estimate_id = %estimate_id,
            machine = %estimate.machine.name,
            unit_cost = estimate.breakdown.unit_cost,
            "成本估算已生成"
        );

        Ok(CostEstimationResponse {
            estimate_id,
            generated_at: Utc::now(),
            duty_category: estimate.duty,
            duty_overridden: estimate.duty_overridden,
            duty_classification: estimate.classification,
            selected_machine: estimate.machine,
            machine_category: estimate.machine_category,
            shape: estimate.geometry.shape,
            dimensions: estimate.geometry.dimensions,
            volume: estimate.geometry.volume,
            mhr_lookup: estimate.mhr.lookup,
            cost_breakdown: UnitCostBreakdown::from(estimate.breakdown),
            material: request.material,
            operation_type: request.operation_type,
            calculation_steps: estimate.steps,
        })
    }

    /// 快速报价
    ///
    /// # 参数
    /// - operation: 工序（turning / milling / ...）
    /// - duty: 负荷等级（light / medium / heavy，兼容 "Medium duty" 等写法）
    /// - quantity: 数量
    #[instrument(skip(self))]
    pub fn quick_estimate(
        &self,
        operation: &str,
        duty: &str,
        quantity: u32,
    ) -> ApiResult<QuickEstimateResponse> {
        if operation.trim().is_empty() {
            return Err(ApiError::InvalidInput("operation 不能为空".to_string()));
        }

        let quick = self.engine.quick_estimate(operation, duty, quantity)?;

        Ok(QuickEstimateResponse {
            machine: quick.machine,
            machine_category: quick.machine_category,
            duty: quick.duty,
            quantity: quick.quantity,
            unit_cost: quick.breakdown.unit_cost,
            total_cost: quick.breakdown.total_cost,
            details: quick.breakdown,
        })
    }

    /// 列出全部机床（按 id 升序）
    pub fn list_machines(&self) -> ApiResult<Vec<Machine>> {
        Ok(self.reference_repo.list_machines()?)
    }
}
