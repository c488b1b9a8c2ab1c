// ==========================================
// 制造成本估算系统 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod cost;
pub mod reference;
pub mod types;

// 重导出核心类型
pub use cost::{
    CalculationStep, CalculationSteps, CostBreakdown, CostRequest, Dimensions, DutyBasis,
    DutyClassification, MachineDetails, PartGeometry, StepInputs, UnitCostBreakdown,
};
pub use reference::{
    Duty, Machine, Material, MhrConfigRow, MhrRecord, MhrRow, NewMhrRecord, OperationType,
};
pub use types::{normalize_name, DutyCategory, MachineCategory, MaterialKind, OperationKind, Shape};
