// ==========================================
// 制造成本估算系统 - 引擎层
// ==========================================
// 职责: 负荷判定 / 机床与费率解析 / 成本核算
// 红线: Engine 不拼 SQL，参考数据只经 ReferenceDataReader 读取
// ==========================================

pub mod calculator;
pub mod classifier;
pub mod error;
pub mod orchestrator;
pub mod resolver;

// 重导出核心引擎
pub use calculator::CostCalculator;
pub use classifier::{round_to, DutyClassifier, PI_APPROX};
pub use error::{EstimationError, EstimationResult};
pub use orchestrator::{CostEstimate, CostEstimationEngine, QuickEstimate};
pub use resolver::{
    determine_machine_category, pick_best_candidate, score_machine_match, select_machine,
    MachineResolver, MhrLookupIds, MhrLookupTier, MhrResolution,
};
