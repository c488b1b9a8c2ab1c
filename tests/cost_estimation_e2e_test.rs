// ==========================================
// 成本估算端到端测试
// ==========================================
// 测试目标: AppState → CostEstimationApi → 引擎 → SQLite 全链路
// ==========================================

mod test_helpers;

use cost_estimation::api::ApiError;
use cost_estimation::app::AppState;
use cost_estimation::config::config_keys;
use cost_estimation::domain::{CostRequest, Dimensions};
use cost_estimation::engine::MhrLookupTier;
use cost_estimation::{DutyCategory, MachineCategory, MaterialKind, OperationKind, Shape};
use std::io::Write;
use tempfile::NamedTempFile;
use test_helpers::{create_test_db, insert_config, open_test_connection, seed_standard_reference};

async fn seeded_state() -> (NamedTempFile, AppState) {
    cost_estimation::logging::init_test();
    let (temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_standard_reference(&db_path).expect("Failed to seed reference data");
    let state = AppState::new(db_path).await.expect("Failed to create AppState");
    (temp_file, state)
}

fn request(
    material: MaterialKind,
    operation: OperationKind,
    dimensions: Dimensions,
    machine: &str,
    man_hours: f64,
) -> CostRequest {
    CostRequest {
        material,
        operation_type: operation,
        dimensions,
        machine_name: machine.to_string(),
        man_hours_per_unit: man_hours,
        duty_category: None,
    }
}

// ==========================================
// 单件估算
// ==========================================

#[tokio::test]
async fn test_calculate_round_part_exact_lookup() {
    let (_temp, state) = seeded_state().await;

    // 50×200 回转体 → light；steel 抬到 medium
    let req = request(
        MaterialKind::Steel,
        OperationKind::Turning,
        Dimensions::round(50.0, 200.0),
        "CNC Lathe - 3 Axis",
        0.5,
    );
    let resp = state.cost_estimation_api.calculate(&req).unwrap();

    assert_eq!(resp.duty_category, DutyCategory::Medium);
    assert!(!resp.duty_overridden);
    let classification = resp.duty_classification.as_ref().unwrap();
    assert_eq!(classification.base_duty, DutyCategory::Light);
    assert_eq!(classification.factors.len(), 1);

    assert_eq!(resp.selected_machine.id, 2);
    assert_eq!(resp.selected_machine.operation_type_id, Some(1));
    assert_eq!(resp.machine_category, MachineCategory::Cnc3Axis);
    assert_eq!(resp.shape, Shape::Round);
    assert_eq!(resp.volume, 392698.75);
    assert_eq!(resp.mhr_lookup, MhrLookupTier::ExactIds);

    // A=0.5 B=500 C=100
    let b = &resp.cost_breakdown;
    assert_eq!(b.machine_hour_rate, 500.0);
    assert_eq!(b.wage_rate, 100.0);
    assert_eq!(b.basic_cost_per_unit, 300.0);
    assert_eq!(b.overheads_per_unit, 100.0);
    assert_eq!(b.profit_per_unit, 40.0);
    assert_eq!(b.packing_forwarding_per_unit, 6.0);
    assert_eq!(b.unit_cost, 446.0);
    assert_eq!(b.outsourcing_mhr, 700.0);

    assert_eq!(resp.calculation_steps.step_6_unit_cost.result, 446.0);
    assert!(!resp.estimate_id.is_empty());
}

#[tokio::test]
async fn test_calculate_rectangular_part() {
    let (_temp, state) = seeded_state().await;

    // 100×50×30 箱体 → light；steel 抬到 medium
    let req = request(
        MaterialKind::Steel,
        OperationKind::Milling,
        Dimensions::rectangular(100.0, 50.0, 30.0),
        "CNC Milling - 5 Axis",
        1.0,
    );
    let resp = state.cost_estimation_api.calculate(&req).unwrap();

    assert_eq!(resp.shape, Shape::Rectangular);
    assert_eq!(resp.volume, 150000.0);
    assert_eq!(resp.duty_category, DutyCategory::Medium);
    assert_eq!(resp.machine_category, MachineCategory::Cnc5Axis);

    // A=1 B=800 C=100
    assert_eq!(resp.cost_breakdown.basic_cost_per_unit, 900.0);
    assert_eq!(resp.cost_breakdown.profit_per_unit, 100.0);
    assert_eq!(resp.cost_breakdown.packing_forwarding_per_unit, 18.0);
    assert_eq!(resp.cost_breakdown.unit_cost, 1118.0);
    assert_eq!(resp.cost_breakdown.outsourcing_mhr, 1000.0);
}

#[tokio::test]
async fn test_calculate_with_duty_override_and_fuzzy_fallback() {
    let (_temp, state) = seeded_state().await;

    // Mk2 无配置行；同工序 medium 下 "CNC Lathe" 与 "CNC Lathe - 3 Axis" 均包含匹配，平分取先出现者
    let mut req = request(
        MaterialKind::Aluminium,
        OperationKind::Turning,
        Dimensions::round(50.0, 200.0),
        "CNC Lathe - 3 Axis Mk2",
        0.5,
    );
    req.duty_category = Some(DutyCategory::Medium);

    let resp = state.cost_estimation_api.calculate(&req).unwrap();
    assert!(resp.duty_overridden);
    assert!(resp.duty_classification.is_none());
    assert_eq!(resp.mhr_lookup, MhrLookupTier::FuzzyName { score: 1 });
    assert_eq!(resp.cost_breakdown.machine_hour_rate, 450.0);
}

#[tokio::test]
async fn test_calculate_unknown_machine() {
    let (_temp, state) = seeded_state().await;

    let req = request(
        MaterialKind::Steel,
        OperationKind::Turning,
        Dimensions::round(50.0, 200.0),
        "Nonexistent Machine",
        0.5,
    );
    let err = state.cost_estimation_api.calculate(&req).unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert_eq!(err.http_status(), 404);
}

#[tokio::test]
async fn test_calculate_invalid_dimensions() {
    let (_temp, state) = seeded_state().await;

    let dims = Dimensions {
        length: Some(100.0),
        ..Default::default()
    };
    let req = request(MaterialKind::Steel, OperationKind::Milling, dims, "CNC Lathe", 0.5);
    let err = state.cost_estimation_api.calculate(&req).unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_calculate_mhr_not_configured() {
    let (_temp, state) = seeded_state().await;

    // titanium → heavy；heavy 行存在但费率为空，不允许回退到其他行
    let req = request(
        MaterialKind::Titanium,
        OperationKind::Turning,
        Dimensions::round(50.0, 200.0),
        "CNC Lathe - 5 Axis",
        0.5,
    );
    let err = state.cost_estimation_api.calculate(&req).unwrap_err();
    assert_eq!(err.code(), "MHR_NOT_CONFIGURED");
    assert_eq!(err.http_status(), 400);
}

#[tokio::test]
async fn test_response_json_shape() {
    let (_temp, state) = seeded_state().await;

    let req = request(
        MaterialKind::Steel,
        OperationKind::Turning,
        Dimensions::round(50.0, 200.0),
        "CNC Lathe - 3 Axis",
        0.5,
    );
    let resp = state.cost_estimation_api.calculate(&req).unwrap();
    let json = serde_json::to_value(&resp).unwrap();

    assert_eq!(json["duty_category"], "medium");
    assert_eq!(json["machine_category"], "cnc_3axis");
    assert_eq!(json["shape"], "round");
    assert!(json["cost_breakdown"].get("total_cost").is_none());
    assert_eq!(json["calculation_steps"]["step_1_inputs"]["A_man_hours"], 0.5);
    assert_eq!(json["dimensions"]["diameter"], 50.0);
    assert!(json["dimensions"].get("breadth").is_none());
}

#[tokio::test]
async fn test_request_deserialization() {
    let raw = r#"{
        "material": "steel",
        "operation_type": "heat_treatment",
        "dimensions": {"length": 100, "breadth": 50, "height": 30},
        "machine_name": "CNC Lathe",
        "man_hours_per_unit": 0.75
    }"#;
    let req: CostRequest = serde_json::from_str(raw).unwrap();
    assert_eq!(req.operation_type, OperationKind::HeatTreatment);
    assert_eq!(req.duty_category, None);
    assert_eq!(req.dimensions.height, Some(30.0));
}

// ==========================================
// 快速报价
// ==========================================

#[tokio::test]
async fn test_quick_estimate() {
    let (_temp, state) = seeded_state().await;

    // turning + medium + steel → CNC Lathe - 3 Axis；工时矩阵 0.5
    let resp = state
        .cost_estimation_api
        .quick_estimate("turning", "medium", 10)
        .unwrap();
    assert_eq!(resp.machine, "CNC Lathe - 3 Axis");
    assert_eq!(resp.machine_category, MachineCategory::Cnc3Axis);
    assert_eq!(resp.duty, DutyCategory::Medium);
    assert_eq!(resp.quantity, 10);
    assert_eq!(resp.unit_cost, 446.0);
    assert_eq!(resp.total_cost, 4460.0);
    assert_eq!(resp.details.man_hours_per_unit, 0.5);

    // 负荷同义写法
    let synonym = state
        .cost_estimation_api
        .quick_estimate("Turning", "Medium duty", 1)
        .unwrap();
    assert_eq!(synonym.unit_cost, 446.0);
}

#[tokio::test]
async fn test_quick_estimate_errors() {
    let (_temp, state) = seeded_state().await;
    let api = &state.cost_estimation_api;

    let err = api.quick_estimate("turning", "extreme", 1).unwrap_err();
    assert_eq!(err.code(), "INVALID_INPUT");

    // Conventional Milling Machine 存在，但 milling/light 无配置
    let err = api.quick_estimate("milling", "light", 1).unwrap_err();
    assert_eq!(err.code(), "MHR_NOT_CONFIGURED");

    // Conventional Grinder 不在机床表
    let err = api.quick_estimate("grinding", "light", 1).unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");
}

// ==========================================
// 机床列表 / 配置
// ==========================================

#[tokio::test]
async fn test_list_machines() {
    let (_temp, state) = seeded_state().await;

    let machines = state.cost_estimation_api.list_machines().unwrap();
    assert_eq!(machines.len(), 7);
    assert_eq!(machines[0].name, "CNC Lathe");
    assert_eq!(machines[6].name, "CNC Lathe - 3 Axis Mk2");
}

#[tokio::test]
async fn test_configured_wage_applies() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_standard_reference(&db_path).expect("Failed to seed reference data");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::CNC_OPERATOR_MONTHLY_WAGE, "30000").unwrap();
    drop(conn);

    let state = AppState::new(db_path).await.unwrap();
    let resp = state
        .cost_estimation_api
        .quick_estimate("turning", "medium", 1)
        .unwrap();

    // C = 30000 / 200 = 150
    assert_eq!(resp.details.wage_rate, 150.0);
    assert_eq!(resp.details.outsourcing_mhr, 800.0);
}

#[tokio::test]
async fn test_import_then_estimate_on_fresh_db() {
    cost_estimation::logging::init_test();
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let state = AppState::new(db_path).await.unwrap();

    let mut csv_file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    writeln!(csv_file, "operation,duty,machine,machine_hr_rate").unwrap();
    writeln!(csv_file, "turning,Medium duty,CNC Lathe - 3 Axis,500").unwrap();
    csv_file.flush().unwrap();

    let path = csv_file.path().to_string_lossy().to_string();
    let resp = state.import_api.import_mhr_file(&path).unwrap();
    assert_eq!(resp.summary.mhr_inserted, 1);
    assert_eq!(resp.summary.machines_created, 1);
    assert_eq!(resp.source_file, path);

    let json = serde_json::to_value(&resp).unwrap();
    assert_eq!(json["mhr_inserted"], 1);

    let quick = state
        .cost_estimation_api
        .quick_estimate("turning", "medium", 1)
        .unwrap();
    assert_eq!(quick.unit_cost, 446.0);

    let err = state.import_api.import_mhr_file("/nonexistent/mhr.csv").unwrap_err();
    assert_eq!(err.code(), "IMPORT_ERROR");
}

#[tokio::test]
async fn test_config_update_applies_on_next_start() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    seed_standard_reference(&db_path).expect("Failed to seed reference data");

    let state = AppState::new(db_path.clone()).await.unwrap();
    state
        .config_api
        .update_config(config_keys::CNC_OPERATOR_MONTHLY_WAGE, "30000")
        .unwrap();
    let before = state
        .cost_estimation_api
        .quick_estimate("turning", "medium", 1)
        .unwrap();
    assert_eq!(before.details.wage_rate, 100.0);
    drop(state);

    let restarted = AppState::new(db_path).await.unwrap();
    let overview = restarted.config_api.get_config_overview().unwrap();
    assert_eq!(overview.effective.cnc_operator_monthly_wage, 30000.0);
    let after = restarted
        .cost_estimation_api
        .quick_estimate("turning", "medium", 1)
        .unwrap();
    assert_eq!(after.details.wage_rate, 150.0);
}
