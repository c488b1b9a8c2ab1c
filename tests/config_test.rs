// ==========================================
// ConfigManager 集成测试
// ==========================================
// 测试目标: 验证估算参数读取功能的正确性
// ==========================================

mod test_helpers;

use cost_estimation::config::{
    config_keys, default_man_hours_matrix, ConfigManager, EstimationConfigReader,
    EstimationSettings,
};
use test_helpers::{create_test_db, insert_config, open_test_connection};

#[tokio::test]
async fn test_config_manager_creation() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");

    let config_manager = ConfigManager::new(&db_path);
    assert!(
        config_manager.is_ok(),
        "ConfigManager should be created successfully"
    );
}

#[tokio::test]
async fn test_defaults_without_config_rows() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    assert_eq!(
        config_manager.get_conventional_operator_monthly_wage().await.unwrap(),
        15000.0
    );
    assert_eq!(config_manager.get_cnc_operator_monthly_wage().await.unwrap(), 20000.0);
    assert_eq!(config_manager.get_wage_hours_per_month().await.unwrap(), 200.0);
    assert_eq!(config_manager.get_default_man_hours().await.unwrap(), 0.5);
    assert_eq!(
        config_manager.load_settings().await.unwrap(),
        EstimationSettings::default()
    );
}

#[tokio::test]
async fn test_values_from_config_kv() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::CONVENTIONAL_OPERATOR_MONTHLY_WAGE, "18000").unwrap();
    insert_config(&conn, config_keys::WAGE_HOURS_PER_MONTH, " 180 ").unwrap();
    insert_config(
        &conn,
        config_keys::MAN_HOURS_MATRIX,
        r#"{"turning": {"light": 0.3, "medium": 0.6, "heavy": 1.1}}"#,
    )
    .unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    let settings = config_manager.load_settings().await.unwrap();

    assert_eq!(settings.conventional_operator_monthly_wage, 18000.0);
    assert_eq!(settings.wage_hours_per_month, 180.0);
    assert_eq!(settings.man_hours_matrix.len(), 1);
    assert_eq!(settings.man_hours_matrix["turning"]["heavy"], 1.1);
}

#[tokio::test]
async fn test_malformed_matrix_falls_back() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let conn = open_test_connection(&db_path).expect("Failed to open db");
    insert_config(&conn, config_keys::MAN_HOURS_MATRIX, r#"["turning"]"#).unwrap();

    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");
    assert_eq!(
        config_manager.get_man_hours_matrix().await.unwrap(),
        default_man_hours_matrix()
    );
}

#[tokio::test]
async fn test_set_and_snapshot() {
    let (_temp_file, db_path) = create_test_db().expect("Failed to create test db");
    let config_manager = ConfigManager::new(&db_path).expect("Failed to create ConfigManager");

    config_manager
        .set_global_config_value(config_keys::CNC_OPERATOR_MONTHLY_WAGE, "22000")
        .unwrap();
    config_manager
        .set_man_hours_matrix(&default_man_hours_matrix())
        .unwrap();

    assert_eq!(config_manager.get_cnc_operator_monthly_wage().await.unwrap(), 22000.0);
    assert_eq!(
        config_manager.get_man_hours_matrix().await.unwrap(),
        default_man_hours_matrix()
    );

    let snapshot: serde_json::Value =
        serde_json::from_str(&config_manager.get_config_snapshot().unwrap()).unwrap();
    assert_eq!(snapshot[config_keys::CNC_OPERATOR_MONTHLY_WAGE], "22000");
    assert!(snapshot.get(config_keys::MAN_HOURS_MATRIX).is_some());
}
