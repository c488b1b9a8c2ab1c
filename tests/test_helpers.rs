// ==========================================
// 测试辅助函数
// ==========================================
// 职责: 提供测试所需的数据库初始化、参考数据生成等功能
// ==========================================
#![allow(dead_code)]

use cost_estimation::domain::NewMhrRecord;
use cost_estimation::repository::ReferenceDataRepository;
use rusqlite::Connection;
use std::error::Error;
use tempfile::NamedTempFile;

/// 创建临时测试数据库并初始化 schema
///
/// # 返回
/// - NamedTempFile: 临时数据库文件（需要保持存活）
/// - String: 数据库文件路径
pub fn create_test_db() -> Result<(NamedTempFile, String), Box<dyn Error>> {
    let temp_file = NamedTempFile::new()?;
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let conn = cost_estimation::db::open_sqlite_connection(&db_path)?;
    cost_estimation::db::ensure_reference_schema(&conn)?;

    Ok((temp_file, db_path))
}

/// 打开测试数据库连接（统一 PRAGMA）
pub fn open_test_connection(db_path: &str) -> Result<Connection, Box<dyn Error>> {
    Ok(cost_estimation::db::open_sqlite_connection(db_path)?)
}

// ==========================================
// 标准参考数据
// ==========================================
// 工序: Turning(1) / Milling(2)
// 负荷: Light duty(1) / Medium duty(2) / Heavy duty(3)
// 机床:
//   1 CNC Lathe                      (Turning)
//   2 CNC Lathe - 3 Axis             (Turning)
//   3 Conventional Lathe             (Turning)
//   4 CNC Milling - 5 Axis           (Milling)
//   5 Conventional Milling Machine   (Milling)
//   6 CNC Lathe - 5 Axis             (Turning)
//   7 CNC Lathe - 3 Axis Mk2         (Turning, 无 MHR 配置)
// MHR:
//   turning/medium/CNC Lathe            450
//   turning/light/Conventional Lathe    250
//   turning/medium/CNC Lathe - 3 Axis   500
//   milling/heavy/CNC Milling - 5 Axis  900
//   milling/medium/CNC Milling - 5 Axis 800
//   turning/heavy/CNC Lathe - 5 Axis    NULL（费率缺失）
pub fn seed_standard_reference(db_path: &str) -> Result<(), Box<dyn Error>> {
    let repo = ReferenceDataRepository::new(db_path)?;

    let turning = repo.insert_operation_type("Turning")?;
    let milling = repo.insert_operation_type("Milling")?;

    let light = repo.insert_duty("Light duty")?;
    let medium = repo.insert_duty("Medium duty")?;
    let heavy = repo.insert_duty("Heavy duty")?;

    let cnc_lathe = repo.insert_machine("CNC Lathe", Some(turning))?;
    let cnc_lathe_3 = repo.insert_machine("CNC Lathe - 3 Axis", Some(turning))?;
    let conv_lathe = repo.insert_machine("Conventional Lathe", Some(turning))?;
    let cnc_mill_5 = repo.insert_machine("CNC Milling - 5 Axis", Some(milling))?;
    repo.insert_machine("Conventional Milling Machine", Some(milling))?;
    let cnc_lathe_5 = repo.insert_machine("CNC Lathe - 5 Axis", Some(turning))?;
    repo.insert_machine("CNC Lathe - 3 Axis Mk2", Some(turning))?;

    for (op, duty, machine, rate) in [
        (turning, medium, cnc_lathe, Some(450.0)),
        (turning, light, conv_lathe, Some(250.0)),
        (turning, medium, cnc_lathe_3, Some(500.0)),
        (milling, heavy, cnc_mill_5, Some(900.0)),
        (milling, medium, cnc_mill_5, Some(800.0)),
        (turning, heavy, cnc_lathe_5, None),
    ] {
        repo.insert_mhr(&NewMhrRecord {
            operation_type_id: op,
            duty_id: duty,
            machine_id: machine,
            machine_hr_rate: rate,
            ..Default::default()
        })?;
    }

    for material in ["aluminium", "steel", "titanium"] {
        repo.insert_material(material)?;
    }

    Ok(())
}

/// 写入 global 配置
pub fn insert_config(conn: &Connection, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
    conn.execute(
        "INSERT OR REPLACE INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)",
        [key, value],
    )?;
    Ok(())
}
