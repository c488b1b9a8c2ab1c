// ==========================================
// 制造成本估算系统 - 参考数据仓储 (SQLite)
// ==========================================
// 职责: operation_type / machines / duties / materials / mhr 读写
// 说明: 写方法仅供初始化与导入使用，估算流程只走 ReferenceDataReader
// ==========================================

use crate::db::{ensure_reference_schema, open_sqlite_connection};
use crate::domain::reference::{
    Duty, Machine, Material, MhrConfigRow, MhrRecord, MhrRow, NewMhrRecord, OperationType,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::reference_data_repo::ReferenceDataReader;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// MHR 配置导入结果
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MhrImportSummary {
    pub operation_types_created: usize,
    pub duties_created: usize,
    pub machines_created: usize,
    pub mhr_inserted: usize,
    pub mhr_updated: usize,
}

pub struct ReferenceDataRepository {
    conn: Arc<Mutex<Connection>>,
}

const MHR_COLUMNS: &str = "m.id, m.op_type_id, m.duty_id, m.machine_id, m.investment_cost, \
     m.elect_power_rating, m.elect_power_charges, m.available_hrs_per_annum, \
     m.utilization_hrs_year, m.machine_hr_rate";

impl ReferenceDataRepository {
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        let repo = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        repo.ensure_table()?;
        Ok(repo)
    }

    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> RepositoryResult<Self> {
        let repo = Self { conn };
        repo.ensure_table()?;
        Ok(repo)
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 确保表存在（如果不存在则创建）
    fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        ensure_reference_schema(&conn)?;
        Ok(())
    }

    // ==========================================
    // 行映射
    // ==========================================

    fn map_mhr_record(row: &Row<'_>) -> rusqlite::Result<MhrRecord> {
        Ok(MhrRecord {
            id: row.get(0)?,
            operation_type_id: row.get(1)?,
            duty_id: row.get(2)?,
            machine_id: row.get(3)?,
            investment_cost: row.get(4)?,
            elect_power_rating: row.get(5)?,
            elect_power_charges: row.get(6)?,
            available_hrs_per_annum: row.get(7)?,
            utilization_hrs_year: row.get(8)?,
            machine_hr_rate: row.get(9)?,
        })
    }

    // ==========================================
    // 列表查询
    // ==========================================

    pub fn list_machines(&self) -> RepositoryResult<Vec<Machine>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, op_id FROM machines ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Machine {
                id: row.get(0)?,
                name: row.get(1)?,
                operation_type_id: row.get(2)?,
            })
        })?;
        let list = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }

    pub fn list_operation_types(&self) -> RepositoryResult<Vec<OperationType>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, operation_name FROM operation_type ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(OperationType {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let list = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }

    pub fn list_materials(&self) -> RepositoryResult<Vec<Material>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM materials ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Material {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let list = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }

    // ==========================================
    // 写入（初始化/导入）
    // ==========================================

    pub fn insert_operation_type(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO operation_type (operation_name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_duty(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO duties (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_material(&self, name: &str) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute("INSERT INTO materials (name) VALUES (?1)", params![name])?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_machine(&self, name: &str, op_type_id: Option<i64>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO machines (name, op_id) VALUES (?1, ?2)",
            params![name, op_type_id],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_mhr(&self, record: &NewMhrRecord) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        Self::insert_mhr_tx(&conn, record)?;
        Ok(conn.last_insert_rowid())
    }

    fn insert_mhr_tx(conn: &Connection, record: &NewMhrRecord) -> rusqlite::Result<usize> {
        conn.execute(
            r#"
            INSERT INTO mhr (
                op_type_id, duty_id, machine_id,
                investment_cost, elect_power_rating, elect_power_charges,
                available_hrs_per_annum, utilization_hrs_year, machine_hr_rate
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                record.operation_type_id,
                record.duty_id,
                record.machine_id,
                record.investment_cost,
                record.elect_power_rating,
                record.elect_power_charges,
                record.available_hrs_per_annum,
                record.utilization_hrs_year,
                record.machine_hr_rate,
            ],
        )
    }

    /// 批量导入 MHR 配置（事务化）
    ///
    /// # 说明
    /// - 工序/负荷按名称复用（去首尾空白、不区分大小写），机床按名称精确复用；不存在则新建
    /// - 新建机床挂在本行工序下
    /// - 同一 (工序, 负荷, 机床) 已有配置时覆盖第一条，保持查询确定性
    pub fn import_mhr_rows(&self, rows: &[MhrConfigRow]) -> RepositoryResult<MhrImportSummary> {
        let conn = self.get_conn()?;
        let tx = conn.unchecked_transaction()?;
        let mut summary = MhrImportSummary::default();

        for row in rows {
            let (op_id, created) = Self::find_or_create_tx(
                &tx,
                "SELECT id FROM operation_type WHERE lower(trim(operation_name)) = lower(trim(?1)) ORDER BY id LIMIT 1",
                "INSERT INTO operation_type (operation_name) VALUES (?1)",
                &row.operation,
            )?;
            if created {
                summary.operation_types_created += 1;
            }

            let (duty_id, created) = Self::find_or_create_tx(
                &tx,
                "SELECT id FROM duties WHERE lower(trim(name)) = lower(trim(?1)) ORDER BY id LIMIT 1",
                "INSERT INTO duties (name) VALUES (?1)",
                &row.duty,
            )?;
            if created {
                summary.duties_created += 1;
            }

            let machine_id: Option<i64> = tx
                .query_row(
                    "SELECT id FROM machines WHERE name = ?1 ORDER BY id LIMIT 1",
                    params![row.machine],
                    |r| r.get(0),
                )
                .optional()?;
            let machine_id = match machine_id {
                Some(id) => id,
                None => {
                    tx.execute(
                        "INSERT INTO machines (name, op_id) VALUES (?1, ?2)",
                        params![row.machine, op_id],
                    )?;
                    summary.machines_created += 1;
                    tx.last_insert_rowid()
                }
            };

            let record = NewMhrRecord {
                operation_type_id: op_id,
                duty_id,
                machine_id,
                investment_cost: row.investment_cost.clone(),
                elect_power_rating: row.elect_power_rating.clone(),
                elect_power_charges: row.elect_power_charges.clone(),
                available_hrs_per_annum: row.available_hrs_per_annum.clone(),
                utilization_hrs_year: row.utilization_hrs_year.clone(),
                machine_hr_rate: row.machine_hr_rate,
            };

            let existing: Option<i64> = tx
                .query_row(
                    "SELECT id FROM mhr WHERE op_type_id = ?1 AND duty_id = ?2 AND machine_id = ?3 ORDER BY id LIMIT 1",
                    params![op_id, duty_id, machine_id],
                    |r| r.get(0),
                )
                .optional()?;

            match existing {
                Some(mhr_id) => {
                    tx.execute(
                        r#"
                        UPDATE mhr SET
                            investment_cost = ?2,
                            elect_power_rating = ?3,
                            elect_power_charges = ?4,
                            available_hrs_per_annum = ?5,
                            utilization_hrs_year = ?6,
                            machine_hr_rate = ?7
                        WHERE id = ?1
                        "#,
                        params![
                            mhr_id,
                            record.investment_cost,
                            record.elect_power_rating,
                            record.elect_power_charges,
                            record.available_hrs_per_annum,
                            record.utilization_hrs_year,
                            record.machine_hr_rate,
                        ],
                    )?;
                    summary.mhr_updated += 1;
                }
                None => {
                    Self::insert_mhr_tx(&tx, &record)?;
                    summary.mhr_inserted += 1;
                }
            }
        }

        tx.commit()?;
        Ok(summary)
    }

    fn find_or_create_tx(
        conn: &Connection,
        select_sql: &str,
        insert_sql: &str,
        name: &str,
    ) -> rusqlite::Result<(i64, bool)> {
        let existing: Option<i64> = conn
            .query_row(select_sql, params![name], |r| r.get(0))
            .optional()?;
        match existing {
            Some(id) => Ok((id, false)),
            None => {
                conn.execute(insert_sql, params![name])?;
                Ok((conn.last_insert_rowid(), true))
            }
        }
    }
}

// ==========================================
// ReferenceDataReader 实现
// ==========================================
impl ReferenceDataReader for ReferenceDataRepository {
    fn find_machine_by_name(&self, name: &str) -> RepositoryResult<Option<Machine>> {
        let conn = self.get_conn()?;
        let machine = conn
            .query_row(
                "SELECT id, name, op_id FROM machines WHERE name = ?1 ORDER BY id LIMIT 1",
                params![name],
                |row| {
                    Ok(Machine {
                        id: row.get(0)?,
                        name: row.get(1)?,
                        operation_type_id: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(machine)
    }

    fn list_duties(&self) -> RepositoryResult<Vec<Duty>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare("SELECT id, name FROM duties ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(Duty {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        let list = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }

    fn find_operation_type_by_name(&self, name: &str) -> RepositoryResult<Option<OperationType>> {
        let conn = self.get_conn()?;
        let op = conn
            .query_row(
                r#"
                SELECT id, operation_name FROM operation_type
                WHERE lower(trim(operation_name)) = ?1
                ORDER BY id LIMIT 1
                "#,
                params![name.trim().to_lowercase()],
                |row| {
                    Ok(OperationType {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(op)
    }

    fn find_mhr(
        &self,
        op_type_id: i64,
        duty_id: i64,
        machine_id: i64,
    ) -> RepositoryResult<Option<MhrRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM mhr m WHERE m.op_type_id = ?1 AND m.duty_id = ?2 AND m.machine_id = ?3 ORDER BY m.id LIMIT 1",
            MHR_COLUMNS
        );
        let record = conn
            .query_row(&sql, params![op_type_id, duty_id, machine_id], Self::map_mhr_record)
            .optional()?;
        Ok(record)
    }

    fn list_mhr_by_operation_name(&self, operation: &str) -> RepositoryResult<Vec<MhrRow>> {
        let conn = self.get_conn()?;
        let sql = format!(
            r#"
            SELECT {}, o.operation_name, d.name, mc.name
            FROM mhr m
            JOIN operation_type o ON m.op_type_id = o.id
            JOIN duties d ON m.duty_id = d.id
            JOIN machines mc ON m.machine_id = mc.id
            WHERE lower(trim(o.operation_name)) = ?1
            ORDER BY m.id
            "#,
            MHR_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params![operation.trim().to_lowercase()], |row| {
            Ok(MhrRow {
                record: Self::map_mhr_record(row)?,
                operation_name: row.get(10)?,
                duty_name: row.get(11)?,
                machine_name: row.get(12)?,
            })
        })?;
        let list = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(list)
    }
}
