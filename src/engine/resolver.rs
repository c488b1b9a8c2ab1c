// ==========================================
// 制造成本估算系统 - 机床与费率解析引擎
// ==========================================
// 职责:
// 1) 由机床名称推断机床类别
// 2) 按工序/负荷/材料推荐机床
// 3) 两级查找机时费率 (MHR): 精确 ID → 名称打分兜底
// 4) 按机床类别计算工资率
// 红线: 两级均未命中必须报 MhrNotConfigured，不允许默认费率
// ==========================================

use crate::config::settings::EstimationSettings;
use crate::domain::reference::MhrRow;
use crate::domain::types::{normalize_name, DutyCategory, MachineCategory};
use crate::engine::error::{EstimationError, EstimationResult};
use crate::repository::error::RepositoryResult;
use crate::repository::reference_data_repo::ReferenceDataReader;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

// ==========================================
// 机床类别推断
// ==========================================

/// 由机床名称推断机床类别
///
/// 规则（不区分大小写）:
/// 1) 含 "cnc"/"precision" → 再含 "5"/"five" 为 cnc_5axis，否则 cnc_3axis
/// 2) 含 "spm"/"special" → spm
/// 3) 其他 → conventional
pub fn determine_machine_category(machine_name: &str) -> MachineCategory {
    let name = machine_name.to_lowercase();

    if name.contains("cnc") || name.contains("precision") {
        // "5 axis" / "5-axis" 均已被 "5" 覆盖
        if name.contains('5') || name.contains("five") {
            MachineCategory::Cnc5Axis
        } else {
            MachineCategory::Cnc3Axis
        }
    } else if name.contains("spm") || name.contains("special") {
        MachineCategory::Spm
    } else {
        MachineCategory::Conventional
    }
}

// ==========================================
// 机床推荐
// ==========================================

/// 推荐机床，返回 (机床名称, 机床类别)
///
/// 未指定类别时: heavy 或 titanium → cnc_5axis；medium → cnc_3axis；其他 → conventional
pub fn select_machine(
    operation: &str,
    duty: DutyCategory,
    material: &str,
    category: Option<MachineCategory>,
) -> (String, MachineCategory) {
    let category = category.unwrap_or_else(|| {
        if duty == DutyCategory::Heavy || material.trim().eq_ignore_ascii_case("titanium") {
            MachineCategory::Cnc5Axis
        } else if duty == DutyCategory::Medium {
            MachineCategory::Cnc3Axis
        } else {
            MachineCategory::Conventional
        }
    });

    let name = canonical_machine_name(operation, category)
        .map(str::to_string)
        .unwrap_or_else(|| format!("{} Machine", category.as_str().to_uppercase()));

    (name, category)
}

/// 工序 × 类别 → 标准机床名称
fn canonical_machine_name(operation: &str, category: MachineCategory) -> Option<&'static str> {
    use MachineCategory::*;
    let name = match (operation, category) {
        ("turning", Conventional) => "Conventional Lathe",
        ("turning", Cnc3Axis) => "CNC Lathe - 3 Axis",
        ("turning", Cnc5Axis) => "CNC Lathe - 5 Axis",
        ("turning", Spm) => "Special Purpose Lathe",

        ("milling", Conventional) => "Conventional Milling Machine",
        ("milling", Cnc3Axis) => "CNC Milling - 3 Axis",
        ("milling", Cnc5Axis) => "CNC Milling - 5 Axis",
        ("milling", Spm) => "Special Purpose Mill",

        ("drilling", Conventional) => "Conventional Drill Press",
        ("drilling", Cnc3Axis) => "CNC Drilling Machine",
        ("drilling", Cnc5Axis) => "CNC Multi-Axis Drill",
        ("drilling", Spm) => "Special Purpose Drill",

        ("grinding", Conventional) => "Conventional Grinder",
        ("grinding", Cnc3Axis) => "CNC Grinder",
        ("grinding", Cnc5Axis) => "CNC Precision Grinder",
        ("grinding", Spm) => "Special Purpose Grinder",

        ("boring", Conventional) => "Conventional Boring Machine",
        ("boring", Cnc3Axis) => "CNC Boring Machine",
        ("boring", Cnc5Axis) => "CNC Horizontal Boring",
        ("boring", Spm) => "Special Purpose Boring",

        _ => return None,
    };
    Some(name)
}

// ==========================================
// 费率查找结果
// ==========================================

/// 已知的参考数据 ID（调用方可直接给出，缺失的按名称解析）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MhrLookupIds {
    pub machine_id: Option<i64>,
    pub op_type_id: Option<i64>,
    pub duty_id: Option<i64>,
}

/// 命中的查找层级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "tier", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MhrLookupTier {
    /// (工序ID, 负荷ID, 机床ID) 精确命中
    ExactIds,
    /// 名称打分兜底（2=完全一致, 1=包含, 0=仅工序+负荷一致）
    FuzzyName { score: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MhrResolution {
    pub rate: f64,
    pub mhr_id: i64,
    pub lookup: MhrLookupTier,
}

/// 机床名称匹配得分: 2=归一化后相等, 1=互相包含, 0=不匹配
pub fn score_machine_match(candidate: &str, requested: &str) -> u8 {
    if candidate == requested {
        2
    } else if !candidate.is_empty()
        && !requested.is_empty()
        && (requested.contains(candidate) || candidate.contains(requested))
    {
        1
    } else {
        0
    }
}

/// 在候选配置中挑选最佳行
///
/// - 仅考虑归一化工序名、负荷名均一致的行
/// - 得分严格更高才替换（平分保留先出现者）
/// - 得分为 2 时提前结束
pub fn pick_best_candidate<'a>(
    rows: &'a [MhrRow],
    operation: &str,
    duty: &str,
    machine_name: &str,
) -> Option<(&'a MhrRow, u8)> {
    let op_norm = normalize_name(operation);
    let duty_norm = normalize_name(duty);
    let machine_norm = normalize_name(machine_name);

    let mut best: Option<(&MhrRow, u8)> = None;
    for row in rows {
        let row_op = normalize_name(row.operation_name.as_deref().unwrap_or(""));
        let row_duty = normalize_name(row.duty_name.as_deref().unwrap_or(""));
        if row_op != op_norm || row_duty != duty_norm {
            continue;
        }

        let row_machine = normalize_name(row.machine_name.as_deref().unwrap_or(""));
        let score = score_machine_match(&row_machine, &machine_norm);

        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((row, score));
        }
        if score == 2 {
            break;
        }
    }
    best
}

// ==========================================
// MachineResolver - 机床与费率解析引擎
// ==========================================
pub struct MachineResolver {
    reader: Arc<dyn ReferenceDataReader>,
    settings: Arc<EstimationSettings>,
}

impl MachineResolver {
    pub fn new(reader: Arc<dyn ReferenceDataReader>, settings: Arc<EstimationSettings>) -> Self {
        Self { reader, settings }
    }

    // ==========================================
    // 工资率
    // ==========================================

    /// 工资率 C = 月薪 / 每月工时
    ///
    /// 普通机床操作工与数控/专机操作工月薪不同
    pub fn get_wage_rate(&self, machine_name: &str) -> f64 {
        let monthly = match determine_machine_category(machine_name) {
            MachineCategory::Conventional => self.settings.conventional_operator_monthly_wage,
            _ => self.settings.cnc_operator_monthly_wage,
        };
        monthly / self.settings.wage_hours_per_month
    }

    // ==========================================
    // 机时费率
    // ==========================================

    /// 查找机时费率 B
    pub fn get_machine_hour_rate(
        &self,
        operation: &str,
        duty: &str,
        machine_name: &str,
        ids: MhrLookupIds,
    ) -> EstimationResult<f64> {
        Ok(self.resolve_machine_hour_rate(operation, duty, machine_name, ids)?.rate)
    }

    /// 查找机时费率（含命中层级）
    ///
    /// 顺序:
    /// 1) 精确 ID 查找
    /// 2) 名称打分兜底
    /// 3) 均未命中 → MhrNotConfigured
    ///
    /// 两级查找中的数据访问失败只记录告警，按"未命中"处理
    #[instrument(skip(self, ids))]
    pub fn resolve_machine_hour_rate(
        &self,
        operation: &str,
        duty: &str,
        machine_name: &str,
        ids: MhrLookupIds,
    ) -> EstimationResult<MhrResolution> {
        match self.lookup_by_ids(operation, duty, ids) {
            Ok(Some(resolution)) => {
                debug!(mhr_id = resolution.mhr_id, rate = resolution.rate, "MHR 精确命中");
                return Ok(resolution);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "MHR 精确查找失败，转名称匹配"),
        }

        match self.lookup_by_name_score(operation, duty, machine_name) {
            Ok(Some(resolution)) => {
                debug!(
                    mhr_id = resolution.mhr_id,
                    rate = resolution.rate,
                    lookup = ?resolution.lookup,
                    "MHR 名称匹配命中"
                );
                return Ok(resolution);
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "MHR 名称匹配查询失败"),
        }

        Err(EstimationError::MhrNotConfigured {
            operation: operation.to_string(),
            duty: duty.to_string(),
            machine: machine_name.to_string(),
        })
    }

    /// 第一级: 按 (工序ID, 负荷ID, 机床ID) 精确查找
    ///
    /// - 工序ID: 优先取 ids.op_type_id，否则按工序名（去空白、忽略大小写）解析
    /// - 负荷ID: 优先取 ids.duty_id，否则按归一化负荷名解析
    /// - 机床ID: 只取 ids.machine_id
    pub fn lookup_by_ids(
        &self,
        operation: &str,
        duty: &str,
        ids: MhrLookupIds,
    ) -> RepositoryResult<Option<MhrResolution>> {
        let op_id = match ids.op_type_id {
            Some(id) => Some(id),
            None if !operation.trim().is_empty() => self
                .reader
                .find_operation_type_by_name(operation)?
                .map(|op| op.id),
            None => None,
        };

        let duty_id = match ids.duty_id {
            Some(id) => Some(id),
            None => self.resolve_duty_id(duty),
        };

        let (op_id, duty_id, machine_id) = match (op_id, duty_id, ids.machine_id) {
            (Some(o), Some(d), Some(m)) => (o, d, m),
            _ => return Ok(None),
        };

        let record = self.reader.find_mhr(op_id, duty_id, machine_id)?;
        Ok(record.and_then(|rec| {
            rec.machine_hr_rate.map(|rate| MhrResolution {
                rate,
                mhr_id: rec.id,
                lookup: MhrLookupTier::ExactIds,
            })
        }))
    }

    /// 第二级: 同名工序下按负荷名一致 + 机床名打分挑选
    pub fn lookup_by_name_score(
        &self,
        operation: &str,
        duty: &str,
        machine_name: &str,
    ) -> RepositoryResult<Option<MhrResolution>> {
        if operation.trim().is_empty() {
            return Ok(None);
        }
        let candidates = self.reader.list_mhr_by_operation_name(operation)?;

        let resolution = pick_best_candidate(&candidates, operation, duty, machine_name).and_then(
            |(row, score)| {
                row.record.machine_hr_rate.map(|rate| MhrResolution {
                    rate,
                    mhr_id: row.record.id,
                    lookup: MhrLookupTier::FuzzyName { score },
                })
            },
        );
        Ok(resolution)
    }

    /// 按归一化名称解析负荷ID；查询失败视为未解析
    fn resolve_duty_id(&self, duty: &str) -> Option<i64> {
        let duty_norm = normalize_name(duty);
        if duty_norm.is_empty() {
            return None;
        }
        let duties = match self.reader.list_duties() {
            Ok(duties) => duties,
            Err(e) => {
                warn!(error = %e, "负荷字典查询失败");
                return None;
            }
        };
        duties
            .into_iter()
            .find(|d| normalize_name(&d.name) == duty_norm)
            .map(|d| d.id)
    }
}
