// ==========================================
// 制造成本估算系统 - 参考数据初始化
// ==========================================
// 用法: seed_reference_data [db_path] [mhr.csv]
// - db_path 缺省取 COST_ESTIMATION_DB_PATH / 用户数据目录
// - mhr.csv 缺省使用内置数据 data/mhr_seed.csv
// 可重复执行: 已有 (工序, 负荷, 机床) 配置会被覆盖而非重复插入
// ==========================================

use std::error::Error;
use std::path::Path;
use std::sync::Arc;

use cost_estimation::app::get_default_db_path;
use cost_estimation::domain::MaterialKind;
use cost_estimation::importer::{parse_mhr_rows, MhrCsvImporter};
use cost_estimation::repository::ReferenceDataRepository;

const BUNDLED_MHR_CSV: &str = include_str!("../../data/mhr_seed.csv");

fn main() -> Result<(), Box<dyn Error>> {
    cost_estimation::logging::init();

    let db_path = std::env::args().nth(1).unwrap_or_else(get_default_db_path);
    let csv_path = std::env::args().nth(2);

    let repo = Arc::new(ReferenceDataRepository::new(&db_path)?);
    let importer = MhrCsvImporter::new(repo.clone());

    let summary = match csv_path.as_deref() {
        Some(path) => importer.import_file(Path::new(path))?,
        None => {
            let rows = parse_mhr_rows(BUNDLED_MHR_CSV.as_bytes())?;
            importer.import_rows(&rows)?
        }
    };

    // 材料字典
    let existing: Vec<String> = repo
        .list_materials()?
        .into_iter()
        .map(|m| m.name.to_lowercase())
        .collect();
    let mut materials_created = 0;
    for kind in [MaterialKind::Aluminium, MaterialKind::Steel, MaterialKind::Titanium] {
        if !existing.iter().any(|n| n == kind.as_str()) {
            repo.insert_material(kind.as_str())?;
            materials_created += 1;
        }
    }

    eprintln!("Seeded {}", db_path);
    eprintln!(
        "  operation_type +{}, duties +{}, machines +{}, materials +{}",
        summary.operation_types_created,
        summary.duties_created,
        summary.machines_created,
        materials_created
    );
    eprintln!(
        "  mhr inserted {}, updated {}",
        summary.mhr_inserted, summary.mhr_updated
    );
    eprintln!("  machines total {}", repo.list_machines()?.len());

    Ok(())
}
