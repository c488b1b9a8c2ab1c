// ==========================================
// 制造成本估算系统 - 命令行入口
// ==========================================
// 用法:
//   cost-estimation calculate <request.json>
//   cost-estimation quick <operation> <duty> <quantity>
//   cost-estimation machines
//   cost-estimation import <mhr.csv>
//   cost-estimation config [set <key> <value>]
// 数据库: COST_ESTIMATION_DB_PATH 或用户数据目录
// ==========================================

use anyhow::{bail, Context};
use cost_estimation::api::{ApiError, ApiResult};
use cost_estimation::app::{get_default_db_path, AppState};
use cost_estimation::domain::CostRequest;
use serde::Serialize;

const USAGE: &str = "用法:
  cost-estimation calculate <request.json>
  cost-estimation quick <operation> <duty> <quantity>
  cost-estimation machines
  cost-estimation import <mhr.csv>
  cost-estimation config [set <key> <value>]";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    cost_estimation::logging::init();

    tracing::info!("{} v{}", cost_estimation::APP_NAME, cost_estimation::VERSION);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match args.first() {
        Some(c) => c.as_str(),
        None => bail!("{}", USAGE),
    };

    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);
    let state = AppState::new(db_path).await.map_err(anyhow::Error::msg)?;
    let api = &state.cost_estimation_api;

    match command {
        "calculate" => {
            let path = args.get(1).context("缺少请求文件路径")?;
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("无法读取请求文件: {}", path))?;
            let request: CostRequest =
                serde_json::from_str(&raw).with_context(|| format!("请求格式错误: {}", path))?;
            print_result(api.calculate(&request))
        }
        "quick" => {
            let (operation, duty, quantity) = match (args.get(1), args.get(2), args.get(3)) {
                (Some(o), Some(d), Some(q)) => (o, d, q),
                _ => bail!("{}", USAGE),
            };
            let quantity: u32 = quantity
                .parse()
                .with_context(|| format!("数量无效: {}", quantity))?;
            print_result(api.quick_estimate(operation, duty, quantity))
        }
        "machines" => print_result(api.list_machines()),
        "import" => {
            let path = args.get(1).context("缺少 MHR 配置文件路径")?;
            print_result(state.import_api.import_mhr_file(path))
        }
        "config" => match (args.get(1).map(String::as_str), args.get(2), args.get(3)) {
            (None, _, _) => print_result(state.config_api.get_config_overview()),
            (Some("set"), Some(key), Some(value)) => {
                print_result(state.config_api.update_config(key, value).map(|_| {
                    serde_json::json!({ "key": key, "value": value.trim() })
                }))
            }
            _ => bail!("{}", USAGE),
        },
        other => bail!("未知命令: {}\n{}", other, USAGE),
    }
}

/// 成功输出 JSON 到 stdout；业务错误输出错误响应到 stderr 并以非零码退出
fn print_result<T: Serialize>(result: ApiResult<T>) -> anyhow::Result<()> {
    match result {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
        Err(err) => {
            report_error(&err)?;
            std::process::exit(1);
        }
    }
}

fn report_error(err: &ApiError) -> anyhow::Result<()> {
    tracing::warn!(code = err.code(), "请求失败: {}", err);
    eprintln!("{}", serde_json::to_string_pretty(&err.to_response())?);
    Ok(())
}
