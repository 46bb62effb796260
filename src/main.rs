// ==========================================
// 人力资源管理系统 - CLI 主入口
// ==========================================
// 技术栈: Rust + SQLite
// 用法:
//   hr-admin import <entity_type> <company_code> <file>
//   hr-admin validate <entity_type> <file>
//   hr-admin readiness <entity_type> <company_code>
//   hr-admin batches [limit]
// ==========================================

use hr_admin::app::{get_default_db_path, AppState};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // 初始化日志系统
    hr_admin::logging::init();

    tracing::info!("==================================================");
    tracing::info!("{} - 组织数据导入中心", hr_admin::APP_NAME);
    tracing::info!("系统版本: {}", hr_admin::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let state = match AppState::new(db_path) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("初始化失败: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let args: Vec<String> = std::env::args().skip(1).collect();
    match run_command(&state, &args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run_command(state: &AppState, args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let command = args.first().map(String::as_str);

    match command {
        Some("import") => {
            let [entity_type, company_code, file] = expect_args(args)?;
            let response = state
                .import_api
                .import_file(&file, &entity_type, &company_code)
                .await?;

            println!("批次 {} 状态: {}", response.batch_id, response.status);
            println!(
                "总行数 {} / 成功 {} / 失败 {} / 跳过 {}",
                response.total_rows, response.imported, response.failed, response.skipped
            );
            println!();
            println!("{}", response.report);
            Ok(())
        }
        Some("validate") => {
            let [entity_type, file] = expect_args(args)?;
            let text = std::fs::read_to_string(&file)?;
            let response = state.import_api.validate_text(&text, &entity_type).await?;
            println!("{}", response.report);
            Ok(())
        }
        Some("readiness") => {
            let [entity_type, company_code] = expect_args(args)?;
            let response = state
                .import_api
                .check_readiness(&entity_type, &company_code)
                .await?;

            if response.met {
                println!("{}: 可以导入", response.entity_type);
            } else {
                println!(
                    "{}: 需要先导入 {}",
                    response.entity_type,
                    response.missing.join(", ")
                );
            }
            if !response.optional_missing.is_empty() {
                println!("可选前置缺数据: {}", response.optional_missing.join(", "));
            }
            println!("导入顺序建议:");
            for (level, tier) in response.tiers.iter().enumerate() {
                println!("  {}. {}", level + 1, tier.join(", "));
            }
            Ok(())
        }
        Some("batches") => {
            let limit = args
                .get(1)
                .and_then(|v| v.parse::<usize>().ok())
                .unwrap_or(10);
            let batches = state.import_api.list_recent_batches(limit).await?;

            for batch in batches {
                println!(
                    "{}  {}  {}  {}/{}/{}  回滚窗口内: {}",
                    batch.batch_id,
                    batch.entity_type,
                    batch.status,
                    batch.imported,
                    batch.failed,
                    batch.skipped,
                    if batch.rollback_eligible { "是" } else { "否" }
                );
            }
            Ok(())
        }
        _ => {
            println!("用法:");
            println!("  hr-admin import <entity_type> <company_code> <file>");
            println!("  hr-admin validate <entity_type> <file>");
            println!("  hr-admin readiness <entity_type> <company_code>");
            println!("  hr-admin batches [limit]");
            println!();
            println!("实体类型: companies / grades / departments / jobs / positions / employees");
            Ok(())
        }
    }
}

/// 取命令后的 N 个参数,不足时给出用法错误
fn expect_args<const N: usize>(args: &[String]) -> Result<[String; N], String> {
    if args.len() < N + 1 {
        return Err(format!("参数不足,需要 {} 个参数", N));
    }
    args[1..=N]
        .to_vec()
        .try_into()
        .map_err(|_| "参数解析失败".to_string())
}
