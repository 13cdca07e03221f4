//! Tripod 命令行入口
//!
//! 默认进入逐行 REPL（输入 exit 退出）；`--prompt` 执行单轮后退出；`--resume` 续跑线程中未完成的轮次。

use std::io::{BufRead, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tripod::{config::load_config, observability, AgentBuilder, AgentError, Orchestrator};

#[derive(Parser, Debug)]
#[command(name = "tripod", version, about = "Plan / work / evaluate task agent")]
struct Args {
    /// 额外的 TOML 配置文件
    #[arg(long)]
    config: Option<PathBuf>,

    /// 会话线程 ID（默认取 app.thread_id）
    #[arg(long)]
    thread: Option<String>,

    /// SQLite 检查点文件（默认取 app.db_path）
    #[arg(long)]
    db: Option<PathBuf>,

    /// 执行单轮后退出
    #[arg(long)]
    prompt: Option<String>,

    /// 续跑线程中未完成的轮次
    #[arg(long)]
    resume: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    observability::init();

    let args = Args::parse();
    let mut cfg = load_config(args.config.clone()).context("Failed to load config")?;
    if let Some(db) = args.db {
        cfg.app.db_path = db;
    }
    let thread_id = args.thread.unwrap_or_else(|| cfg.app.thread_id.clone());

    let orchestrator = AgentBuilder::new(cfg)
        .build()
        .context("Failed to build agent")?;

    if args.resume {
        report(orchestrator.resume(&thread_id).await)?;
    }
    if let Some(prompt) = args.prompt {
        report(orchestrator.invoke(&thread_id, &prompt).await)?;
        return Ok(());
    }
    if args.resume {
        return Ok(());
    }

    repl(&orchestrator, &thread_id).await
}

/// 打印一轮的结果；步数上限单独提示，其它错误作为失败返回
fn report(result: Result<String, AgentError>) -> anyhow::Result<()> {
    match result {
        Ok(answer) => {
            println!("{}", answer);
            Ok(())
        }
        Err(e) if e.is_recursion_limit() => {
            eprintln!("[stopped] {}", e);
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

async fn repl(orchestrator: &Orchestrator, thread_id: &str) -> anyhow::Result<()> {
    let stdin = std::io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;
        let line = match lines.next() {
            Some(line) => line?,
            None => break,
        };
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") {
            break;
        }
        if input.is_empty() {
            continue;
        }
        match orchestrator.invoke(thread_id, input).await {
            Ok(answer) => println!("Bot: {}", answer),
            Err(e) if e.is_recursion_limit() => println!("[stopped] {}", e),
            Err(e) => {
                tracing::error!(error = %e, "turn failed");
                println!("[error] {}", e);
            }
        }
    }
    Ok(())
}
