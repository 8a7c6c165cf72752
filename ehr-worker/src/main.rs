//! EHR RPC工作进程主程序

use anyhow::{Context, Result};
use clap::Parser;
use ehr_admin::{init_logging, WorkerConfig};
use ehr_openehr::{Endpoints, HttpEhrClient, PatientService};
use ehr_rpc::{RpcDispatcher, RpcWorker};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info};

/// 工作进程命令行参数
#[derive(Parser, Debug)]
#[command(name = "ehr-worker")]
#[command(about = "RPC worker bridging a message queue to an openEHR REST backend")]
struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别，覆盖配置文件
    #[arg(short, long)]
    log_level: Option<String>,

    /// 打印生效配置（隐去口令）后退出
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let mut config = match WorkerConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("ehr-worker: {:#}", e);
            return ExitCode::FAILURE;
        }
    };
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }

    if args.print_config {
        return match config.to_toml_redacted() {
            Ok(rendered) => {
                println!("{}", rendered);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("ehr-worker: {:#}", e);
                ExitCode::FAILURE
            }
        };
    }

    // 初始化日志
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("ehr-worker: {:#}", e);
        return ExitCode::FAILURE;
    }
    match args.config.as_deref() {
        Some(path) => info!("Configuration loaded successfully from: {}", path),
        None => info!("Configuration loaded from defaults and environment"),
    }

    match run(config).await {
        Ok(()) => {
            info!("ehr-worker stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal error, terminating worker: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(config: WorkerConfig) -> Result<()> {
    info!("Starting ehr-worker...");
    info!("  Broker: {}", config.broker.redacted_url());
    info!("  Queue: {}", config.broker.queue);
    info!("  openEHR: {}", config.openehr.base_url);
    info!("  Failure policy: {:?}", config.rpc.failure_policy);

    let client = HttpEhrClient::new(&config.openehr).context("Failed to build HTTP client")?;
    let endpoints = Endpoints::new(&config.openehr.base_url, &config.openehr.subject_namespace)?;
    let service = PatientService::new(Arc::new(client), endpoints);
    let dispatcher = RpcDispatcher::new(service, config.rpc.failure_policy);

    let worker = RpcWorker::connect(config.broker)
        .await
        .context("Failed to connect to message queue")?;

    // 致命错误时不关闭连接、不确认当前消息，由代理重新投递
    worker.run(&dispatcher).await?;
    worker.close().await?;

    Ok(())
}
