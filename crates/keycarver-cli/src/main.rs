use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use keycarver_core::{carve, CarveError, CarveOptions};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::info;

/// 命令行入口（基于 clap）
#[derive(Parser, Debug)]
#[command(name = "keycarver", version, about = "从进程内存快照中雕刻 AES-256 密钥")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 扫描快照文件并打印候选密钥
    Scan {
        /// 快照文件路径（minidump 或原始转储）
        dump: PathBuf,

        /// JSON 报告输出路径（可选）
        #[arg(long)]
        output: Option<PathBuf>,

        /// 区域扫描线程数（"auto"=CPU 核心数；1=串行）
        #[arg(long, default_value = "auto")]
        threads: String,

        /// 熵阈值（bit），低于该值的窗口直接拒绝
        #[arg(long)]
        entropy_threshold: Option<f64>,

        /// 周期性验证要求的总命中次数（含首次）
        #[arg(long)]
        required_repeats: Option<usize>,

        /// 周期性验证的前瞻窗口（字节）
        #[arg(long)]
        lookahead: Option<usize>,

        /// 每个区域头部的最大扫描深度（字节）
        #[arg(long)]
        max_initial_scan: Option<usize>,
    },
}

fn main() -> Result<()> {
    // 初始化日志（支持通过 RUST_LOG 控制等级，例如 info、debug）
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Scan {
            dump,
            output,
            threads,
            entropy_threshold,
            required_repeats,
            lookahead,
            max_initial_scan,
        } => {
            let mut opts = CarveOptions::default();
            opts.threads = parse_threads(&threads);
            if let Some(v) = entropy_threshold {
                opts.aes_entropy_threshold = v;
            }
            if let Some(v) = required_repeats {
                opts.required_repeats = v;
            }
            if let Some(v) = lookahead {
                opts.lookahead = v;
            }
            if let Some(v) = max_initial_scan {
                opts.max_initial_scan_in_region = v;
            }

            info!(?dump, "starting carve");

            let report = match carve(&dump, &opts) {
                Ok(report) => report,
                Err(err @ CarveError::InputNotFound(_)) => {
                    // 输入缺失：提示用法后立即终止，不产生任何区域/密钥输出
                    eprintln!("error: {err}");
                    eprintln!("usage: keycarver scan <DUMP>");
                    std::process::exit(2);
                }
                Err(err) => return Err(err).context("carve failed"),
            };

            info!(
                stages = report.stages.len(),
                keys = report.keys.len(),
                "carve finished"
            );

            // 可选 JSON 报告（缓冲写出）
            if let Some(path) = output {
                let mut out = BufWriter::new(File::create(&path).context("create output file")?);
                serde_json::to_writer_pretty(&mut out, &report).context("write report")?;
                out.flush().ok();
            }

            // 最终结果：每行一个大写十六进制密钥，可独立解析
            if report.keys.is_empty() {
                println!("no AES keys were found");
            } else {
                println!("=== possible AES key(s) found ===");
                for key in &report.keys {
                    println!("0x{key}");
                }
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};
    // 支持通过环境变量 RUST_LOG 控制日志等级，如：RUST_LOG=debug
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(env_filter).finish();
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// 解析线程参数
fn parse_threads(s: &str) -> Option<usize> {
    if s.eq_ignore_ascii_case("auto") {
        return None;
    }
    match s.parse::<usize>() {
        Ok(n) if n >= 1 => Some(n),
        _ => None,
    }
}
