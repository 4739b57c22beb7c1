//! 雕刻主流程：三种区域发现策略的线性回退链
//!
//! 结构化段表 → 前向启发式 → 后向启发式，每种策略至多尝试一次。
//! 区域为空继续下一策略；区域非空但没有确认出密钥同样继续
//! （一套没有密钥的区域不应阻止换一种发现方式重试）。
//! 第一个产出至少一个候选密钥的策略即为最终结果。
use crate::error::CarveError;
use crate::options::CarveOptions;
use crate::regions::{find_regions_heuristic, find_regions_structured};
use crate::scan::scan_regions;
use crate::source::SnapshotSource;
use crate::types::{CandidateKey, Region, ScanMode};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// 区域发现策略，按优先级排列
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    /// 快照段表（解析成功时边界最可信）
    Structured,
    /// 前向启发式：两侧空洞框定
    HeuristicForward,
    /// 后向启发式：尾部空洞 + 固定回看窗口
    HeuristicBackward,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Structured => "structured",
            Strategy::HeuristicForward => "heuristic-forward",
            Strategy::HeuristicBackward => "heuristic-backward",
        }
    }
}

/// 单个阶段的执行情况（供 CLI 打印与 JSON 报告）
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub strategy: Strategy,
    /// 该策略发现的区域数
    pub regions: usize,
    /// 区域发现耗时（秒）
    pub discovery_secs: f64,
    /// 扫描耗时（秒）；区域为空时未扫描
    pub scan_secs: Option<f64>,
    /// 该阶段确认的密钥数
    pub keys_found: usize,
}

/// 一次雕刻运行的完整结果
#[derive(Debug, Clone, Default, Serialize)]
pub struct CarveReport {
    /// 确认的候选密钥（有序集合，输出可复现）
    pub keys: BTreeSet<CandidateKey>,
    /// 产出密钥的策略；全链落空时为 None
    pub winning_strategy: Option<Strategy>,
    /// 各阶段明细，按尝试顺序
    pub stages: Vec<StageReport>,
}

impl CarveReport {
    /// “未发现密钥”是终态但不是错误
    pub fn found_keys(&self) -> bool {
        !self.keys.is_empty()
    }
}

/// 打开快照文件并执行完整雕刻流程
/// 唯一的致命错误是输入缺失 / 映射失败；映射在返回前必然释放
pub fn carve(path: &Path, opts: &CarveOptions) -> Result<CarveReport, CarveError> {
    let source = SnapshotSource::open(path)?;
    Ok(carve_bytes(source.data(), opts))
}

/// 在内存中的快照内容上执行回退链（便于测试与嵌入）
pub fn carve_bytes(data: &[u8], opts: &CarveOptions) -> CarveReport {
    const CHAIN: [Strategy; 3] = [
        Strategy::Structured,
        Strategy::HeuristicForward,
        Strategy::HeuristicBackward,
    ];

    let mut report = CarveReport::default();

    for strategy in CHAIN {
        let (regions, discovery) = discover(data, strategy, opts);
        if regions.is_empty() {
            info!(
                strategy = strategy.label(),
                elapsed_ms = discovery.as_millis() as u64,
                "no regions found, falling back"
            );
            report.stages.push(StageReport {
                strategy,
                regions: 0,
                discovery_secs: discovery.as_secs_f64(),
                scan_secs: None,
                keys_found: 0,
            });
            continue;
        }

        info!(
            strategy = strategy.label(),
            regions = regions.len(),
            elapsed_ms = discovery.as_millis() as u64,
            "regions discovered"
        );

        let (keys, scan_elapsed) = scan_regions(data, &regions, opts);
        report.stages.push(StageReport {
            strategy,
            regions: regions.len(),
            discovery_secs: discovery.as_secs_f64(),
            scan_secs: Some(scan_elapsed.as_secs_f64()),
            keys_found: keys.len(),
        });

        if !keys.is_empty() {
            info!(
                strategy = strategy.label(),
                keys = keys.len(),
                elapsed_ms = scan_elapsed.as_millis() as u64,
                "candidate keys confirmed"
            );
            report.keys = keys;
            report.winning_strategy = Some(strategy);
            break;
        }

        info!(strategy = strategy.label(), "no keys in these regions, falling back");
    }

    report
}

fn discover(data: &[u8], strategy: Strategy, opts: &CarveOptions) -> (Vec<Region>, Duration) {
    match strategy {
        Strategy::Structured => find_regions_structured(data, opts),
        Strategy::HeuristicForward => find_regions_heuristic(data, ScanMode::Forward, opts),
        Strategy::HeuristicBackward => find_regions_heuristic(data, ScanMode::Backward, opts),
    }
}
