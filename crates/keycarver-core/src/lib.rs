//! 内存快照 AES 密钥雕刻引擎
//!
//! 设计要点：
//! - 三种区域发现策略按优先级回退：快照段表 → 前向启发式 → 后向启发式；
//!   段表解析失败或区域内确认不出密钥都只是换下一种策略，不是错误。
//! - 密钥判定 = 统计过滤（香农熵）+ 周期性复现验证；“验证”仅指
//!   结构/统计上的可信度，不做任何解密检验。
//! - 所有阈值集中在 `CarveOptions`，构造一次后只读传递，
//!   便于用替代阈值做测试；快照经只读 mmap 访问，会话结束即释放。

mod carve;
mod entropy;
mod error;
mod options;
mod regions;
mod scan;
mod snapshot;
mod source;
mod types;

// 对外暴露的 API 面
pub use carve::{carve, carve_bytes, CarveReport, StageReport, Strategy};
pub use entropy::shannon_entropy;
pub use error::CarveError;
pub use options::CarveOptions;
pub use regions::{filter_segments, find_regions_heuristic, find_regions_structured};
pub use scan::scan_regions;
pub use snapshot::{parse_segments, Segment};
pub use source::SnapshotSource;
pub use types::{CandidateKey, Region, ScanMode, KEY_SIZE};
