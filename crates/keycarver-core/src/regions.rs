//! 区域发现：结构化段表过滤 + 空洞框定启发式
//!
//! 结构化发现以段表边界为准（解析成功时最可信）；
//! 启发式发现只依赖字节形态推断（长零串视为未分配/填充内存的结构标记），
//! 用于段表缺失或不可信的快照。两者每趟都对文件做一次线性扫描。
use crate::options::CarveOptions;
use crate::snapshot::Segment;
use crate::types::{Region, ScanMode};
use std::time::{Duration, Instant};

/// 结构化发现：解析快照段表并按大小界过滤
/// 段表缺失/畸形时得到空表，属预期情形（触发启发式回退）
pub fn find_regions_structured(data: &[u8], opts: &CarveOptions) -> (Vec<Region>, Duration) {
    let started = Instant::now();
    let segments = crate::snapshot::parse_segments(data);
    let regions = filter_segments(&segments, opts);
    (regions, started.elapsed())
}

/// 按大小界过滤声明段：`MIN < size <= MAX` 才保留，输入顺序不变
pub fn filter_segments(segments: &[Segment], opts: &CarveOptions) -> Vec<Region> {
    let mut regions = Vec::new();
    for seg in segments {
        let size = seg.size as usize;
        if size > opts.min_region_size && size <= opts.max_region_size {
            let start = seg.file_offset as usize;
            // 畸形段表可能声明出溢出的偏移，静默丢弃
            let Some(end) = start.checked_add(size) else { continue };
            regions.push(Region::new(start, end));
        }
    }
    regions
}

/// 启发式发现：按方向选择两种对称算法之一
pub fn find_regions_heuristic(
    data: &[u8],
    mode: ScanMode,
    opts: &CarveOptions,
) -> (Vec<Region>, Duration) {
    let started = Instant::now();
    let regions = match mode {
        ScanMode::Forward => find_forward(data, opts),
        ScanMode::Backward => find_backward(data, opts),
    };
    (regions, started.elapsed())
}

// 前向模式：区域两侧均被长零串框定。
// 游标越过区域尾零串再加一个起始零串长度，因此单趟产出的区域不重叠。
fn find_forward(data: &[u8], opts: &CarveOptions) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        // 1) 起始零串
        let Some((_, start_run_end)) = find_null_run(data, pos, opts.min_null_start_region_size)
        else {
            break;
        };
        // 2) 零串之后的第一个非零字节即候选区域起点。
        //    密钥本身可以以零字节开头，这只是启发式边界，不是严格保证。
        let region_start = start_run_end;
        if region_start >= data.len() {
            break;
        }
        // 3) 下一个够长的零串，其起点即候选区域终点
        let Some((end_run_start, _)) = find_null_run(data, region_start, opts.min_null_end_region_size)
        else {
            break;
        };
        let region_end = end_run_start;

        // 4) 大小界检查
        let size = region_end - region_start;
        if size > opts.min_region_size && size <= opts.max_region_size {
            regions.push(Region::new(region_start, region_end));
        }

        // 5) 游标推进到尾零串之后再加一个起始零串长度
        pos = end_run_start + opts.min_null_start_region_size;
    }

    regions
}

// 后向模式：只靠尾零串框定，起点按固定回看窗口截取。
// 上界有意不施加（与前向/结构化不同）：回看窗口本身就是大小假设。
fn find_backward(data: &[u8], opts: &CarveOptions) -> Vec<Region> {
    let mut regions = Vec::new();
    let mut pos = 0usize;

    while pos < data.len() {
        // 1) 下一个够长的零串，其起点即候选区域终点
        let Some((end_run_start, _)) = find_null_run(data, pos, opts.min_null_end_region_size)
        else {
            break;
        };
        let region_end = end_run_start;

        // 2) 固定回看窗口
        let region_start = region_end.saturating_sub(opts.average_region_size);

        // 3) 终点前的预检窗口若全零，说明回看窗口套住的是零串本身而非真实数据
        let check_start = region_start.max(region_end.saturating_sub(opts.pre_null_check));
        let tail_all_null = data[check_start..region_end].iter().all(|&b| b == 0);

        // 4) 只检查大小下界
        if !tail_all_null {
            let size = region_end - region_start;
            if size >= opts.min_region_size {
                regions.push(Region::new(region_start, region_end));
            }
        }

        // 5) 越过当前尾零串
        pos = end_run_start + opts.min_null_end_region_size;
    }

    regions
}

/// 从 `from` 起找第一个长度不小于 `min_len` 的零字节串，
/// 返回 `(串起点, 串终点)`；不存在则返回 None。
/// memchr 定位零字节后一次性量完整串长，每个字节至多被访问一次。
fn find_null_run(data: &[u8], from: usize, min_len: usize) -> Option<(usize, usize)> {
    let mut pos = from;
    while pos < data.len() {
        let zero = memchr::memchr(0, &data[pos..])? + pos;
        let run_end = data[zero..]
            .iter()
            .position(|&b| b != 0)
            .map(|i| zero + i)
            .unwrap_or(data.len());
        if run_end - zero >= min_len {
            return Some((zero, run_end));
        }
        pos = run_end;
    }
    None
}
