//! 候选密钥扫描
//!
//! 把区域内的原始字节变成“通过验证的候选密钥”：
//! 逐偏移取 32 字节窗口，依次过滤（首字节非零、零字节计数、
//! 前导双零填充、熵阈值），最后做周期性复现验证。
//! 各区域相互独立，线程数大于 1 时在专用 rayon 池内并行，
//! 结果集按构造即与顺序无关，并行只是性能优化。
use crate::entropy::shannon_entropy;
use crate::options::CarveOptions;
use crate::types::{CandidateKey, Region, KEY_SIZE};
use memchr::memmem;
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

/// 在给定区域集合中扫描候选密钥
/// 结果按字节精确相等去重；同一密钥经多个偏移/区域命中是预期情形
pub fn scan_regions(
    data: &[u8],
    regions: &[Region],
    opts: &CarveOptions,
) -> (BTreeSet<CandidateKey>, Duration) {
    let started = Instant::now();
    let threads = opts.effective_threads();

    let keys = if threads > 1 && regions.len() > 1 {
        match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
            Ok(pool) => pool.install(|| {
                regions
                    .par_iter()
                    .map(|region| scan_region(data, region, opts))
                    .reduce(BTreeSet::new, |mut acc, part| {
                        acc.extend(part);
                        acc
                    })
            }),
            // 建池失败就退回串行，观测结果不变
            Err(_) => scan_regions_serial(data, regions, opts),
        }
    } else {
        scan_regions_serial(data, regions, opts)
    };

    (keys, started.elapsed())
}

fn scan_regions_serial(
    data: &[u8],
    regions: &[Region],
    opts: &CarveOptions,
) -> BTreeSet<CandidateKey> {
    let mut keys = BTreeSet::new();
    for region in regions {
        keys.extend(scan_region(data, region, opts));
    }
    keys
}

fn scan_region(data: &[u8], region: &Region, opts: &CarveOptions) -> BTreeSet<CandidateKey> {
    let mut found = BTreeSet::new();
    // 区域可能来自畸形段表，越界或容不下一个密钥就直接跳过
    if region.end > data.len() || region.start >= region.end || region.size < KEY_SIZE {
        return found;
    }

    // 昂贵的内层扫描只覆盖区域前部：感兴趣的密钥假定出现在区域开头附近
    let ceiling = (region.start + opts.max_initial_scan_in_region).min(region.end - KEY_SIZE);

    // 跳过区域起始处的零字节
    let mut i = region.start;
    while i < ceiling && data[i] == 0 {
        i += 1;
    }

    // 步长恒为 1：真实密钥边界不假定对齐任何步幅，被拒绝后也不跳读
    while i + KEY_SIZE <= ceiling {
        let candidate = &data[i..i + KEY_SIZE];

        // 注意：AES 密钥可能以零字节开头。这里把首字节为零的窗口排除在
        // 正向匹配之外是已知盲区；若找到的密钥无效，可尝试把零字节补回。
        if candidate[0] == 0x00 {
            i += 1;
            continue;
        }
        // 密钥应当接近随机，稀疏窗口直接排除
        if candidate.iter().filter(|&&b| b == 0x00).count() > 2 {
            i += 1;
            continue;
        }
        // 分配器/对齐启发式：真实密钥缓冲区前通常是填充零
        if i < region.start + 2 || data[i - 2..i] != [0x00, 0x00] {
            i += 1;
            continue;
        }

        if shannon_entropy(candidate) >= opts.aes_entropy_threshold
            && verify_periodicity(data, region, i, candidate, opts)
        {
            if let Some(key) = CandidateKey::from_slice(candidate) {
                found.insert(key);
            }
        }

        i += 1;
    }

    found
}

// 周期性验证：运行时密钥调度或缓冲区复制会让同一密钥在邻近偏移反复出现。
// 从命中点出发，在有界前瞻窗口内链式查找同一 32 字节序列的下一次出现，
// 总命中次数（含首次）达到 required_repeats 才接受。
fn verify_periodicity(
    data: &[u8],
    region: &Region,
    at: usize,
    candidate: &[u8],
    opts: &CarveOptions,
) -> bool {
    let finder = memmem::Finder::new(candidate);
    let limit = region.end - KEY_SIZE;
    let mut repeats = 1usize;
    let mut scan_pos = at;

    while repeats < opts.required_repeats {
        // 下一次出现的起点范围 [lo, hi)，受前瞻窗口与区域尾部共同约束
        let lo = scan_pos + 1;
        let hi = limit.min(scan_pos + opts.lookahead);
        if lo >= hi {
            break;
        }
        // 末一个合法起点为 hi-1，对应窗口还需延伸 KEY_SIZE-1 字节
        let haystack_end = (hi + KEY_SIZE - 1).min(data.len());
        match finder.find(&data[lo..haystack_end]) {
            Some(offset) => {
                repeats += 1;
                scan_pos = lo + offset;
            }
            None => break,
        }
    }

    repeats >= opts.required_repeats
}
