//! 端到端场景：默认阈值下的完整雕刻流程
use keycarver_core::{carve, CarveError, CarveOptions, Segment, Strategy, KEY_SIZE};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// 32 个互不相同的非零字节（熵恰为 5.0 bit）
fn pseudo_key() -> Vec<u8> {
    (0..KEY_SIZE as u8).map(|i| i * 7 + 3).collect()
}

/// 构造 40,000 字节的区域内容：
/// 非零前缀 + 双零填充，随后密钥按 50 字节周期重复 `repeats` 次，
/// 余下部分用不含零的填充字节占满
fn region_content(repeats: usize) -> Vec<u8> {
    let key = pseudo_key();
    let mut data = vec![0xAAu8, 0x00, 0x00];
    for n in 0..repeats {
        let target = 3 + n * 50;
        while data.len() < target {
            data.push(0xEE);
        }
        data.extend_from_slice(&key);
    }
    while data.len() < 40_000 {
        data.push((data.len() % 255) as u8 + 1);
    }
    data
}

/// 场景 A/B 的快照：万余字节零串夹一个 40,000 字节区域
fn framed_snapshot(repeats: usize) -> Vec<u8> {
    let mut buf = vec![0u8; 10_050];
    buf.extend(region_content(repeats));
    buf.extend(vec![0u8; 10_050]);
    buf
}

fn write_snapshot(bytes: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp.flush().unwrap();
    tmp
}

#[test]
fn scenario_a_forward_heuristic_recovers_repeated_key() {
    let snapshot = write_snapshot(&framed_snapshot(10));
    let report = carve(snapshot.path(), &CarveOptions::default()).unwrap();

    assert_eq!(report.winning_strategy, Some(Strategy::HeuristicForward));
    // 结构化发现落空后，前向启发式恰好框出一个区域
    assert_eq!(report.stages.len(), 2);
    assert_eq!(report.stages[0].strategy, Strategy::Structured);
    assert_eq!(report.stages[0].regions, 0);
    assert_eq!(report.stages[1].regions, 1);

    assert_eq!(report.keys.len(), 1);
    let key = report.keys.iter().next().unwrap();
    assert_eq!(key.as_bytes().as_slice(), pseudo_key().as_slice());
}

#[test]
fn scenario_b_nine_repeats_is_not_enough() {
    let snapshot = write_snapshot(&framed_snapshot(9));
    let report = carve(snapshot.path(), &CarveOptions::default()).unwrap();

    // 周期性验证要求 10 次命中，9 次的序列全链落空
    assert!(!report.found_keys());
    assert_eq!(report.winning_strategy, None);
    assert_eq!(report.stages.len(), 3);
}

#[test]
fn scenario_c_missing_input_aborts_without_output() {
    let err = carve(
        Path::new("/definitely/not/a/snapshot.dmp"),
        &CarveOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, CarveError::InputNotFound(_)));
}

#[test]
fn scenario_d_oversized_segment_triggers_fallback() {
    let segments = [Segment { file_offset: 0, size: 5_000_000 }];
    let regions = keycarver_core::filter_segments(&segments, &CarveOptions::default());
    assert!(regions.is_empty());
}

#[test]
fn structured_discovery_wins_on_wellformed_minidump() {
    let content = region_content(10);
    let mut dump = build_minidump(content.len() as u64, 4096);
    dump.resize(4096, 0x11);
    dump.extend_from_slice(&content);

    let snapshot = write_snapshot(&dump);
    let report = carve(snapshot.path(), &CarveOptions::default()).unwrap();

    assert_eq!(report.winning_strategy, Some(Strategy::Structured));
    assert_eq!(report.stages.len(), 1);
    assert_eq!(report.keys.len(), 1);
    let key = report.keys.iter().next().unwrap();
    assert_eq!(key.as_bytes().as_slice(), pseudo_key().as_slice());
}

/// 只含一个 Memory64ListStream 的最小 minidump 头部
fn build_minidump(segment_size: u64, payload_rva: u64) -> Vec<u8> {
    let mut buf = Vec::new();
    // MINIDUMP_HEADER
    buf.extend_from_slice(&0x504D_444Du32.to_le_bytes()); // "MDMP"
    buf.extend_from_slice(&0xA793u32.to_le_bytes()); // Version
    buf.extend_from_slice(&1u32.to_le_bytes()); // NumberOfStreams
    buf.extend_from_slice(&32u32.to_le_bytes()); // StreamDirectoryRva
    buf.extend_from_slice(&[0u8; 8]); // CheckSum + TimeDateStamp
    buf.extend_from_slice(&0u64.to_le_bytes()); // Flags

    // 目录项：Memory64ListStream 紧随目录之后（偏移 44）
    buf.extend_from_slice(&9u32.to_le_bytes()); // StreamType
    buf.extend_from_slice(&32u32.to_le_bytes()); // DataSize
    buf.extend_from_slice(&44u32.to_le_bytes()); // Rva

    // MINIDUMP_MEMORY64_LIST：1 个段，内容位于 payload_rva
    buf.extend_from_slice(&1u64.to_le_bytes());
    buf.extend_from_slice(&payload_rva.to_le_bytes());
    buf.extend_from_slice(&0x7FF6_0000_0000u64.to_le_bytes()); // StartOfMemoryRange
    buf.extend_from_slice(&segment_size.to_le_bytes()); // DataSize
    buf
}
