//! minidump 段表解析（最小实现）
//!
//! 只提取 Memory64ListStream 声明的 `(文件偏移, 大小)` 段表，
//! 不是通用 minidump 实现。快照损坏是预期情形：任何畸形
//! （坏魔数、目录截断、离谱计数）一律返回空表，由上层回退到启发式发现。

/// 快照中声明的一个内存段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// 段内容在快照文件中的起始偏移
    pub file_offset: u64,
    /// 段大小（字节）
    pub size: u64,
}

// "MDMP"
const MDMP_SIGNATURE: u32 = 0x504D_444D;
// MINIDUMP_STREAM_TYPE::Memory64ListStream
const STREAM_MEMORY64_LIST: u32 = 9;
// 目录项 { StreamType: u32, DataSize: u32, Rva: u32 }
const DIRECTORY_ENTRY_SIZE: usize = 12;
// 计数上限：超过视为畸形，防止在损坏头部上空转
const MAX_STREAMS: u32 = 4096;
const MAX_RANGES: u64 = 1 << 20;

/// 解析快照头部，返回 Memory64List 声明的段表；不可解析时返回空表
pub fn parse_segments(data: &[u8]) -> Vec<Segment> {
    try_parse(data).unwrap_or_default()
}

fn try_parse(data: &[u8]) -> Option<Vec<Segment>> {
    if read_u32(data, 0)? != MDMP_SIGNATURE {
        return None;
    }
    let stream_count = read_u32(data, 8)?;
    let directory_rva = read_u32(data, 12)? as usize;
    if stream_count > MAX_STREAMS {
        return None;
    }

    // 遍历流目录，定位 Memory64ListStream
    for i in 0..stream_count as usize {
        let entry = directory_rva.checked_add(i.checked_mul(DIRECTORY_ENTRY_SIZE)?)?;
        let stream_type = read_u32(data, entry)?;
        if stream_type != STREAM_MEMORY64_LIST {
            continue;
        }
        let rva = read_u32(data, entry.checked_add(8)?)? as usize;
        return parse_memory64_list(data, rva);
    }
    None
}

// MINIDUMP_MEMORY64_LIST：
//   NumberOfMemoryRanges: u64, BaseRva: u64,
//   MemoryRanges: [{ StartOfMemoryRange: u64, DataSize: u64 }; N]
// 各段内容从 BaseRva 起在文件中背靠背连续存放，文件偏移按大小累加。
fn parse_memory64_list(data: &[u8], rva: usize) -> Option<Vec<Segment>> {
    let count = read_u64(data, rva)?;
    if count > MAX_RANGES {
        return None;
    }
    let base_rva = read_u64(data, rva.checked_add(8)?)?;

    let mut segments = Vec::with_capacity(count as usize);
    let mut file_offset = base_rva;
    for i in 0..count as usize {
        let desc = rva.checked_add(16)?.checked_add(i.checked_mul(16)?)?;
        // StartOfMemoryRange（虚拟地址）对雕刻无用，跳过
        let size = read_u64(data, desc.checked_add(8)?)?;
        segments.push(Segment { file_offset, size });
        file_offset = file_offset.checked_add(size)?;
    }
    Some(segments)
}

fn read_u32(data: &[u8], offset: usize) -> Option<u32> {
    let bytes: [u8; 4] = data.get(offset..offset.checked_add(4)?)?.try_into().ok()?;
    Some(u32::from_le_bytes(bytes))
}

fn read_u64(data: &[u8], offset: usize) -> Option<u64> {
    let bytes: [u8; 8] = data.get(offset..offset.checked_add(8)?)?.try_into().ok()?;
    Some(u64::from_le_bytes(bytes))
}
