//! 公共类型（对外暴露）
use serde::{Serialize, Serializer};
use std::fmt;

/// AES-256 密钥长度（字节）。
/// `CandidateKey` 为定长数组，该值是类型常量而非运行时选项。
pub const KEY_SIZE: usize = 32;

/// 候选区域：认为承载“活数据”（非填充）的连续字节区间。
/// 构造后不可变；由区域发现策略产出，仅供密钥扫描消费。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    /// 起始偏移（含）
    pub start: usize,
    /// 结束偏移（不含）
    pub end: usize,
    /// 字节数，恒等于 `end - start`
    pub size: usize,
}

impl Region {
    /// 由 `[start, end)` 构造区域；要求 `end >= start`
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(end >= start);
        Self { start, end, size: end - start }
    }
}

/// 启发式边界探测方向
/// - Forward：区域两侧均以长空洞（null block）为界；
/// - Backward：仅以尾部空洞为界，起点按固定回看窗口截取。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanMode {
    Forward,
    Backward,
}

/// 通过全部过滤（空字节规则、熵阈值、周期性验证）的 32 字节候选密钥。
/// 按字节精确相等去重；进入结果集后不可变。
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CandidateKey([u8; KEY_SIZE]);

impl CandidateKey {
    /// 从切片构造；长度不等于 `KEY_SIZE` 时返回 None
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let arr: [u8; KEY_SIZE] = bytes.try_into().ok()?;
        Some(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }

    /// 大写十六进制表示（64 个字符，无前缀）
    pub fn to_hex_upper(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0.iter() {
            write!(f, "{b:02X}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CandidateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CandidateKey(0x{self})")
    }
}

// 报告输出时序列化为大写十六进制字符串
impl Serialize for CandidateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex_upper())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_size_matches_bounds() {
        let r = Region::new(100, 350);
        assert_eq!(r.size, 250);
        assert_eq!(r.end - r.start, r.size);
    }

    #[test]
    fn candidate_key_hex_is_uppercase() {
        let mut bytes = [0u8; KEY_SIZE];
        bytes[0] = 0xAB;
        bytes[31] = 0x0F;
        let key = CandidateKey::from_slice(&bytes).unwrap();
        let hex = key.to_hex_upper();
        assert_eq!(hex.len(), 64);
        assert!(hex.starts_with("AB"));
        assert!(hex.ends_with("0F"));
        assert_eq!(format!("{key}"), hex);
    }

    #[test]
    fn candidate_key_rejects_wrong_length() {
        assert!(CandidateKey::from_slice(&[0u8; 16]).is_none());
        assert!(CandidateKey::from_slice(&[0u8; 33]).is_none());
    }

    #[test]
    fn candidate_key_dedups_by_byte_equality() {
        use std::collections::BTreeSet;
        let a = CandidateKey::from_slice(&[7u8; KEY_SIZE]).unwrap();
        let b = CandidateKey::from_slice(&[7u8; KEY_SIZE]).unwrap();
        let mut set = BTreeSet::new();
        set.insert(a);
        set.insert(b);
        assert_eq!(set.len(), 1);
    }
}
