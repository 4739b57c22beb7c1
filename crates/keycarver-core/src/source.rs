//! 快照字节源（只读内存映射）
//!
//! 整个会话期间独占持有映射；值析构即解除映射，
//! 包括“无区域/无密钥”提前返回在内的所有退出路径都保证释放。
use crate::error::CarveError;
use memmap2::Mmap;
use std::fs::File;
use std::path::Path;

/// 对快照文件的长度受限、随机访问只读视图
#[derive(Debug)]
pub struct SnapshotSource {
    // 空文件无法建立映射，用 None 表示零长度内容
    mmap: Option<Mmap>,
}

impl SnapshotSource {
    /// 打开并映射快照文件
    /// - 路径不存在或不是常规文件 → `CarveError::InputNotFound`
    /// - 打开/映射失败 → `CarveError::Io`
    pub fn open(path: &Path) -> Result<Self, CarveError> {
        if !path.is_file() {
            return Err(CarveError::InputNotFound(path.to_path_buf()));
        }
        let file = File::open(path)?;
        if file.metadata()?.len() == 0 {
            return Ok(Self { mmap: None });
        }
        // 安全性：映射为私有只读，且本引擎生命周期内不假定外部修改
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self { mmap: Some(mmap) })
    }

    /// 快照内容的完整只读切片
    pub fn data(&self) -> &[u8] {
        self.mmap.as_deref().unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.data().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 边界检查的区间读取；越界返回 None
    pub fn slice(&self, start: usize, end: usize) -> Option<&[u8]> {
        self.data().get(start..end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CarveError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_path_is_input_not_found() {
        let err = SnapshotSource::open(Path::new("/nonexistent/snapshot.dmp")).unwrap_err();
        assert!(matches!(err, CarveError::InputNotFound(_)));
    }

    #[test]
    fn open_and_read_back() {
        let mut tmp = NamedTempFile::new().unwrap();
        tmp.write_all(b"carve me").unwrap();
        tmp.flush().unwrap();

        let source = SnapshotSource::open(tmp.path()).unwrap();
        assert_eq!(source.len(), 8);
        assert_eq!(source.data(), b"carve me");
        assert_eq!(source.slice(0, 5), Some(&b"carve"[..]));
        assert_eq!(source.slice(6, 9), None);
    }

    #[test]
    fn empty_file_maps_to_empty_slice() {
        let tmp = NamedTempFile::new().unwrap();
        let source = SnapshotSource::open(tmp.path()).unwrap();
        assert!(source.is_empty());
        assert_eq!(source.data(), b"");
    }
}
