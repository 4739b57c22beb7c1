//! 错误类型
//!
//! 只有两类致命错误：输入文件缺失与底层 I/O 失败。
//! “快照不可解析 / 未发现区域 / 未发现密钥”都是预期内的控制流，
//! 由回退链与报告字段表达，不进入错误类型。
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarveError {
    /// 输入路径不存在或不是常规文件；终止运行并提示用法
    #[error("input file not found: {0}")]
    InputNotFound(PathBuf),

    /// 打开或映射快照文件失败
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
