//! 雕刻选项（模块）
//!
//! 所有可调阈值集中于一个只读配置对象，构造一次后按引用传入各组件，
//! 避免环境全局量，便于在测试中使用替代阈值。

/// 雕刻选项
#[derive(Debug, Clone)]
pub struct CarveOptions {
    /// 前向模式中区域起始侧空洞的最小长度（字节）
    pub min_null_start_region_size: usize,
    /// 区域结束侧空洞的最小长度（字节），前向/后向共用
    pub min_null_end_region_size: usize,
    /// 区域大小下界（严格大于才接受）
    pub min_region_size: usize,
    /// 区域大小上界（后向模式不施加，见启发式设计）
    pub max_region_size: usize,
    /// 后向模式的固定回看窗口（字节）
    pub average_region_size: usize,
    /// 后向模式中紧邻区域末尾的空字节预检长度
    pub pre_null_check: usize,
    /// 周期性验证的前瞻窗口（字节）
    pub lookahead: usize,
    /// 熵阈值（bit），候选窗口低于该值直接拒绝
    pub aes_entropy_threshold: f64,
    /// 周期性验证要求的总命中次数（含首次）
    pub required_repeats: usize,
    /// 每个区域头部的最大扫描深度（字节）；密钥假定出现在区域前部
    pub max_initial_scan_in_region: usize,
    /// 区域扫描线程数：None 表示自动（等于 CPU 核数）；Some(1) 走串行
    pub threads: Option<usize>,
}

impl Default for CarveOptions {
    fn default() -> Self {
        Self {
            min_null_start_region_size: 10_000,
            min_null_end_region_size: 10_000,
            min_region_size: 25_000,
            max_region_size: 2 * 1024 * 1024,
            average_region_size: 100_000,
            pre_null_check: 64,
            lookahead: 300,
            aes_entropy_threshold: 4.7,
            required_repeats: 10,
            max_initial_scan_in_region: 500,
            threads: None,
        }
    }
}

impl CarveOptions {
    /// 实际线程数："auto"（None）取 CPU 核数，至少为 1
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get).max(1)
    }
}
