//! 香农熵计算
//!
//! 仅作为统计过滤器使用：高熵是密钥的必要而非充分证据。

/// 计算字节窗口的香农熵（bit）
/// - 256 桶频率直方图，`H = -Σ p_i · log2(p_i)`（仅统计非零桶）
/// - 空输入返回 0.0；纯函数，结果确定
pub fn shannon_entropy(data: &[u8]) -> f64 {
    if data.is_empty() {
        return 0.0;
    }
    let mut freq = [0usize; 256];
    for &b in data {
        freq[b as usize] += 1;
    }
    let len = data.len() as f64;
    let mut entropy = 0.0;
    for &f in freq.iter() {
        if f > 0 {
            let p = f as f64 / len;
            entropy -= p * p.log2();
        }
    }
    entropy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_zero() {
        assert_eq!(shannon_entropy(&[]), 0.0);
    }

    #[test]
    fn all_zero_window_is_exactly_zero() {
        assert_eq!(shannon_entropy(&[0u8; 32]), 0.0);
    }

    #[test]
    fn distinct_32_bytes_is_five_bits() {
        let window: Vec<u8> = (0u8..32).collect();
        let h = shannon_entropy(&window);
        assert!((h - 5.0).abs() < 1e-12, "expected 5.0, got {h}");
    }

    #[test]
    fn entropy_is_permutation_invariant() {
        let mut window: Vec<u8> = (0u8..32).map(|i| i.wrapping_mul(37)).collect();
        let forward = shannon_entropy(&window);
        window.reverse();
        assert_eq!(shannon_entropy(&window), forward);
    }

    #[test]
    fn uniform_pairs_are_four_bits() {
        // 16 个各出现两次的取值：H = log2(16) = 4
        let window: Vec<u8> = (0u8..16).flat_map(|i| [i, i]).collect();
        let h = shannon_entropy(&window);
        assert!((h - 4.0).abs() < 1e-12);
    }
}
