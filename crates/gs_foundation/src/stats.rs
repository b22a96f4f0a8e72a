// crates/gs_foundation/src/stats.rs

//! 累加与在线统计
//!
//! - [`KahanSum`]: 补偿求和，用于长时间运行的能量/计数累加
//! - [`RunningStats`]: Welford 在线均值/方差，用于实时信号统计

use serde::{Deserialize, Serialize};

/// Kahan 求和
///
/// ```
/// use gs_foundation::KahanSum;
///
/// let sum = KahanSum::sum_iter(std::iter::repeat(0.1).take(1000));
/// assert!((sum - 100.0).abs() < 1e-10);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct KahanSum {
    sum: f64,
    compensation: f64,
}

impl KahanSum {
    /// 创建新的求和器
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个值
    #[inline]
    pub fn add(&mut self, value: f64) {
        let y = value - self.compensation;
        let t = self.sum + y;
        self.compensation = (t - self.sum) - y;
        self.sum = t;
    }

    /// 当前求和值
    #[inline]
    pub fn value(&self) -> f64 {
        self.sum
    }

    /// 重置
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// 从迭代器求和
    pub fn sum_iter<I: IntoIterator<Item = f64>>(iter: I) -> f64 {
        let mut kahan = Self::new();
        for v in iter {
            kahan.add(v);
        }
        kahan.value()
    }
}

/// Welford 在线统计量
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    /// 创建空统计
    pub fn new() -> Self {
        Self::default()
    }

    /// 加入一个样本，非有限值被忽略
    pub fn push(&mut self, x: f64) {
        if !x.is_finite() {
            return;
        }
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    /// 样本数
    #[inline]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// 均值（无样本时为 0）
    #[inline]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// 样本方差（少于两个样本时为 0）
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    /// 样本标准差
    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    /// 重置
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kahan_sum() {
        let data = vec![0.1f64; 1000];
        let sum = KahanSum::sum_iter(data.iter().cloned());
        assert!((sum - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_running_stats() {
        let mut s = RunningStats::new();
        for x in [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0] {
            s.push(x);
        }
        assert_eq!(s.count(), 8);
        assert!((s.mean() - 5.0).abs() < 1e-12);
        assert!((s.variance() - 32.0 / 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_running_stats_ignores_nan() {
        let mut s = RunningStats::new();
        s.push(f64::NAN);
        s.push(1.0);
        assert_eq!(s.count(), 1);
        assert_eq!(s.std_dev(), 0.0);
    }
}
