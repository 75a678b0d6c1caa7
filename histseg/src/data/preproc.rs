//! 交互前的体素值预处理.
//!
//! 截断掉极端的低值和高值 (以百分位为界), 然后把数据线性缩放到一个固定的显示范围.
//! 直方图的 bin 边界直接建立在缩放后的数据上, 因此较小的缩放上限意味着更小的
//! bin 网格和更快的交互.

use ndarray::ArrayViewMut3;
use ordered_float::NotNan;

use crate::consts::{
    DEFAULT_PERC_MAX, DEFAULT_PERC_MIN, DEFAULT_SCALE_DELTA, DEFAULT_SCALE_FACTOR,
};

/// 计算 `data` 的第 `q` 百分位值 (`0 <= q <= 100`), 相邻顺序统计量之间线性插值.
///
/// `data` 为空、含 NaN, 或 `q` 越界时 panic.
pub fn percentile(data: &[f32], q: f64) -> f32 {
    assert!(!data.is_empty(), "百分位计算要求非空数据");
    assert!((0.0..=100.0).contains(&q), "百分位 `{q}` 越界");

    let mut sorted: Vec<NotNan<f32>> = data
        .iter()
        .map(|&v| NotNan::new(v).expect("百分位计算不允许 NaN"))
        .collect();
    sorted.sort_unstable();

    let pos = q / 100.0 * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = (pos - lo as f64) as f32;

    let (a, b) = (sorted[lo].into_inner(), sorted[hi].into_inner());
    a + (b - a) * frac
}

/// 把过低和过高的体素值就地截断到 \[`perc_min`, `perc_max`\] 百分位范围.
///
/// 返回截断所用的 (下界, 上界).
pub fn truncate_range(mut data: ArrayViewMut3<f32>, perc_min: f64, perc_max: f64) -> (f32, f32) {
    assert!(perc_min < perc_max, "百分位区间为空");

    let buf: Vec<f32> = data.iter().copied().collect();
    let lb = percentile(&buf, perc_min);
    let ub = percentile(&buf, perc_max);

    data.mapv_inplace(|v| v.clamp(lb, ub));
    (lb, ub)
}

/// 把体素值就地平移到 0 起点并线性缩放, 使最大值等于 `scale_factor - delta`.
///
/// `delta` 用于保证最大数据点落在最后一个 bin 的内部 (而不是恰好压在右边界上).
/// 全体数据相等时只做平移 (缩放无意义).
pub fn scale_range(mut data: ArrayViewMut3<f32>, scale_factor: f64, delta: f64) {
    assert!(scale_factor > delta, "缩放上限必须大于 delta");

    let min = data.iter().copied().fold(f32::INFINITY, f32::min);
    data.mapv_inplace(|v| v - min);

    let max = data.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > 0.0 {
        let k = (scale_factor - delta) as f32 / max;
        data.mapv_inplace(|v| v * k);
    }
}

/// 按默认参数执行整个预处理流程: 以 [`DEFAULT_PERC_MIN`] / [`DEFAULT_PERC_MAX`]
/// 百分位截断, 再缩放到 \[0, [`DEFAULT_SCALE_FACTOR`] - [`DEFAULT_SCALE_DELTA`]\].
///
/// 返回截断所用的 (下界, 上界).
pub fn preprocess_default(mut data: ArrayViewMut3<f32>) -> (f32, f32) {
    let bounds = truncate_range(data.view_mut(), DEFAULT_PERC_MIN, DEFAULT_PERC_MAX);
    scale_range(data, DEFAULT_SCALE_FACTOR, DEFAULT_SCALE_DELTA);
    bounds
}
