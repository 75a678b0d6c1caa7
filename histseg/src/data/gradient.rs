//! 3D 梯度模计算.
//!
//! 梯度采用单位间距的差分格式: 内部点用中心差分 `(v[i+1] - v[i-1]) / 2`,
//! 两端用单侧差分. 三个轴向分量的 L2 范数即为梯度模.

use itertools::izip;
use ndarray::{Array3, ArrayView3, Axis};

/// 计算体积 `vol` 的逐体素梯度模 (三轴梯度向量的欧几里得范数).
///
/// 结果与 `vol` 同形状. 长度不足 2 的轴不贡献梯度分量.
pub fn gradient_magnitude(vol: ArrayView3<f32>) -> Array3<f32> {
    let mut acc = Array3::<f32>::zeros(vol.raw_dim());

    for axis in 0..3 {
        let n = vol.len_of(Axis(axis));
        if n < 2 {
            continue;
        }

        let mut diff = Array3::<f32>::zeros(vol.raw_dim());
        for (lane, mut out) in izip!(
            vol.lanes(Axis(axis)).into_iter(),
            diff.lanes_mut(Axis(axis)).into_iter()
        ) {
            out[0] = lane[1] - lane[0];
            out[n - 1] = lane[n - 1] - lane[n - 2];
            for i in 1..n - 1 {
                out[i] = (lane[i + 1] - lane[i - 1]) * 0.5;
            }
        }

        acc.zip_mut_with(&diff, |a, &d| *a += d * d);
    }

    acc.mapv_inplace(f32::sqrt);
    acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    fn float_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    /// 常量体积的梯度模处处为 0.
    #[test]
    fn test_gradient_constant() {
        let vol = Array3::<f32>::from_elem((3, 4, 5), 7.5);
        let gra = gradient_magnitude(vol.view());
        assert!(gra.iter().all(|&g| g == 0.0));
    }

    /// 沿单轴线性增长的体积, 梯度模处处为斜率.
    #[test]
    fn test_gradient_linear_ramp() {
        let vol = Array3::<f32>::from_shape_fn((4, 3, 3), |(z, _, _)| 2.0 * z as f32);
        let gra = gradient_magnitude(vol.view());
        assert!(gra.iter().all(|&g| float_eq(g, 2.0)));
    }

    /// 两轴同时线性增长时, 梯度模是两个斜率的 L2 范数.
    #[test]
    fn test_gradient_two_axes() {
        let vol = Array3::<f32>::from_shape_fn((3, 3, 3), |(z, h, _)| z as f32 * 3.0 + h as f32 * 4.0);
        let gra = gradient_magnitude(vol.view());
        // sqrt(3^2 + 4^2) = 5
        assert!(gra.iter().all(|&g| float_eq(g, 5.0)));
    }

    /// 退化轴 (长度 1) 不贡献梯度.
    #[test]
    fn test_gradient_degenerate_axis() {
        let vol = Array3::<f32>::from_shape_fn((1, 4, 1), |(_, h, _)| h as f32);
        let gra = gradient_magnitude(vol.view());
        assert!(gra.iter().all(|&g| float_eq(g, 1.0)));
    }

    /// 边缘使用单侧差分.
    #[test]
    fn test_gradient_one_sided_border() {
        // [0, 1, 4, 9]: 边缘差分 1 和 5; 内部中心差分 2 和 4.
        let vol = Array3::<f32>::from_shape_fn((1, 1, 4), |(_, _, w)| (w * w) as f32);
        let gra = gradient_magnitude(vol.view());
        let expect = [1.0, 2.0, 4.0, 5.0];
        for (g, e) in gra.iter().zip(expect) {
            assert!(float_eq(*g, e));
        }
    }
}
