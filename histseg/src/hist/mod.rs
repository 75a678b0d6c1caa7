//! 2D 联合直方图与逆直方图索引.
//!
//! 直方图的两个轴分别是体素强度和梯度模, 且 **共用同一组 bin 边界**.
//! bin 网格的第一轴 (行) 对应梯度 bin, 第二轴 (列) 对应强度 bin;
//! 线性 bin 索引按 `lin = gradient_bin * nr_bins + intensity_bin` 编码.
//! 这是下游所有掩码映射共同依赖的约定, 不是任意选择.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};

use crate::{Idx2d, Idx3d};

pub mod project;

pub use project::{project_to_slice, project_to_volume};

/// 直方图构建错误. 这些都是调用方契约违例, 在构建边界上快速失败.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum HistogramError {
    /// 强度数组和梯度数组形状不一致.
    ShapeMismatch(Idx3d, Idx3d),

    /// bin 边界序列长度不足 (至少需要 2 个边界才能形成 1 个 bin).
    EdgesTooShort,

    /// bin 边界序列不是严格递增的.
    EdgesNotIncreasing,

    /// 数据取值范围过窄, 无法形成任何 bin.
    EmptyValueRange,
}

/// 求值 `v` 落入 `edges` 中的区间号: 返回第一个大于 `v` 的边界下标.
///
/// `edges` 必须严格递增. 对位于 `[edges[i-1], edges[i])` 的值返回 `i`.
#[inline]
fn digitize(v: f64, edges: &[f64]) -> usize {
    edges.partition_point(|&e| e <= v)
}

/// 直方图 bin 参数: 取值范围、bin 个数与共享的整数步长 bin 边界.
#[derive(Debug, Clone)]
pub struct HistogramParams {
    data_min: f64,
    data_max: f64,
    edges: Vec<f64>,
}

impl HistogramParams {
    /// 从 (已预处理的) 强度数据建立 bin 参数.
    ///
    /// `nr_bins = round(max) - round(min)`, bin 边界为从 `round(min)` 到
    /// `round(max)` 的整数序列. 取值范围过窄时返回
    /// `Err(HistogramError::EmptyValueRange)`.
    pub fn from_intensity(ima: ArrayView3<f32>) -> Result<Self, HistogramError> {
        let min = ima.iter().copied().fold(f32::INFINITY, f32::min);
        let max = ima.iter().copied().fold(f32::NEG_INFINITY, f32::max);

        let data_min = (min as f64).round();
        let data_max = (max as f64).round();
        if !(data_max - data_min >= 1.0) {
            return Err(HistogramError::EmptyValueRange);
        }

        let nr_bins = (data_max - data_min) as usize;
        let edges = (0..=nr_bins).map(|i| data_min + i as f64).collect();
        Ok(Self {
            data_min,
            data_max,
            edges,
        })
    }

    /// bin 个数 (单轴).
    #[inline]
    pub fn nr_bins(&self) -> usize {
        self.edges.len() - 1
    }

    /// 取值下界 (第一个 bin 边界).
    #[inline]
    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    /// 取值上界 (最后一个 bin 边界).
    #[inline]
    pub fn data_max(&self) -> f64 {
        self.data_max
    }

    /// 共享的 bin 边界序列, 长度为 `nr_bins + 1`.
    #[inline]
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// 统计 2D 联合直方图计数. 行对应梯度 bin, 列对应强度 bin.
    ///
    /// 计数结果只服务于显示图层 (对数色标等由外部负责), 掩码映射不依赖它.
    /// 形状不一致时返回 `Err`.
    pub fn counts(
        &self,
        intensity: ArrayView3<f32>,
        gradient: ArrayView3<f32>,
    ) -> Result<Array2<u64>, HistogramError> {
        if intensity.dim() != gradient.dim() {
            return Err(HistogramError::ShapeMismatch(
                intensity.dim(),
                gradient.dim(),
            ));
        }

        let nr = self.nr_bins();
        let mut counts = Array2::<u64>::zeros((nr, nr));
        for (&ima, &gra) in intensity.iter().zip(gradient.iter()) {
            let ib = digitize(ima as f64, &self.edges).wrapping_sub(1);
            let gb = digitize(gra as f64, &self.edges).wrapping_sub(1);
            // 超出 bin 网格的体素 (如梯度模超过强度上界) 不参与计数.
            if ib < nr && gb < nr {
                counts[(gb, ib)] += 1;
            }
        }
        Ok(counts)
    }
}

/// 逆直方图索引: 与体积同形状的体素 → 线性 bin 索引表.
///
/// 会话期间体积不可变, 因此该索引构建一次后只读共享
/// (切片视图切换除外, 见 [`HistogramIndex::cycle_view`]).
#[derive(Debug, Clone)]
pub struct HistogramIndex {
    nr_bins: usize,
    map: Array3<u32>,
}

impl HistogramIndex {
    /// 对强度和梯度数组用共享边界 `edges` 做 digitize, 建立体素 → bin 映射.
    ///
    /// # 返回值
    ///
    /// - 两个数组形状不一致时返回 `Err(HistogramError::ShapeMismatch)`;
    /// - `edges` 少于 2 个时返回 `Err(HistogramError::EdgesTooShort)`;
    /// - `edges` 不严格递增时返回 `Err(HistogramError::EdgesNotIncreasing)`;
    /// - 其他情况下成功, 返回 `Ok(Self)`.
    ///
    /// # 注意
    ///
    /// 超出 `[edges[0], edges[last])` 的值被钳到最近的边缘 bin.
    /// 典型情形是梯度模: 它由强度派生而非独立截断, 阶跃边界处的单侧差分
    /// 可以超过强度上界 (最高达 `sqrt(3)` 倍).
    pub fn build(
        intensity: ArrayView3<f32>,
        gradient: ArrayView3<f32>,
        edges: &[f64],
    ) -> Result<Self, HistogramError> {
        if intensity.dim() != gradient.dim() {
            return Err(HistogramError::ShapeMismatch(
                intensity.dim(),
                gradient.dim(),
            ));
        }
        if edges.len() < 2 {
            return Err(HistogramError::EdgesTooShort);
        }
        if edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(HistogramError::EdgesNotIncreasing);
        }

        let nr_bins = edges.len() - 1;
        let mut map = Array3::<u32>::zeros(intensity.raw_dim());
        Zip::from(&mut map)
            .and(&intensity)
            .and(&gradient)
            .for_each(|lin, &ima, &gra| {
                let ib = digitize(ima as f64, edges).saturating_sub(1).min(nr_bins - 1);
                let gb = digitize(gra as f64, edges).saturating_sub(1).min(nr_bins - 1);
                *lin = (gb * nr_bins + ib) as u32;
            });

        Ok(Self { nr_bins, map })
    }

    /// bin 个数 (单轴).
    #[inline]
    pub fn nr_bins(&self) -> usize {
        self.nr_bins
    }

    /// 索引表形状, 与体积形状一致.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.map.dim()
    }

    /// 当前视图下的水平切片个数.
    #[inline]
    pub fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取体素 `pos` 对应的线性 bin 索引. 越界时 panic.
    #[inline]
    pub fn bin_at(&self, pos: Idx3d) -> u32 {
        self.map[pos]
    }

    /// 把线性 bin 索引分解为 bin 网格坐标 (梯度 bin, 强度 bin).
    #[inline]
    pub fn bin_pos(&self, lin: u32) -> Idx2d {
        let lin = lin as usize;
        (lin / self.nr_bins, lin % self.nr_bins)
    }

    /// 把 bin 网格坐标 (梯度 bin, 强度 bin) 编码为线性 bin 索引.
    #[inline]
    pub fn lin_index(&self, (gb, ib): Idx2d) -> u32 {
        debug_assert!(gb < self.nr_bins && ib < self.nr_bins);
        (gb * self.nr_bins + ib) as u32
    }

    /// 获取第 `z_index` 层索引表切片视图. 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<u32> {
        self.map.index_axis(Axis(0), z_index)
    }

    /// 获取整个索引表的视图.
    #[inline]
    pub fn view(&self) -> ArrayView3<u32> {
        self.map.view()
    }

    /// 循环切换切片视图: 将索引表按 `(2, 0, 1)` 置换轴.
    ///
    /// 连续调用三次回到初始视图. 置换后数据重新整理为行优先存储,
    /// 保证后续切片视图仍是连续内存.
    pub fn cycle_view(&mut self) {
        let rotated = self
            .map
            .view()
            .permuted_axes([2, 0, 1])
            .as_standard_layout()
            .into_owned();
        self.map = rotated;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_digitize_boundaries() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        // 值恰好压在边界上时归属右侧区间.
        assert_eq!(digitize(0.0, &edges), 1);
        assert_eq!(digitize(0.5, &edges), 1);
        assert_eq!(digitize(1.0, &edges), 2);
        assert_eq!(digitize(2.999, &edges), 3);
        // 越界值的原始区间号 (`build` 在此之上做边缘钳制).
        assert_eq!(digitize(-0.1, &edges), 0);
        assert_eq!(digitize(3.0, &edges), 4);
    }

    #[test]
    fn test_params_from_intensity() {
        let ima = Array3::<f32>::from_shape_fn((1, 2, 3), |(_, h, w)| (h * 3 + w) as f32);
        let p = HistogramParams::from_intensity(ima.view()).unwrap();
        assert_eq!(p.nr_bins(), 5);
        assert_eq!(p.data_min(), 0.0);
        assert_eq!(p.data_max(), 5.0);
        assert_eq!(p.edges().len(), 6);
    }

    #[test]
    fn test_params_empty_range() {
        let ima = Array3::<f32>::from_elem((2, 2, 2), 1.2);
        let e = HistogramParams::from_intensity(ima.view()).unwrap_err();
        assert_eq!(e, HistogramError::EmptyValueRange);
    }

    #[test]
    fn test_build_input_validation() {
        let a = Array3::<f32>::zeros((2, 2, 2));
        let b = Array3::<f32>::zeros((2, 2, 3));
        let edges = [0.0, 1.0];

        let e = HistogramIndex::build(a.view(), b.view(), &edges).unwrap_err();
        assert_eq!(e, HistogramError::ShapeMismatch((2, 2, 2), (2, 2, 3)));

        let e = HistogramIndex::build(a.view(), a.view(), &[0.0]).unwrap_err();
        assert_eq!(e, HistogramError::EdgesTooShort);

        let e = HistogramIndex::build(a.view(), a.view(), &[0.0, 1.0, 1.0]).unwrap_err();
        assert_eq!(e, HistogramError::EdgesNotIncreasing);
    }

    /// 每个体素恰好映射到一个 bin, 且线性索引都在 `[0, nr_bins^2)` 范围内;
    /// 索引表与体积形状一致 (flatten/reshape 往返无损).
    #[test]
    fn test_map_range_and_shape() {
        let ima = Array3::<f32>::from_shape_fn((2, 3, 4), |(z, h, w)| (z + h + w) as f32 * 0.7);
        let gra = Array3::<f32>::from_shape_fn((2, 3, 4), |(z, h, w)| (z * h * w) as f32 * 0.3);
        let edges: Vec<f64> = (0..=6).map(|i| i as f64).collect();

        let index = HistogramIndex::build(ima.view(), gra.view(), &edges).unwrap();
        assert_eq!(index.nr_bins(), 6);
        assert_eq!(index.shape(), (2, 3, 4));
        let bound = (index.nr_bins() * index.nr_bins()) as u32;
        assert!(index.view().iter().all(|&lin| lin < bound));
    }

    /// 梯度模超过最后一个 bin 边界的体素被钳到边缘 bin,
    /// 不会产生非法线性索引.
    #[test]
    fn test_build_clamps_out_of_grid_values() {
        // 单个热点角: 角点处三个轴向的单侧差分都是满幅,
        // 梯度模达到 sqrt(3) * 强度上界.
        let mut ima = Array3::<f32>::zeros((2, 2, 2));
        ima[(1, 1, 1)] = 100.0;
        let gra = crate::data::gradient_magnitude(ima.view());
        let g_max = gra.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert!(g_max > 100.0);

        let edges: Vec<f64> = (0..=100).map(|i| i as f64).collect();
        let index = HistogramIndex::build(ima.view(), gra.view(), &edges).unwrap();
        let bound = (index.nr_bins() * index.nr_bins()) as u32;
        assert!(index.view().iter().all(|&lin| lin < bound));
        // 超界体素落在最高的梯度 bin 上.
        assert_eq!(index.bin_pos(index.bin_at((1, 1, 1))), (99, 99));
    }

    /// 线性索引的编码/分解互逆, 且分解次序为 (梯度 bin, 强度 bin).
    #[test]
    fn test_lin_encoding() {
        let ima = Array3::<f32>::from_elem((1, 1, 1), 2.5);
        let gra = Array3::<f32>::from_elem((1, 1, 1), 0.5);
        let edges: Vec<f64> = (0..=4).map(|i| i as f64).collect();
        let index = HistogramIndex::build(ima.view(), gra.view(), &edges).unwrap();

        // intensity bin 2, gradient bin 0 -> lin = 0 * 4 + 2.
        assert_eq!(index.bin_at((0, 0, 0)), 2);
        assert_eq!(index.bin_pos(2), (0, 2));
        assert_eq!(index.lin_index((0, 2)), 2);

        for lin in 0..16u32 {
            assert_eq!(index.lin_index(index.bin_pos(lin)), lin);
        }
    }

    /// `cycle_view` 按 `(2, 0, 1)` 置换形状, 三次后回到原状.
    #[test]
    fn test_cycle_view() {
        let ima = Array3::<f32>::from_shape_fn((2, 3, 4), |(z, h, w)| ((z + h + w) % 5) as f32);
        let gra = Array3::<f32>::zeros((2, 3, 4));
        let edges: Vec<f64> = (0..=5).map(|i| i as f64).collect();
        let mut index = HistogramIndex::build(ima.view(), gra.view(), &edges).unwrap();
        let original = index.clone();

        index.cycle_view();
        assert_eq!(index.shape(), (4, 2, 3));
        // 元素整体保持, 仅换轴.
        assert_eq!(index.bin_at((0, 1, 2)), original.bin_at((1, 2, 0)));

        index.cycle_view();
        index.cycle_view();
        assert_eq!(index.shape(), original.shape());
        assert_eq!(index.view(), original.view());
    }

    /// 联合计数直方图与逐体素映射一致.
    #[test]
    fn test_counts_consistency() {
        let ima = Array3::<f32>::from_shape_fn((1, 2, 2), |(_, h, w)| (h * 2 + w) as f32 + 0.5);
        let gra = Array3::<f32>::from_elem((1, 2, 2), 1.5);
        let p = {
            // 边界 [0, 4], 4 个 bin.
            let basis = Array3::<f32>::from_shape_fn((1, 1, 5), |(_, _, w)| w as f32);
            HistogramParams::from_intensity(basis.view()).unwrap()
        };

        let counts = p.counts(ima.view(), gra.view()).unwrap();
        assert_eq!(counts.sum(), 4);
        // 所有体素的梯度 bin 都是 1, 强度 bin 依次 0..4.
        for ib in 0..4 {
            assert_eq!(counts[(1, ib)], 1);
        }
    }
}
