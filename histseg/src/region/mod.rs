//! 直方图空间的区域原语与选区掩码.
//!
//! [`SelectionMask`] 是 "当前选中了哪些 bin" 的唯一权威定义.
//! 扇区驱动的交互整体覆写它, 套索驱动的交互在它上面做累积并集.

use std::borrow::Cow;
use std::io::{Read, Write};

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use ndarray::{Array2, ArrayView2};

use crate::consts::label::{is_selected, SELECTED, UNSELECTED};
use crate::Idx2d;

pub mod lasso;
pub mod save;
pub mod sector;

pub use lasso::LassoPolygon;
pub use save::{ImgWriteRaw, ImgWriteVis};
pub use sector::SectorMask;

/// bin 网格上的选区掩码, 形状为 `(nr_bins, nr_bins)`.
///
/// 行对应梯度 bin, 列对应强度 bin (与逆直方图索引的线性编码一致).
/// 标签 0 表示未选中; 选区累积统一写 [`SELECTED`],
/// 但投影对任意 `u8` 标签都保持原值.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionMask {
    data: Array2<u8>,
}

impl SelectionMask {
    /// 创建 `nr_bins × nr_bins` 的全空选区.
    pub fn new(nr_bins: usize) -> Self {
        Self {
            data: Array2::zeros((nr_bins, nr_bins)),
        }
    }

    /// 由扇区原语生成选区 (整体覆写语义的构造形式).
    #[inline]
    pub fn from_sector(sector: &SectorMask) -> Self {
        Self {
            data: sector.binary_mask(),
        }
    }

    /// bin 个数 (单轴).
    #[inline]
    pub fn nr_bins(&self) -> usize {
        self.data.nrows()
    }

    /// 掩码形状.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.data.dim()
    }

    /// 获得底层数据的一份不可变 shallow copy.
    #[inline]
    pub fn view(&self) -> ArrayView2<u8> {
        self.data.view()
    }

    /// 获取 bin `pos` 的标签值. 越界时返回 `None`.
    #[inline]
    pub fn get(&self, pos: Idx2d) -> Option<&u8> {
        self.data.get(pos)
    }

    /// 把 bin `pos` 标记为选中. 越界时 panic.
    #[inline]
    pub fn select_bin(&mut self, pos: Idx2d) {
        self.data[pos] = SELECTED;
    }

    /// 把 bin `pos` 写为任意标签值. 越界时 panic.
    #[inline]
    pub fn set_bin(&mut self, pos: Idx2d, label: u8) {
        self.data[pos] = label;
    }

    /// 选区是否为空 (全零)?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.iter().all(|&p| !is_selected(p))
    }

    /// 统计值为 `label` 的 bin 总个数.
    #[inline]
    pub fn count(&self, label: u8) -> usize {
        self.data.iter().filter(|&&p| p == label).count()
    }

    /// 清空选区.
    pub fn clear(&mut self) {
        self.data.fill(UNSELECTED);
    }

    /// 用扇区的布尔掩码整体覆写选区. 扇区的每次变更都走该路径.
    ///
    /// 扇区网格形状与选区不一致时 panic.
    pub fn overwrite_with_sector(&mut self, sector: &SectorMask) {
        let mask = sector.binary_mask();
        assert_eq!(mask.dim(), self.data.dim(), "扇区网格与选区形状不一致");
        self.data = mask;
    }

    /// 把闭合多边形 `poly` 内部 (含 `tolerance` 容差的边界) 的所有 bin
    /// 并入选区. 已选中的 bin 保持不变 (累积并集, 非替换).
    pub fn union_polygon(&mut self, poly: &LassoPolygon, tolerance: f64) {
        let (rows, cols) = self.shape();
        for i in 0..rows {
            for j in 0..cols {
                if poly.contains((i as f64, j as f64), tolerance) {
                    self.data[(i, j)] = SELECTED;
                }
            }
        }
    }

    /// 收集所有选中 bin 的线性索引 (行优先编码), 按升序排列.
    pub fn selected_lin_indices(&self) -> Vec<u32> {
        self.as_row_major_slice()
            .iter()
            .enumerate()
            .filter_map(|(lin, &p)| is_selected(p).then_some(lin as u32))
            .collect()
    }

    /// 获得行优先存储的序列化数据.
    /// 当原始数据本身就是行优先格式时, 可以避免一次 deepcopy.
    ///
    /// 注意行优先展开下标恰好就是线性 bin 索引.
    pub fn as_row_major_slice(&self) -> Cow<[u8]> {
        if self.data.is_standard_layout() {
            Cow::Borrowed(self.data.as_slice().unwrap())
        } else {
            Cow::Owned(self.data.iter().copied().collect())
        }
    }

    /// 压缩数据, 供模式切换前后廉价地暂存/恢复选区.
    pub fn compress(&self) -> CompactSelectionMask {
        let buf = self.as_row_major_slice();
        let mut e = ZlibEncoder::new(Vec::with_capacity(8), Compression::best());
        e.write_all(buf.as_ref()).expect("Compression error");
        CompactSelectionMask {
            buf: e.finish().expect("Compression error"),
            sh: self.shape(),
        }
    }
}

/// 压缩存储的 [`SelectionMask`]; 不透明类型.
#[derive(Debug, Clone)]
pub struct CompactSelectionMask {
    /// 压缩的不透明字节流.
    buf: Vec<u8>,

    /// 形状.
    sh: Idx2d,
}

impl CompactSelectionMask {
    /// 解压缩数据.
    pub fn decompress(self) -> SelectionMask {
        let Self { buf, sh: (h, w) } = self;
        let mut d = ZlibDecoder::new(buf.as_slice());
        let mut buf = Vec::with_capacity(h * w);
        d.read_to_end(&mut buf).expect("Decompression error");
        debug_assert_eq!(buf.len(), h * w);
        let data = Array2::<u8>::from_shape_vec((h, w), buf).unwrap();
        SelectionMask { data }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_count() {
        let mut m = SelectionMask::new(4);
        assert!(m.is_empty());
        assert_eq!(m.count(SELECTED), 0);

        m.select_bin((2, 3));
        assert!(!m.is_empty());
        assert_eq!(m.count(SELECTED), 1);

        m.clear();
        assert!(m.is_empty());
    }

    /// 线性索引与 (梯度 bin, 强度 bin) 的行优先编码一致.
    #[test]
    fn test_selected_lin_indices() {
        let mut m = SelectionMask::new(4);
        m.select_bin((0, 1));
        m.select_bin((2, 3));
        assert_eq!(m.selected_lin_indices(), vec![1, 11]);
    }

    /// 压缩/解压往返保持数据不变.
    #[test]
    fn test_compact_round_trip() {
        let mut m = SelectionMask::new(8);
        for i in 0..8 {
            m.set_bin((i, 7 - i), (i % 3) as u8);
        }
        let restored = m.compress().decompress();
        assert_eq!(restored, m);
    }

    /// 多次套索并集是累积的.
    #[test]
    fn test_union_accumulates() {
        let mut m = SelectionMask::new(8);

        let mut first = LassoPolygon::new();
        for v in [(0.0, 0.0), (0.0, 2.0), (2.0, 2.0), (2.0, 0.0)] {
            first.push(v);
        }
        m.union_polygon(&first, 0.0);
        let after_first = m.count(SELECTED);
        assert!(after_first > 0);

        let mut second = LassoPolygon::new();
        for v in [(5.0, 5.0), (5.0, 7.0), (7.0, 7.0), (7.0, 5.0)] {
            second.push(v);
        }
        m.union_polygon(&second, 0.0);

        // 第一笔的选中结果保持不变.
        assert!(m.count(SELECTED) > after_first);
        assert_eq!(m.get((1, 1)), Some(&SELECTED));
        assert_eq!(m.get((6, 6)), Some(&SELECTED));
    }
}
