//! 直方图空间选区到图像空间的正向投影.
//!
//! 语义上等价于 "对选区中出现的每个标签值, 找出该标签覆盖的线性 bin 索引集合,
//! 再把索引表中命中的体素标为该标签". 实现上选区的行优先展开本身就是
//! `lin -> label` 查找表 (因为线性 bin 索引就是行优先展开下标),
//! 所以逐体素查表即可, 标签语义不变.

use ndarray::{Array2, Array3, ArrayView2, ArrayView3};

use crate::region::SelectionMask;

/// 把选区掩码投影到单张索引表切片上, 得到图像空间的标签掩码.
///
/// 输出与 `map_slice` 同形状; 体素取其所落 bin 在选区中的标签值
/// (未选中的 bin 得 0). 选区的 bin 个数与索引表不一致时 panic.
pub fn project_to_slice(map_slice: ArrayView2<u32>, mask: &SelectionMask) -> Array2<u8> {
    let table = mask.as_row_major_slice();
    map_slice.mapv(|lin| table[lin as usize])
}

/// 把选区掩码投影到整个索引表上, 得到体积级别的标签掩码. 仅在导出时使用.
///
/// 选区的 bin 个数与索引表不一致时 panic.
pub fn project_to_volume(map: ArrayView3<u32>, mask: &SelectionMask) -> Array3<u8> {
    let table = mask.as_row_major_slice();
    map.mapv(|lin| table[lin as usize])
}
