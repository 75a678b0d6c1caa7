//! 导出装配: 由选区和逆直方图索引重建 3D 二值掩码并写出 nifti 文件.

use std::fmt;
use std::path::{Path, PathBuf};

use log::{info, warn};
use ndarray::{Array3, ArrayView3};
use nifti::writer::WriterOptions;
use nifti::NiftiHeader;

use crate::data::{MriScan, NiftiHeaderAttr};
use crate::hist::HistogramIndex;
use crate::region::SelectionMask;

/// 导出错误.
#[derive(Debug)]
pub enum ExportError {
    /// 来源文件名没有以 `.nii` 或 `.nii.gz` 结尾, 无法派生导出文件名.
    UnknownExtension(PathBuf),

    /// nifti 写出失败.
    Nifti(nifti::NiftiError),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownExtension(p) => {
                write!(f, "无法从 {} 派生导出文件名 (非 nii 扩展名)", p.display())
            }
            Self::Nifti(e) => write!(f, "nifti 写出失败: {e}"),
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Nifti(e) => Some(e),
            _ => None,
        }
    }
}

impl From<nifti::NiftiError> for ExportError {
    fn from(e: nifti::NiftiError) -> Self {
        Self::Nifti(e)
    }
}

/// 由逆直方图索引和选区重建体积级 {0, 1} 掩码, 形状与体积一致.
///
/// 选区内任意非零标签的 bin 都映射为 1. 空选区得到全零掩码,
/// 留下告警日志但不视为错误.
pub fn assemble_volume(index: &HistogramIndex, selection: &SelectionMask) -> Array3<u8> {
    assert_eq!(
        selection.nr_bins(),
        index.nr_bins(),
        "选区网格与索引 bin 个数不一致"
    );
    if selection.is_empty() {
        warn!("选区为空, 导出结果为全零掩码");
    }

    let table = selection.as_row_major_slice();
    index
        .view()
        .mapv(|lin| u8::from(table[lin as usize] != 0))
}

/// 根据来源文件路径派生导出路径: `xxx.nii` 和 `xxx.nii.gz`
/// 都映射到同目录下的 `xxx_OUT.nii.gz`.
pub fn derive_out_path(source: &Path) -> Result<PathBuf, ExportError> {
    let name = source
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| ExportError::UnknownExtension(source.to_owned()))?;

    let stem = if let Some(s) = name.strip_suffix(".nii.gz") {
        s
    } else if let Some(s) = name.strip_suffix(".nii") {
        s
    } else {
        return Err(ExportError::UnknownExtension(source.to_owned()));
    };

    Ok(source.with_file_name(format!("{stem}_OUT.nii.gz")))
}

/// 以 `header` 为参照把 \[z, H, W\] 组织的掩码写出为 nifti 文件.
///
/// 写出前换轴回 nifti 的 \[W, H, z\] 存储次序.
pub fn write_mask(
    mask: ArrayView3<u8>,
    header: &NiftiHeader,
    path: &Path,
) -> Result<(), ExportError> {
    // [z, H, W] -> [W, H, z].
    let data = mask.permuted_axes([2, 1, 0]);
    WriterOptions::new(path)
        .reference_header(header)
        .write_nifti(&data)?;
    Ok(())
}

/// 导出入口: 装配掩码, 按命名约定写到来源文件旁, 返回写出的路径.
pub fn export_nifti(
    scan: &MriScan,
    index: &HistogramIndex,
    selection: &SelectionMask,
) -> Result<PathBuf, ExportError> {
    debug_assert_eq!(scan.shape(), index.shape(), "索引表与体积形状不一致");

    let out = derive_out_path(scan.source_path())?;
    let mask = assemble_volume(index, selection);
    write_mask(mask.view(), scan.header(), &out)?;
    info!("掩码已写出到 {}", out.display());
    Ok(out)
}
