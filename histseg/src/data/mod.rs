//! 3D 体积 nii 文件基础数据结构.

use std::path::{Path, PathBuf};

use ndarray::{Array3, ArrayView, ArrayView2, ArrayViewMut, Axis, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use crate::{Idx2d, Idx3d};

pub mod gradient;
pub mod preproc;

pub use gradient::gradient_magnitude;
pub use preproc::{percentile, preprocess_default, scale_range, truncate_range};

/// `NiftiHeader` 是栈上大对象, 移动该对象的开销很可观.
/// 因此我们将其分配到堆上.
type BoxedHeader = Box<NiftiHeader>;

/// 将 (W, H, z) 转换成 (z, H, W). 以后均按照该模式访问.
#[inline]
fn get_shape_from_header(h: &NiftiHeader) -> Idx3d {
    // [W, H, z]. 体素个数数组.
    let [_, w, h, z, ..] = h.dim;
    (z as usize, h as usize, w as usize)
}

/// 3D nii 文件 header 的共用属性和部分通用操作.
pub trait NiftiHeaderAttr {
    /// 获取 header 部分.
    fn header(&self) -> &NiftiHeader;

    /// 获取数据形状大小.
    #[inline]
    fn shape(&self) -> Idx3d {
        get_shape_from_header(self.header())
    }

    /// 获取数据水平切片形状大小.
    #[inline]
    fn slice_shape(&self) -> Idx2d {
        let (_, h, w) = self.shape();
        (h, w)
    }

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }
}

/// nii 格式 3D 医学图像扫描, 包括 header 和标量体素数据. 体素值以 `f32` 保存.
///
/// 与 CT/MRI 的具体模态无关; 本 crate 只关心标量强度.
#[derive(Debug, Clone)]
pub struct MriScan {
    header: BoxedHeader,
    data: Array3<f32>,

    /// 数据来源路径. 导出文件名约定 (`_OUT.nii.gz`) 依赖它.
    source: PathBuf,
}

impl NiftiHeaderAttr for MriScan {
    #[inline]
    fn header(&self) -> &NiftiHeader {
        &self.header
    }
}

impl MriScan {
    /// 打开 nii 文件格式的 3D 扫描. `path` 为 nii 文件的本地路径.
    /// 如果打开成功, 则返回 `Ok(Self)`, 否则返回 `Err`.
    pub fn open<P: AsRef<Path>>(path: P) -> nifti::Result<Self> {
        let source = path.as_ref().to_owned();
        let obj = ReaderOptions::new().read_file(path.as_ref())?;
        let header = Box::new(obj.header().clone());

        // [W, H, z] -> [z, H, W].
        // hint: 原第一维向下增长, 原第二维向右增长.
        let data = obj
            .into_volume()
            .into_ndarray::<f32>()?
            .permuted_axes([2, 1, 0].as_slice());

        // The nature of nifti data field layout.
        debug_assert!(data.is_standard_layout());

        // 该操作不会生成 `Err`, 可直接 unwrap.
        let data =
            Array3::<f32>::from_shape_vec(get_shape_from_header(&header), data.into_raw_vec())
                .unwrap();

        Ok(Self {
            header,
            data,
            source,
        })
    }

    /// 根据裸数据直接创建实体, 供实验/测试目的使用.
    ///
    /// `data` 按照 \[z, H, W\] 格式组织. header 中只填充形状信息.
    pub fn from_parts(data: Array3<f32>, source: impl Into<PathBuf>) -> Self {
        let (z, h, w) = data.dim();
        let mut header = Box::<NiftiHeader>::default();
        header.dim = [3, w as u16, h as u16, z as u16, 1, 1, 1, 1];
        Self {
            header,
            data,
            source: source.into(),
        }
    }

    /// 数据来源路径.
    #[inline]
    pub fn source_path(&self) -> &Path {
        &self.source
    }

    /// 获取 3D 扫描 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<f32> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView<'_, f32, Ix3> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy. 预处理 (截断/缩放) 就地进行.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut<'_, f32, Ix3> {
        self.data.view_mut()
    }

    /// 计算整个体积的梯度模. 结果与原数据同形状.
    #[inline]
    pub fn gradient_magnitude(&self) -> Array3<f32> {
        gradient::gradient_magnitude(self.data.view())
    }
}
