//! 掩码的持久化存储 (调试用灰度 PNG).

use image::ImageResult;
use ndarray::ArrayView2;
use std::path::Path;

use super::SelectionMask;
use crate::consts::label::is_selected;

/// 表明一个可以通过 **可视化友好** 模式持久化存储的掩码对象.
///
/// 意图是把掩码以肉眼易分辨的方式保存: 未选中为黑色, 选中 (任意非零标签)
/// 为白色, 而不是 "as is" 地保存接近全黑的小标签值.
pub trait ImgWriteVis {
    /// 按照可视化规则将掩码保存到 `path` 路径.
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 表明一个可以通过 **按原样** 模式持久化存储的掩码对象.
pub trait ImgWriteRaw {
    /// 按原样将掩码保存到 `path` 路径.
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()>;
}

/// 非零标签映射为白色.
#[inline]
fn pretty(label: u8) -> u8 {
    if is_selected(label) {
        u8::MAX
    } else {
        u8::MIN
    }
}

fn write_gray<P: AsRef<Path>>(
    data: ArrayView2<u8>,
    path: P,
    f: impl Fn(u8) -> u8,
) -> ImageResult<()> {
    let &[h, w] = data.shape() else {
        unreachable!()
    };
    let mut buf = image::GrayImage::new(w as u32, h as u32);
    for ((i, j), &pix) in data.indexed_iter() {
        buf.put_pixel(j as u32, i as u32, image::Luma([f(pix)]));
    }
    buf.save(path)
}

impl ImgWriteVis for SelectionMask {
    fn save<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        write_gray(self.view(), path, pretty)
    }
}

impl ImgWriteRaw for SelectionMask {
    fn save_raw<P: AsRef<Path>>(&self, path: P) -> ImageResult<()> {
        write_gray(self.view(), path, |p| p)
    }
}

/// 把一张投影出的图像空间标签掩码按可视化规则保存到 `path`.
pub fn save_projection_vis<P: AsRef<Path>>(mask: ArrayView2<u8>, path: P) -> ImageResult<()> {
    write_gray(mask, path, pretty)
}
