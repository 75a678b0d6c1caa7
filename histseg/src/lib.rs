#![warn(missing_docs)] // <= 合适时移除它.

//! 核心库. 提供基于 2D 联合直方图 (强度 × 梯度模) 的 3D 医学图像交互式手动分割功能.
//!
//! 用户在直方图空间上拖拽/缩放/旋转一个扇形区域, 或用套索圈选任意多边形区域;
//! 程序实时将直方图空间的选区反向映射回图像空间体素, 并在导出时生成与原始体积
//! 形状一致的 {0, 1} 二值掩码 nifti 文件.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 窗口系统/绘图后端不在本 crate 范围内. 本 crate 只通过
//!    [`session::VisualSurface`] trait 向外推送图层数据, 从不读回像素.
//! 2. 在非期望情况下 (如索引越界), 程序会直接 panic, 而不会导致内存错误.
//!    As what Rust promises.
//!
//! # 功能地图
//!
//! ### 体素 → 直方图 bin 的逆直方图索引 ✅
//!
//! 对强度和梯度模两个数组用同一组 bin 边界做 digitize,
//! 得到与体积同形状的线性 bin 索引表.
//!
//! 实现位于 `histseg/src/hist`.
//!
//! ### 扇形区域原语 ✅
//!
//! 以 (中心, 半径, 角度范围) 描述的可变扇区, 支持平移/缩放/旋转/角度范围设置,
//! 并能生成 bin 网格上的布尔掩码. 角度有环绕 (跨 0° 缝) 语义.
//!
//! 实现位于 `histseg/src/region/sector.rs`.
//!
//! ### 掩码投影 ✅
//!
//! 直方图空间选区 → 图像切片/整个体积的正向投影,
//! 以及套索多边形 → 选区的反向投影 (含边界容差的多边形包含测试).
//!
//! 实现位于 `histseg/src/hist/project.rs` 与 `histseg/src/region/lasso.rs`.
//!
//! ### 交互会话状态机 ✅
//!
//! 把指针/按键手势流翻译成区域原语的变更, 同步重算选区并推送图层.
//! 所有交互状态 (当前切片号, 套索开关, 拖拽锚点等) 都建模为
//! [`session::Session`] 的字段, 不使用模块级全局量.
//!
//! 实现位于 `histseg/src/session`.
//!
//! ### 导出装配 ✅
//!
//! 由当前选区和逆直方图索引重建 3D 二值掩码, 按 `_OUT.nii.gz`
//! 命名约定写出 nifti 文件.
//!
//! 实现位于 `histseg/src/export.rs`.
//!
//! ### 预处理 ✅
//!
//! 百分位截断与线性缩放 (加速交互的固定显示范围), 以及 3D 梯度模计算.
//!
//! 实现位于 `histseg/src/data`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 高精度二维坐标. 手势事件的数据空间坐标和扇区中心都用它表示.
pub type Idx2dF = (f64, f64);

/// 3D 体积数据的加载与预处理.
pub mod data;

pub use data::{MriScan, NiftiHeaderAttr};

/// 逆直方图索引与掩码投影.
pub mod hist;

pub use hist::{HistogramError, HistogramIndex, HistogramParams};

/// 直方图空间的区域原语与选区掩码.
pub mod region;

pub use region::sector::SectorMask;
pub use region::{LassoPolygon, SelectionMask};

/// 交互会话 (手势状态机).
pub mod session;

pub use session::{Session, VisualSurface};

/// 选区导出.
pub mod export;

pub mod consts;

pub mod prelude;
