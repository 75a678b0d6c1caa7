//! 交互会话状态机.
//!
//! [`Session`] 是选区状态的唯一拥有者: 扇区原语、选区掩码、当前切片号、
//! 套索路径和各种手势瞬态都建模为它的字段, 随会话创建与销毁 (无环境全局量).
//! 依赖是单向的: 会话持有逆直方图索引、扇区与可视化表面的引用,
//! 区域原语自身不回指任何可视化状态.
//!
//! 每个改变选区的状态转移都会 **同步地** 完成: 重算直方图掩码,
//! 投影到当前切片, 把两张图层推给 [`VisualSurface`] 并请求重绘,
//! 全部发生在处理手势的同一线程上.

use std::borrow::Cow;
use std::path::PathBuf;

use log::debug;
use ndarray::{Array2, Array3};
use num::ToPrimitive;

use crate::consts::{
    DEFAULT_SECTOR_RADIUS, DEFAULT_SECTOR_THETA, LASSO_TOLERANCE, ROTATE_STEP_DEG,
    SCALE_DOWN_FACTOR, SCALE_UP_FACTOR,
};
use crate::hist::{project_to_slice, HistogramIndex};
use crate::region::sector::InitSectorError;
use crate::region::{CompactSelectionMask, LassoPolygon, SectorMask, SelectionMask};
use crate::{export, Idx2d, Idx2dF};

pub mod event;

pub use event::{Command, GestureEvent, Modifier, PointerButton, ViewId};

/// 推送给可视化表面的命名图层.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Layer {
    /// 直方图视图上的选区掩码.
    HistogramMask,

    /// 切片视图上的投影掩码.
    SliceMask,

    /// 切片取点时的瞬态 bin 标记.
    PickMarker,
}

/// 可视化协作方接口. 本 crate 只向它推送图层数据, 从不读回像素.
pub trait VisualSurface {
    /// 更新命名图层的数据.
    fn set_layer_data(&mut self, layer: Layer, data: Array2<u8>);

    /// 清除命名图层.
    fn clear_layer(&mut self, layer: Layer);

    /// 请求重绘. 调用与手势处理同步发生.
    fn redraw(&mut self);
}

/// 选区交互模式. 两种模式互斥, 由显式开关切换.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    /// 扇区原语驱动: 拖拽/缩放/旋转.
    Sector,

    /// 套索驱动: 自由多边形圈选, 累积并集.
    Lasso,
}

/// 拖拽锚点: 按下时的扇区中心与指针位置.
#[derive(Copy, Clone, Debug)]
struct DragAnchor {
    center: Idx2dF,
    pointer: Idx2dF,
}

/// 一次交互分割会话.
///
/// 泛型参数 `S` 是可视化协作方; 测试中可以用记录型 mock 替代.
pub struct Session<S: VisualSurface> {
    index: HistogramIndex,
    sector: SectorMask,
    selection: SelectionMask,
    slice_idx: usize,
    mode: Mode,

    /// 视图循环次数 mod 3. 导出前据此把索引表转回加载时的轴次序.
    cycle_count: u8,

    // 手势瞬态. 同一时刻至多一个手势在进行中.
    drag: Option<DragAnchor>,
    lasso_active: bool,
    lasso_path: LassoPolygon,
    pick_marker: Option<Idx2d>,
    ctrl_held: bool,

    surface: S,
}

impl<S: VisualSurface> Session<S> {
    /// 以默认扇区参数创建会话, 并向 `surface` 推送初始图层.
    ///
    /// 初始切片为 z 方向中间一层; 初始扇区为以 bin 网格原点为中心的整圆.
    pub fn new(index: HistogramIndex, surface: S) -> Result<Self, InitSectorError> {
        let nr = index.nr_bins();
        let sector = SectorMask::new(
            (nr, nr),
            (0.0, 0.0),
            DEFAULT_SECTOR_RADIUS,
            DEFAULT_SECTOR_THETA,
        )?;
        let selection = SelectionMask::from_sector(&sector);
        let slice_idx = index.len_z() / 2;

        let mut session = Self {
            index,
            sector,
            selection,
            slice_idx,
            mode: Mode::Sector,
            cycle_count: 0,
            drag: None,
            lasso_active: false,
            lasso_path: LassoPolygon::new(),
            pick_marker: None,
            ctrl_held: false,
            surface,
        };
        session.push_mask_layers();
        Ok(session)
    }

    /// 当前扇区原语.
    #[inline]
    pub fn sector(&self) -> &SectorMask {
        &self.sector
    }

    /// 当前选区掩码.
    #[inline]
    pub fn selection(&self) -> &SelectionMask {
        &self.selection
    }

    /// 当前交互模式.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// 当前切片号.
    #[inline]
    pub fn slice_index(&self) -> usize {
        self.slice_idx
    }

    /// 逆直方图索引.
    #[inline]
    pub fn index(&self) -> &HistogramIndex {
        &self.index
    }

    /// 可视化表面.
    #[inline]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// 暂存当前选区的压缩快照.
    #[inline]
    pub fn snapshot_selection(&self) -> CompactSelectionMask {
        self.selection.compress()
    }

    /// 用压缩快照恢复选区并刷新图层.
    pub fn restore_selection(&mut self, snapshot: CompactSelectionMask) {
        let restored = snapshot.decompress();
        assert_eq!(restored.nr_bins(), self.selection.nr_bins(), "快照网格不符");
        self.selection = restored;
        self.push_mask_layers();
    }

    /// 消费一个手势事件, 推进状态机.
    pub fn handle(&mut self, event: GestureEvent) {
        match event {
            GestureEvent::KeyPress(Modifier::Ctrl) => self.ctrl_held = true,
            GestureEvent::KeyRelease(Modifier::Ctrl) => self.ctrl_held = false,

            GestureEvent::ButtonPress {
                button: PointerButton::Primary,
                view: ViewId::Histogram,
                pos,
            } => self.on_primary_press_histogram(pos),

            GestureEvent::ButtonPress {
                button: PointerButton::Primary,
                view: ViewId::Slice,
                pos,
            } => self.on_primary_press_slice(pos),

            GestureEvent::ButtonPress {
                button,
                view: ViewId::Histogram,
                ..
            } => self.on_step_press(button),

            GestureEvent::ButtonPress { button, view, .. } => {
                debug!("忽略 {view:?} 视图上的 {button:?} 按下");
            }

            GestureEvent::Motion {
                view: ViewId::Histogram,
                pos,
            } => self.on_motion_histogram(pos),

            // 指针移出直方图视图: 手势保持挂起, 不产生状态变更.
            GestureEvent::Motion { .. } => {}

            GestureEvent::ButtonRelease {
                button: PointerButton::Primary,
                ..
            } => self.on_primary_release(),

            GestureEvent::ButtonRelease { .. } => {}
        }
    }

    /// 执行一个离散控件命令.
    pub fn apply(&mut self, cmd: Command) {
        match cmd {
            Command::SetSlice(z) => {
                self.slice_idx = z.min(self.index.len_z() - 1);
                self.push_slice_mask();
                self.surface.redraw();
            }
            Command::SetAngularSpan(span) => {
                self.sector.set_angular_span(span);
                self.refresh_from_sector();
            }
            Command::ToggleLasso => {
                self.cancel_transients();
                self.mode = match self.mode {
                    Mode::Sector => Mode::Lasso,
                    Mode::Lasso => Mode::Sector,
                };
                debug!("交互模式切换为 {:?}", self.mode);
            }
            Command::CycleView => {
                self.index.cycle_view();
                self.cycle_count = (self.cycle_count + 1) % 3;
                self.slice_idx = self.slice_idx.min(self.index.len_z() - 1);
                self.push_slice_mask();
                self.surface.redraw();
            }
            Command::Reset => {
                self.cancel_transients();
                self.sector.reset();
                self.slice_idx = self.index.len_z() / 2;
                self.refresh_from_sector();
            }
        }
    }

    /// 由当前选区和索引重建体积级 {0, 1} 掩码, 轴次序为加载时的 \[z, H, W\]
    /// (与视图循环了多少次无关).
    ///
    /// 空选区会得到全零掩码并留下告警日志, 这不是错误.
    pub fn export_volume(&self) -> Array3<u8> {
        export::assemble_volume(&self.canonical_index(), &self.selection)
    }

    /// 导出按钮入口: 把当前选区装配成掩码, 按命名约定写到 `scan`
    /// 来源文件旁. 返回写出的路径.
    ///
    /// `scan` 必须是构建本会话索引所用的那个体积.
    pub fn export_nifti(&self, scan: &crate::MriScan) -> Result<PathBuf, export::ExportError> {
        export::export_nifti(scan, &self.canonical_index(), &self.selection)
    }

    /// 把索引表转回加载时的轴次序 (继续循环到一个完整周期).
    fn canonical_index(&self) -> Cow<'_, HistogramIndex> {
        if self.cycle_count == 0 {
            return Cow::Borrowed(&self.index);
        }
        let mut index = self.index.clone();
        for _ in self.cycle_count..3 {
            index.cycle_view();
        }
        Cow::Owned(index)
    }

    fn on_primary_press_histogram(&mut self, pos: Idx2dF) {
        match self.mode {
            Mode::Lasso => {
                self.lasso_active = true;
                self.lasso_path.clear();
                self.lasso_path.push(pos);
            }
            Mode::Sector => {
                if self.ctrl_held {
                    return;
                }
                if self.sector.contains(pos) {
                    self.drag = Some(DragAnchor {
                        center: self.sector.center(),
                        pointer: pos,
                    });
                } else {
                    debug!("指针落在扇区之外, 不启动拖拽");
                }
            }
        }
    }

    /// 切片视图取点: 把指针下的体素映射回它的直方图 bin, 作为瞬态标记图层推送.
    fn on_primary_press_slice(&mut self, pos: Idx2dF) {
        let (Some(h), Some(w)) = (pos.0.floor().to_usize(), pos.1.floor().to_usize()) else {
            debug!("切片取点落在体素网格之外");
            return;
        };
        let map_slice = self.index.slice_at(self.slice_idx);
        let Some(&lin) = map_slice.get((h, w)) else {
            debug!("切片取点落在体素网格之外");
            return;
        };

        let bin = self.index.bin_pos(lin);
        self.pick_marker = Some(bin);

        let nr = self.index.nr_bins();
        let mut marker = Array2::<u8>::zeros((nr, nr));
        marker[bin] = crate::consts::label::SELECTED;
        self.surface.set_layer_data(Layer::PickMarker, marker);
        self.surface.redraw();
    }

    /// 中/次键单发变更: 无修饰时缩放半径, 按住 Ctrl 时旋转.
    fn on_step_press(&mut self, button: PointerButton) {
        if self.mode == Mode::Lasso {
            return;
        }
        match (button, self.ctrl_held) {
            (PointerButton::Middle, false) => self.sector.scale_radius(SCALE_UP_FACTOR),
            (PointerButton::Secondary, false) => self.sector.scale_radius(SCALE_DOWN_FACTOR),
            (PointerButton::Middle, true) => self.sector.rotate(ROTATE_STEP_DEG),
            (PointerButton::Secondary, true) => self.sector.rotate(-ROTATE_STEP_DEG),
            (PointerButton::Primary, _) => unreachable!(),
        }
        self.refresh_from_sector();
    }

    fn on_motion_histogram(&mut self, pos: Idx2dF) {
        if let Some(anchor) = self.drag {
            let dx = pos.0 - anchor.pointer.0;
            let dy = pos.1 - anchor.pointer.1;
            self.sector
                .set_center((anchor.center.0 + dx, anchor.center.1 + dy));
            self.refresh_from_sector();
        } else if self.lasso_active {
            self.lasso_path.push(pos);
        }
    }

    fn on_primary_release(&mut self) {
        self.drag = None;

        if self.lasso_active {
            self.lasso_active = false;
            if self.lasso_path.len() >= 2 {
                self.selection
                    .union_polygon(&self.lasso_path, LASSO_TOLERANCE);
                self.push_mask_layers();
            }
            self.lasso_path.clear();
        }

        // 显式检查瞬态标记是否存在, 存在才清除.
        if self.pick_marker.take().is_some() {
            self.surface.clear_layer(Layer::PickMarker);
            self.surface.redraw();
        }
    }

    /// 丢弃所有进行中的手势瞬态.
    fn cancel_transients(&mut self) {
        self.drag = None;
        self.lasso_active = false;
        self.lasso_path.clear();
        if self.pick_marker.take().is_some() {
            self.surface.clear_layer(Layer::PickMarker);
        }
    }

    /// 扇区驱动的选区变更: 重算布尔掩码并整体覆写选区, 然后刷新图层.
    fn refresh_from_sector(&mut self) {
        self.selection.overwrite_with_sector(&self.sector);
        self.push_mask_layers();
    }

    /// 把直方图掩码和切片投影推给可视化表面并请求重绘.
    fn push_mask_layers(&mut self) {
        self.surface
            .set_layer_data(Layer::HistogramMask, self.selection.view().to_owned());
        self.push_slice_mask();
        self.surface.redraw();
    }

    fn push_slice_mask(&mut self) {
        let projected = project_to_slice(self.index.slice_at(self.slice_idx), &self.selection);
        self.surface.set_layer_data(Layer::SliceMask, projected);
    }
}
