//! 类型化的手势与控制事件.
//!
//! 手势源 (窗口系统适配层) 把原始回调翻译成 [`GestureEvent`] 流;
//! 滑块/按钮等离散控件翻译成 [`Command`]. 本 crate 只消费这两种流,
//! 不直接接触任何窗口系统对象. 事件流内的顺序是唯一的交付保证.

use crate::Idx2dF;

/// 指针按键.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PointerButton {
    /// 主键 (通常为左键): 拖拽扇区 / 套索笔迹 / 切片取点.
    Primary,

    /// 中键 (滚轮按下): 放大半径; 按住 Ctrl 时逆时针旋转.
    Middle,

    /// 次键 (通常为右键): 缩小半径; 按住 Ctrl 时顺时针旋转.
    Secondary,
}

/// 逻辑视图 (事件坐标所在的数据空间).
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ViewId {
    /// 2D 直方图视图, 坐标为 bin 网格坐标.
    Histogram,

    /// 图像切片视图, 坐标为体素坐标.
    Slice,
}

/// 修饰键.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    /// Ctrl: 把中/次键的缩放语义切换为旋转语义.
    Ctrl,
}

/// 指针/按键手势事件.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum GestureEvent {
    /// 指针按下.
    ButtonPress {
        /// 按下的键.
        button: PointerButton,
        /// 事件所在视图.
        view: ViewId,
        /// 视图数据空间坐标.
        pos: Idx2dF,
    },

    /// 指针移动 (仅在本 crate 关心的视图内才会投递).
    Motion {
        /// 事件所在视图.
        view: ViewId,
        /// 视图数据空间坐标.
        pos: Idx2dF,
    },

    /// 指针释放.
    ButtonRelease {
        /// 释放的键.
        button: PointerButton,
        /// 事件所在视图.
        view: ViewId,
        /// 视图数据空间坐标.
        pos: Idx2dF,
    },

    /// 修饰键按下.
    KeyPress(Modifier),

    /// 修饰键释放.
    KeyRelease(Modifier),
}

impl GestureEvent {
    /// `ButtonPress` 的简便构造.
    #[inline]
    pub fn press(button: PointerButton, view: ViewId, pos: Idx2dF) -> Self {
        Self::ButtonPress { button, view, pos }
    }

    /// `Motion` 的简便构造.
    #[inline]
    pub fn motion(view: ViewId, pos: Idx2dF) -> Self {
        Self::Motion { view, pos }
    }

    /// `ButtonRelease` 的简便构造.
    #[inline]
    pub fn release(button: PointerButton, view: ViewId, pos: Idx2dF) -> Self {
        Self::ButtonRelease { button, view, pos }
    }
}

/// 离散控件命令 (滑块与按钮).
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Command {
    /// 切片浏览滑块: 切换当前显示的切片.
    SetSlice(usize),

    /// 角度滑块: 绝对设置扇区的角度跨度 (度).
    SetAngularSpan(f64),

    /// 套索开关按钮: 在扇区模式与套索模式之间切换.
    ToggleLasso,

    /// 视图循环按钮: 把体积和索引表按 `(2, 0, 1)` 置换轴.
    CycleView,

    /// 复位按钮: 恢复扇区默认参数和中间切片.
    Reset,
}
