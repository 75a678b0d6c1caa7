//! 通用常量.

/// 选区掩码像素值.
pub mod label {
    /// 未选中的 bin.
    pub const UNSELECTED: u8 = 0;

    /// 已选中的 bin.
    pub const SELECTED: u8 = 1;

    /// bin 是否被选中?
    #[inline]
    pub const fn is_selected(p: u8) -> bool {
        p != UNSELECTED
    }

    /// bin 是否未被选中?
    #[inline]
    pub const fn is_unselected(p: u8) -> bool {
        p == UNSELECTED
    }
}

/// 扇区初始半径参数. 径向判据比较距离平方, 故量纲为 bin 的平方.
pub const DEFAULT_SECTOR_RADIUS: f64 = 200.0;

/// 扇区初始角度范围 (整圆), 以度为单位.
pub const DEFAULT_SECTOR_THETA: (f64, f64) = (0.0, 360.0);

/// 扇区半径参数下限. `scale_radius` 的结果不会低于该值.
pub const MIN_SECTOR_RADIUS: f64 = 1e-6;

/// 单次手势放大扇区半径的倍率.
pub const SCALE_UP_FACTOR: f64 = 1.05;

/// 单次手势缩小扇区半径的倍率.
pub const SCALE_DOWN_FACTOR: f64 = 0.95;

/// 单次手势旋转扇区的角度步长, 以度为单位.
pub const ROTATE_STEP_DEG: f64 = 10.0;

/// 套索多边形包含测试的边界容差, 以 bin 为单位.
pub const LASSO_TOLERANCE: f64 = 1.5;

/// 预处理默认下截断百分位.
pub const DEFAULT_PERC_MIN: f64 = 0.25;

/// 预处理默认上截断百分位.
pub const DEFAULT_PERC_MAX: f64 = 99.75;

/// 预处理默认缩放上限. 较小的值能带来更快的交互界面 (0-500 或 600 已足够).
pub const DEFAULT_SCALE_FACTOR: f64 = 500.0;

/// 预处理默认缩放余量, 保证最大数据点落在最后一个 bin 的内部.
pub const DEFAULT_SCALE_DELTA: f64 = 0.0001;
