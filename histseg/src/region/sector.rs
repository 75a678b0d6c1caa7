//! bin 网格上的可变扇区原语.
//!
//! 网格按行优先组织: 第一轴 (行) 对应梯度 bin, 第二轴 (列) 对应强度 bin.
//! 角度以度为单位: 行增加的方向为 0°, 列增加的方向为 90°,
//! 沿逆时针方向增长并归一化到 `[0, 360)`.
//!
//! 径向判据比较的是 **到中心的距离平方与半径参数**
//! (即 `(i-cx)^2 + (j-cy)^2 <= radius`); 半径参数的量纲是 bin 的平方.
//! 例如半径 1.5 的整圆恰好覆盖中心 bin 及其 4-邻域.

use ndarray::Array2;

use crate::consts::label::{SELECTED, UNSELECTED};
use crate::consts::MIN_SECTOR_RADIUS;
use crate::{Idx2d, Idx2dF};

/// [`SectorMask`] 初始化错误.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum InitSectorError {
    /// bin 网格为空.
    EmptyShape,

    /// 半径不是正有限数.
    NonPositiveRadius,

    /// 角度含非有限值.
    ThetaNotFinite,

    /// 空角度范围. 该情况不在 `SectorMask` 的考虑范围内.
    EmptyAngularSpan,
}

/// 构建时的参数快照, 供 `reset` 恢复.
#[derive(Copy, Clone, Debug, PartialEq)]
struct SectorDefaults {
    center: Idx2dF,
    radius: f64,
    theta_start: f64,
    span: f64,
}

/// bin 网格上的一个可变扇区, 由中心、半径参数和角度范围组成.
///
/// 该结构不负责网格越界检测: 中心可以移出网格之外,
/// [`SectorMask::binary_mask`] 的成员测试天然排除网格外的 bin.
#[derive(Clone, Debug, PartialEq)]
pub struct SectorMask {
    shape: Idx2d,
    center: Idx2dF,
    radius: f64,

    /// 起始角, `[0, 360)`.
    theta_start: f64,

    /// 角度跨度, `(0, 360]`. 从 `theta_start` 逆时针扫过 `span` 度.
    span: f64,

    defaults: SectorDefaults,
}

/// 把任意角度归一化到 `[0, 360)`.
#[inline]
fn wrap_deg(deg: f64) -> f64 {
    deg.rem_euclid(360.0)
}

impl SectorMask {
    /// 在形状为 `shape` 的 bin 网格上, 以 `center` 为中心、`radius` 为半径参数、
    /// `theta = (起始角, 终止角)` (度) 创建扇区. 扇区扫过的区域被认定为从起始角出发,
    /// 沿 **逆时针** 方向前进直到触碰到终止角所经过的所有区域.
    ///
    /// 终止角与起始角之差为 360 的整数倍时视为整圆 (如默认的 `(0, 360)`).
    ///
    /// # 返回值
    ///
    /// - `shape` 含零维时返回 `Err(InitSectorError::EmptyShape)`;
    /// - `radius` 非正或非有限时返回 `Err(InitSectorError::NonPositiveRadius)`;
    /// - `theta` 含非有限值时返回 `Err(InitSectorError::ThetaNotFinite)`;
    /// - 其他情况下成功, 返回 `Ok(Self)`.
    pub fn new(
        shape: Idx2d,
        center: Idx2dF,
        radius: f64,
        theta: (f64, f64),
    ) -> Result<Self, InitSectorError> {
        if shape.0 == 0 || shape.1 == 0 {
            return Err(InitSectorError::EmptyShape);
        }
        if !(radius.is_finite() && radius > 0.0) {
            return Err(InitSectorError::NonPositiveRadius);
        }
        let (t0, t1) = theta;
        if !t0.is_finite() || !t1.is_finite() {
            return Err(InitSectorError::ThetaNotFinite);
        }

        let theta_start = wrap_deg(t0);
        let span = match wrap_deg(t1 - t0) {
            s if s > 0.0 => s,
            // 差为 0 mod 360: 起止角相同为空范围, 否则为整圆.
            _ if t0 == t1 => return Err(InitSectorError::EmptyAngularSpan),
            _ => 360.0,
        };

        let defaults = SectorDefaults {
            center,
            radius,
            theta_start,
            span,
        };
        Ok(Self {
            shape,
            center,
            radius,
            theta_start,
            span,
            defaults,
        })
    }

    /// bin 网格形状.
    #[inline]
    pub fn shape(&self) -> Idx2d {
        self.shape
    }

    /// 中心坐标 (行方向, 列方向).
    #[inline]
    pub fn center(&self) -> Idx2dF {
        self.center
    }

    /// 半径参数.
    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// 角度范围 (起始角, 终止角), 度. 整圆表示为 `(start, start + 360)`.
    #[inline]
    pub fn theta(&self) -> (f64, f64) {
        (self.theta_start, self.theta_start + self.span)
    }

    /// 角度跨度, 度.
    #[inline]
    pub fn angular_span(&self) -> f64 {
        self.span
    }

    /// 该扇区是否是一个圆 (特殊情况)?
    #[inline]
    pub fn is_circle(&self) -> bool {
        self.span >= 360.0
    }

    /// 平移中心. 不做边界钳制, 扇区可以部分或全部移出网格.
    #[inline]
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.center.0 += dx;
        self.center.1 += dy;
    }

    /// 把中心移动到绝对位置 `center`.
    #[inline]
    pub fn set_center(&mut self, center: Idx2dF) {
        self.center = center;
    }

    /// 按倍率 `factor` 缩放半径参数.
    ///
    /// 结果被钳制到不小于 [`MIN_SECTOR_RADIUS`]; 非正的 `factor`
    /// 属于调用方编程错误, 同样只会把半径钳到下限而不会失败.
    pub fn scale_radius(&mut self, factor: f64) {
        let scaled = if factor > 0.0 {
            self.radius * factor
        } else {
            MIN_SECTOR_RADIUS
        };
        self.radius = scaled.max(MIN_SECTOR_RADIUS);
    }

    /// 把起始角和终止角同时旋转 `delta` 度, 并环绕回 `[0, 360)`.
    /// 角度跨度保持不变.
    #[inline]
    pub fn rotate(&mut self, delta: f64) {
        self.theta_start = wrap_deg(self.theta_start + delta);
    }

    /// 直接设置角度跨度 (绝对设置, 区别于相对旋转). 起始角保持不变.
    ///
    /// `span` 模 360 后为 0 时 (含 0 和 360 本身) 视为整圆.
    #[inline]
    pub fn set_angular_span(&mut self, span: f64) {
        self.span = match wrap_deg(span) {
            s if s > 0.0 => s,
            _ => 360.0,
        };
    }

    /// 恢复构建时的默认参数.
    pub fn reset(&mut self) {
        let SectorDefaults {
            center,
            radius,
            theta_start,
            span,
        } = self.defaults;
        self.center = center;
        self.radius = radius;
        self.theta_start = theta_start;
        self.span = span;
    }

    /// 获取点 `(x, y)` 相对于中心的角度, 度, `[0, 360)`.
    fn angle_to(&self, (x, y): Idx2dF) -> f64 {
        let dx = x - self.center.0;
        let dy = y - self.center.1;
        wrap_deg(f64::atan2(dy, dx).to_degrees())
    }

    /// 判断角度 `deg` 是否落在扇区的角度范围内 (两端均含).
    ///
    /// 终止角小于起始角 (跨 0° 缝) 的情形通过差值环绕自然处理.
    fn angle_within(&self, deg: f64) -> bool {
        if self.is_circle() {
            return true;
        }
        wrap_deg(deg - self.theta_start) <= self.span
    }

    /// 判断点 `(x, y)` 是否被包含在扇区中.
    pub fn contains(&self, point: Idx2dF) -> bool {
        let dx = point.0 - self.center.0;
        let dy = point.1 - self.center.1;
        let r2 = dx * dx + dy * dy;
        if r2 > self.radius {
            return false;
        }
        self.angle_within(self.angle_to(point))
    }

    /// 生成网格上的布尔掩码: 被扇区覆盖的 bin 为 [`SELECTED`], 其余为
    /// [`UNSELECTED`]. 这是 "bin 在扇区内" 的权威定义.
    ///
    /// 整圆不会在 0°/360° 缝处重复计入任何 bin.
    pub fn binary_mask(&self) -> Array2<u8> {
        Array2::from_shape_fn(self.shape, |(i, j)| {
            if self.contains((i as f64, j as f64)) {
                SELECTED
            } else {
                UNSELECTED
            }
        })
    }
}
