//! 套索多边形与包含测试.
//!
//! 套索手势在 bin 网格坐标系里累积一个闭合多边形 (末顶点与首顶点之间隐式闭合).
//! 包含测试采用奇偶规则 (射线法), 并对边界附加一个小的距离容差,
//! 使紧贴笔迹的 bin 也被计入. 自相交的退化路径同样能得到确定的布尔结果.

use crate::Idx2dF;

/// 套索手势累积出的闭合多边形.
#[derive(Debug, Clone, Default)]
pub struct LassoPolygon {
    verts: Vec<Idx2dF>,
}

/// 点 `p` 到线段 `ab` 的欧几里得距离.
fn dist_to_segment(p: Idx2dF, a: Idx2dF, b: Idx2dF) -> f64 {
    let (ax, ay) = a;
    let (bx, by) = b;
    let (px, py) = p;

    let (vx, vy) = (bx - ax, by - ay);
    let len2 = vx * vx + vy * vy;
    let t = if len2 > 0.0 {
        ((px - ax) * vx + (py - ay) * vy) / len2
    } else {
        0.0
    }
    .clamp(0.0, 1.0);

    let (cx, cy) = (ax + t * vx, ay + t * vy);
    f64::hypot(px - cx, py - cy)
}

impl LassoPolygon {
    /// 创建空路径.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个顶点 (指针移动事件的数据空间坐标).
    #[inline]
    pub fn push(&mut self, vert: Idx2dF) {
        self.verts.push(vert);
    }

    /// 顶点个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.verts.len()
    }

    /// 路径是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.verts.is_empty()
    }

    /// 清空路径, 供下一笔套索复用.
    #[inline]
    pub fn clear(&mut self) {
        self.verts.clear();
    }

    /// 顶点序列.
    #[inline]
    pub fn verts(&self) -> &[Idx2dF] {
        &self.verts
    }

    /// 遍历多边形的所有边 (含末顶点到首顶点的闭合边).
    fn edges(&self) -> impl Iterator<Item = (Idx2dF, Idx2dF)> + '_ {
        let n = self.verts.len();
        (0..n).map(move |i| (self.verts[i], self.verts[(i + 1) % n]))
    }

    /// 判断点 `p` 是否在多边形内部, 或距多边形边界不超过 `tolerance`.
    ///
    /// 内部判定用奇偶规则; 顶点不足 3 个的退化路径没有内部,
    /// 只保留边界容差判定. 自相交路径按奇偶规则给出确定结果.
    pub fn contains(&self, p: Idx2dF, tolerance: f64) -> bool {
        if self.verts.is_empty() {
            return false;
        }

        if self.verts.len() >= 3 && self.winds_around(p) {
            return true;
        }

        tolerance > 0.0 && self.edges().any(|(a, b)| dist_to_segment(p, a, b) <= tolerance)
    }

    /// 奇偶规则: 从 `p` 沿第一轴正方向发射线, 统计与多边形边的交点个数.
    fn winds_around(&self, (px, py): Idx2dF) -> bool {
        let mut inside = false;
        for ((ax, ay), (bx, by)) in self.edges() {
            if (ay > py) != (by > py) {
                let t = (py - ay) / (by - ay);
                let crossing = ax + t * (bx - ax);
                if px < crossing {
                    inside = !inside;
                }
            }
        }
        inside
    }
}
