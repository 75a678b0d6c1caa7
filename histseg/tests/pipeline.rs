//! 端到端流水线测试: 体积 → 预处理 → 索引 → 交互 → 导出.

use histseg::prelude::*;
use ndarray::{Array2, Array3};

struct NullSurface;

impl VisualSurface for NullSurface {
    fn set_layer_data(&mut self, _layer: Layer, _data: Array2<u8>) {}
    fn clear_layer(&mut self, _layer: Layer) {}
    fn redraw(&mut self) {}
}

fn init_logger() {
    let _ = simple_logger::SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
}

/// 合成一个有明显强度分层的小体积: 外壳低强度, 内核高强度.
fn synthetic_scan() -> MriScan {
    let data = Array3::<f32>::from_shape_fn((8, 12, 12), |(z, h, w)| {
        let inner = (2..6).contains(&z) && (3..9).contains(&h) && (3..9).contains(&w);
        if inner {
            80.0
        } else {
            10.0
        }
    });
    MriScan::from_parts(data, "synthetic.nii.gz")
}

/// 预处理 + 索引构建, 返回 (体积, 索引).
fn prepared() -> (MriScan, HistogramIndex) {
    let mut scan = synthetic_scan();

    let (lo, hi) = truncate_range(scan.data_mut(), 0.25, 99.75);
    assert!(lo < hi);
    scale_range(scan.data_mut(), 100.0, 0.0001);

    let gradient = scan.gradient_magnitude();
    assert_eq!(gradient.dim(), scan.data().dim());

    let params = HistogramParams::from_intensity(scan.data()).unwrap();
    assert_eq!(params.nr_bins(), 100);
    let counts = params.counts(scan.data(), gradient.view()).unwrap();
    assert_eq!(counts.sum(), scan.size() as u64);

    let index = HistogramIndex::build(scan.data(), gradient.view(), params.edges()).unwrap();
    assert_eq!(index.shape(), scan.data().dim());
    (scan, index)
}

#[test]
fn full_pipeline_selects_and_exports() {
    init_logger();

    let (scan, index) = prepared();
    let mut session = Session::new(index, NullSurface).unwrap();

    // 默认扇区以原点为中心, 只覆盖低强度低梯度的 bin:
    // 安静的背景体素入选, 高强度内核不入选.
    let mask = session.export_volume();
    assert_eq!(mask.dim(), scan.data().dim());
    assert_eq!(mask[(0, 0, 0)], 1);
    assert_eq!(mask[(4, 6, 6)], 0);

    // 把半径放大到覆盖整个 bin 网格后, 所有体素都入选.
    for _ in 0..100 {
        session.handle(GestureEvent::press(
            PointerButton::Middle,
            ViewId::Histogram,
            (0.0, 0.0),
        ));
    }
    assert!(session.export_volume().iter().all(|&v| v == 1));
}

#[test]
fn narrowed_sector_exports_partial_mask() {
    init_logger();

    let (scan, index) = prepared();
    let mut session = Session::new(index, NullSurface).unwrap();

    // 把扇区缩到很小: 只留下原点附近的 bin (安静背景).
    for _ in 0..80 {
        session.handle(GestureEvent::press(
            PointerButton::Secondary,
            ViewId::Histogram,
            (0.0, 0.0),
        ));
    }
    assert!(session.sector().radius() < 4.0);

    let mask = session.export_volume();
    let ones = mask.iter().filter(|&&v| v == 1).count();
    assert!(ones > 0);
    assert!(ones < mask.len());
    // 阶跃边界上的高梯度体素不在选区内.
    assert_eq!(mask[(0, 0, 0)], 1);
    assert_eq!(mask[(2, 3, 3)], 0);

    // 复位后恢复默认选区.
    session.apply(Command::Reset);
    let mask = session.export_volume();
    assert_eq!(mask[(0, 0, 0)], 1);
    assert_eq!(mask[(4, 6, 6)], 0);
    assert_eq!(session.slice_index(), scan.len_z() / 2);
}
