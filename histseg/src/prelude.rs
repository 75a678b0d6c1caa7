//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx2dF, Idx3d};

pub use crate::data::{
    gradient_magnitude, percentile, preprocess_default, scale_range, truncate_range, MriScan,
    NiftiHeaderAttr,
};

pub use crate::hist::{
    project_to_slice, project_to_volume, HistogramError, HistogramIndex, HistogramParams,
};

pub use crate::region::sector::{InitSectorError, SectorMask};
pub use crate::region::{CompactSelectionMask, ImgWriteVis, LassoPolygon, SelectionMask};

pub use crate::session::{
    Command, GestureEvent, Layer, Mode, Modifier, PointerButton, Session, ViewId, VisualSurface,
};

pub use crate::export::{assemble_volume, derive_out_path, export_nifti, ExportError};

pub use crate::consts::label::{SELECTED, UNSELECTED};
pub use crate::consts::{DEFAULT_SECTOR_RADIUS, DEFAULT_SECTOR_THETA};
