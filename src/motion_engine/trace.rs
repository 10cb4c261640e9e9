use super::{
    seq::SeqId,
    threshold::WindowLevels,
    types::{ActivityMode, Axis, ClassifyError, Threshold},
};

/// Snapshot of the last classification cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CycleTrace {
    pub mode: ActivityMode,
    pub axis: Axis,
    pub window_start: SeqId,
    pub levels: WindowLevels,
    pub threshold: Threshold,
    pub peak_count: u8,
    pub walk_peak_count: u8,
    pub duplicate_rejects: u8,
    pub spike_rejects: u8,
    pub retained: u8,
    pub fault: Option<ClassifyError>,
}
