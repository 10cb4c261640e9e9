use core::{fmt, str::FromStr};

use heapless::Vec;

use super::seq::SeqId;

pub const WINDOW_CAPACITY: usize = 200;
pub const TABLE_CAPACITY: usize = 30;

pub type PeakTable = Vec<Peak, TABLE_CAPACITY>;
pub type WalkPeakTable = Vec<WalkPeak, TABLE_CAPACITY>;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Axis {
    #[default]
    X,
    Z,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
#[repr(u8)]
pub enum ActivityMode {
    #[default]
    Daily = 0,
    Tap = 1,
    Ladder = 2,
    StartReaction = 3,
    Jump = 4,
    SkyJump = 5,
    SpeedReaction = 6,
    Teleportation = 7,
    SideAgility = 8,
    Dash10 = 9,
}

impl ActivityMode {
    pub const COUNT: usize = 10;

    pub const ALL: [ActivityMode; Self::COUNT] = [
        ActivityMode::Daily,
        ActivityMode::Tap,
        ActivityMode::Ladder,
        ActivityMode::StartReaction,
        ActivityMode::Jump,
        ActivityMode::SkyJump,
        ActivityMode::SpeedReaction,
        ActivityMode::Teleportation,
        ActivityMode::SideAgility,
        ActivityMode::Dash10,
    ];

    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn label(self) -> &'static str {
        match self {
            ActivityMode::Daily => "daily",
            ActivityMode::Tap => "tap",
            ActivityMode::Ladder => "ladder",
            ActivityMode::StartReaction => "start_reaction",
            ActivityMode::Jump => "jump",
            ActivityMode::SkyJump => "sky_jump",
            ActivityMode::SpeedReaction => "speed_reaction",
            ActivityMode::Teleportation => "teleportation",
            ActivityMode::SideAgility => "side_agility",
            ActivityMode::Dash10 => "dash10",
        }
    }

    pub const fn is_jump_family(self) -> bool {
        matches!(self, ActivityMode::Jump | ActivityMode::SkyJump)
    }
}

impl TryFrom<u8> for ActivityMode {
    type Error = ClassifyError;

    fn try_from(raw: u8) -> Result<Self, Self::Error> {
        ActivityMode::ALL
            .get(raw as usize)
            .copied()
            .ok_or(ClassifyError::UnknownMode(raw))
    }
}

impl FromStr for ActivityMode {
    type Err = ClassifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ActivityMode::ALL
            .iter()
            .copied()
            .find(|mode| mode.label().eq_ignore_ascii_case(s.trim()))
            .ok_or(ClassifyError::UnknownMode(u8::MAX))
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum DetectorKind {
    /// Aborting a half-cycle seeds the opposite extreme with the crossing sample.
    #[default]
    Hysteresis,
    /// Aborting a half-cycle clears both candidates.
    Ladder,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum PairingKind {
    #[default]
    Forward,
    ForwardBack,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum SpikeFilter {
    #[default]
    None,
    /// Rejects a walk-peak whose plus precedes the reference minus by less than peak_time.
    Ordered,
    /// Rejects a walk-peak whose plus lies within peak_time of the reference minus.
    Symmetric,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Sample {
    pub value: f32,
    pub seq: SeqId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Direction {
    #[default]
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Peak {
    pub value: f32,
    pub direction: Direction,
    pub index: SeqId,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WalkPeak {
    pub plus_seq: SeqId,
    pub plus_value: f32,
    pub minus_seq: SeqId,
    pub minus_value: f32,
    pub ptop_value: f32,
    pub ptop_time: u16,
    pub interval_ms: u32,
    pub valid: bool,
}

impl WalkPeak {
    pub fn from_pair(plus: Peak, minus: Peak) -> Self {
        Self {
            plus_seq: plus.index,
            plus_value: plus.value,
            minus_seq: minus.index,
            minus_value: minus.value,
            ptop_value: magnitude(plus.value - minus.value),
            ptop_time: plus.index.separation(minus.index),
            interval_ms: 0,
            valid: true,
        }
    }
}

/// One polarity's hysteresis pair, `low <= high`.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct BoundPair {
    pub high: f32,
    pub low: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct AxisBounds {
    pub upper: BoundPair,
    pub lower: BoundPair,
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Threshold {
    pub xp_high: f32,
    pub xp_low: f32,
    pub xn_high: f32,
    pub xn_low: f32,
    pub zp_high: f32,
    pub zp_low: f32,
    pub zn_high: f32,
    pub zn_low: f32,
}

impl Threshold {
    pub fn with_axis(axis: Axis, bounds: AxisBounds) -> Self {
        let mut threshold = Self::default();
        match axis {
            Axis::X => {
                threshold.xp_high = bounds.upper.high;
                threshold.xp_low = bounds.upper.low;
                threshold.xn_high = bounds.lower.high;
                threshold.xn_low = bounds.lower.low;
            }
            Axis::Z => {
                threshold.zp_high = bounds.upper.high;
                threshold.zp_low = bounds.upper.low;
                threshold.zn_high = bounds.lower.high;
                threshold.zn_low = bounds.lower.low;
            }
        }
        threshold
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum Status {
    #[default]
    DataCharging,
    Success,
    Error,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct DailyCount {
    pub walk: u16,
    pub run: u16,
    pub dash: u16,
}

impl DailyCount {
    pub const fn total(self) -> u16 {
        self.walk + self.run + self.dash
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct FlightRecord {
    pub samples: u16,
    pub duration_ms: u32,
    pub start: SeqId,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub struct OnsetRecord {
    pub onset: Option<SeqId>,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ModeResult {
    Daily(DailyCount),
    Flight(FlightRecord),
    Count(u16),
    Onset(OnsetRecord),
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ClassifyError {
    UnknownMode(u8),
    EmptyWindow,
    PercentileExceedsWindow,
    PeakTableOverflow,
    WalkPeakTableOverflow,
}

impl fmt::Display for ClassifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifyError::UnknownMode(raw) => write!(f, "unknown activity mode {raw}"),
            ClassifyError::EmptyWindow => f.write_str("window length is zero"),
            ClassifyError::PercentileExceedsWindow => {
                f.write_str("percentile count exceeds window length")
            }
            ClassifyError::PeakTableOverflow => {
                write!(f, "more than {TABLE_CAPACITY} peaks in one window")
            }
            ClassifyError::WalkPeakTableOverflow => {
                write!(f, "more than {TABLE_CAPACITY} walk-peaks in one window")
            }
        }
    }
}

pub(crate) fn magnitude(value: f32) -> f32 {
    if value < 0.0 {
        -value
    } else {
        value
    }
}
