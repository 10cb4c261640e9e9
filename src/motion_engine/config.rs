use super::types::{ActivityMode, Axis, DetectorKind, PairingKind, SpikeFilter};

#[derive(Clone, Copy, Debug)]
pub struct SensorConfig {
    pub odr_hz: f32,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IntervalLimits {
    pub run_up_ms: u32,
    pub dash_up_ms: u32,
}

#[derive(Clone, Copy, Debug)]
pub struct GaitConfig {
    pub walk_up_ms: u32,
    pub dash_floor_ms: u32,
    pub single_walk_min_ptop: f32,
    pub single_run_min_ptop: f32,
    pub change_age: u16,
    pub junior: IntervalLimits,
    pub senior: IntervalLimits,
}

#[derive(Clone, Copy, Debug)]
pub struct JumpThresholds {
    pub minus_max: f32,
    pub ptop_min: f32,
    pub plus_min: f32,
    pub flat_slope: f32,
    pub landing_reach: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct SpeedReactionThresholds {
    pub minus_max: f32,
    pub ptop_min: f32,
    pub plus_min: f32,
    pub flat_slope: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct StartReactionThresholds {
    pub flat_slope: f32,
    pub plateau_ratio: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct CountThresholds {
    pub minus_max: f32,
    pub ptop_min: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct SideAgilityThresholds {
    pub minus_offset: f32,
    pub ptop_min: f32,
    pub min_gap_samples: u16,
    pub max_ptop_time: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct EventThresholds {
    pub jump: JumpThresholds,
    pub speed_reaction: SpeedReactionThresholds,
    pub start_reaction: StartReactionThresholds,
    pub tap: CountThresholds,
    pub ladder: CountThresholds,
    pub teleport: CountThresholds,
    pub side_agility: SideAgilityThresholds,
}

#[derive(Clone, Copy, Debug)]
pub struct WakeupConfig {
    pub threshold: i16,
    pub min_run: u16,
    pub pair_window: u16,
    pub bursts: u8,
}

#[derive(Clone, Copy, Debug)]
pub struct ModeConfig {
    pub mode: ActivityMode,
    pub axis: Axis,
    pub window_len: u16,
    pub percentile_n: u16,
    pub low_coeff: f32,
    pub high_coeff: f32,
    pub ptop_threshold: f32,
    pub pair_reach: u16,
    pub peak_time: u16,
    pub detector: DetectorKind,
    pub pairing: PairingKind,
    pub spike_filter: SpikeFilter,
}

#[derive(Clone, Copy, Debug)]
pub struct ActivityConfig {
    pub sensor: SensorConfig,
    pub gait: GaitConfig,
    pub events: EventThresholds,
    pub wakeup: WakeupConfig,
    pub modes: [ModeConfig; ActivityMode::COUNT],
}

impl ActivityConfig {
    pub fn mode(&self, mode: ActivityMode) -> &ModeConfig {
        &self.modes[mode.as_u8() as usize]
    }
}

include!(concat!(env!("OUT_DIR"), "/mode_config.rs"));

pub fn active_config() -> &'static ActivityConfig {
    &ACTIVITY_CONFIG
}
