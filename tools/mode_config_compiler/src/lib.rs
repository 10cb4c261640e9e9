use std::{collections::BTreeSet, fmt, fs, path::Path};

use serde::Deserialize;

pub const MAX_WINDOW_LEN: u16 = 200;

#[derive(Debug)]
pub enum ConfigCompilerError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigCompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "io error: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigCompilerError {}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModesFile {
    pub sensor: SensorSection,
    pub gait: GaitSection,
    pub events: EventsSection,
    pub wakeup: WakeupSection,
    #[serde(rename = "mode")]
    pub modes: Vec<ModeSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorSection {
    pub odr_hz: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GaitSection {
    pub walk_up_ms: u32,
    pub dash_floor_ms: u32,
    pub single_walk_min_ptop: f64,
    pub single_run_min_ptop: f64,
    pub change_age: u16,
    pub age_band: Vec<AgeBandSection>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AgeBandSection {
    pub name: String,
    pub run_up_ms: u32,
    pub dash_up_ms: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EventsSection {
    pub jump: JumpSection,
    pub speed_reaction: SpeedReactionSection,
    pub start_reaction: StartReactionSection,
    pub tap: TapSection,
    pub ladder: LadderSection,
    pub teleport: TeleportSection,
    pub side_agility: SideAgilitySection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JumpSection {
    pub minus_max: f64,
    pub ptop_min: f64,
    pub plus_min: f64,
    pub flat_slope: f64,
    pub landing_reach: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpeedReactionSection {
    pub minus_max: f64,
    pub ptop_min: f64,
    pub plus_min: f64,
    pub flat_slope: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartReactionSection {
    pub flat_slope: f64,
    pub plateau_ratio: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TapSection {
    pub minus_max: f64,
    pub ptop_min: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LadderSection {
    pub ptop_min: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TeleportSection {
    pub minus_max: f64,
    pub ptop_min: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SideAgilitySection {
    pub minus_offset: f64,
    pub ptop_min: f64,
    pub min_gap_samples: u16,
    pub max_ptop_time: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WakeupSection {
    pub threshold: i16,
    pub min_run: u16,
    pub pair_window: u16,
    pub bursts: u8,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ModeName {
    Daily,
    Tap,
    Ladder,
    StartReaction,
    Jump,
    SkyJump,
    SpeedReaction,
    Teleportation,
    SideAgility,
    Dash10,
}

impl ModeName {
    pub const ALL: [ModeName; 10] = [
        ModeName::Daily,
        ModeName::Tap,
        ModeName::Ladder,
        ModeName::StartReaction,
        ModeName::Jump,
        ModeName::SkyJump,
        ModeName::SpeedReaction,
        ModeName::Teleportation,
        ModeName::SideAgility,
        ModeName::Dash10,
    ];

    fn variant(self) -> &'static str {
        match self {
            ModeName::Daily => "Daily",
            ModeName::Tap => "Tap",
            ModeName::Ladder => "Ladder",
            ModeName::StartReaction => "StartReaction",
            ModeName::Jump => "Jump",
            ModeName::SkyJump => "SkyJump",
            ModeName::SpeedReaction => "SpeedReaction",
            ModeName::Teleportation => "Teleportation",
            ModeName::SideAgility => "SideAgility",
            ModeName::Dash10 => "Dash10",
        }
    }

    fn key(self) -> &'static str {
        match self {
            ModeName::Daily => "daily",
            ModeName::Tap => "tap",
            ModeName::Ladder => "ladder",
            ModeName::StartReaction => "start_reaction",
            ModeName::Jump => "jump",
            ModeName::SkyJump => "sky_jump",
            ModeName::SpeedReaction => "speed_reaction",
            ModeName::Teleportation => "teleportation",
            ModeName::SideAgility => "side_agility",
            ModeName::Dash10 => "dash10",
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AxisName {
    X,
    Z,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectorName {
    Hysteresis,
    Ladder,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PairingName {
    Forward,
    ForwardBack,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SpikeFilterName {
    None,
    Ordered,
    Symmetric,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModeSection {
    pub mode: ModeName,
    pub axis: AxisName,
    pub window_len: u16,
    pub percentile_n: u16,
    pub low_coeff: f64,
    pub high_coeff: f64,
    pub ptop_threshold: f64,
    pub pair_reach: u16,
    pub peak_time: u16,
    pub detector: DetectorName,
    pub pairing: PairingName,
    pub spike_filter: SpikeFilterName,
}

pub fn parse_modes_file(path: &Path) -> Result<ModesFile, ConfigCompilerError> {
    let text = fs::read_to_string(path)
        .map_err(|e| ConfigCompilerError::Io(format!("failed to read {}: {e}", path.display())))?;
    parse_modes_str(&text)
}

pub fn parse_modes_str(text: &str) -> Result<ModesFile, ConfigCompilerError> {
    toml::from_str(text).map_err(|e| ConfigCompilerError::Parse(e.to_string()))
}

pub fn validate_config(config: &ModesFile) -> Result<(), ConfigCompilerError> {
    if !(config.sensor.odr_hz.is_finite() && config.sensor.odr_hz > 0.0) {
        return validation("sensor.odr_hz must be > 0");
    }

    let gait = &config.gait;
    if gait.age_band.len() != 2 {
        return validation("gait.age_band must contain exactly two entries (junior, senior)");
    }
    for band in &gait.age_band {
        if band.dash_up_ms > band.run_up_ms {
            return validation(&format!(
                "gait.age_band.{}.dash_up_ms must be <= run_up_ms",
                band.name
            ));
        }
        if band.run_up_ms >= gait.walk_up_ms {
            return validation(&format!(
                "gait.age_band.{}.run_up_ms must be < gait.walk_up_ms",
                band.name
            ));
        }
        if band.dash_up_ms <= gait.dash_floor_ms {
            return validation(&format!(
                "gait.age_band.{}.dash_up_ms must be > gait.dash_floor_ms",
                band.name
            ));
        }
    }
    if gait.single_run_min_ptop <= gait.single_walk_min_ptop {
        return validation("gait.single_run_min_ptop must be > gait.single_walk_min_ptop");
    }

    let events = &config.events;
    for (field, value) in [
        ("events.jump.minus_max", events.jump.minus_max),
        ("events.jump.ptop_min", events.jump.ptop_min),
        ("events.jump.plus_min", events.jump.plus_min),
        ("events.jump.flat_slope", events.jump.flat_slope),
        ("events.speed_reaction.minus_max", events.speed_reaction.minus_max),
        ("events.speed_reaction.ptop_min", events.speed_reaction.ptop_min),
        ("events.speed_reaction.plus_min", events.speed_reaction.plus_min),
        ("events.speed_reaction.flat_slope", events.speed_reaction.flat_slope),
        ("events.start_reaction.flat_slope", events.start_reaction.flat_slope),
        ("events.tap.minus_max", events.tap.minus_max),
        ("events.tap.ptop_min", events.tap.ptop_min),
        ("events.ladder.ptop_min", events.ladder.ptop_min),
        ("events.teleport.minus_max", events.teleport.minus_max),
        ("events.teleport.ptop_min", events.teleport.ptop_min),
        ("events.side_agility.minus_offset", events.side_agility.minus_offset),
        ("events.side_agility.ptop_min", events.side_agility.ptop_min),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return validation(&format!("{field} must be a positive number"));
        }
    }

    let ratio = events.start_reaction.plateau_ratio;
    if !(ratio > 0.0 && ratio <= 1.0) {
        return validation("events.start_reaction.plateau_ratio must be in (0, 1]");
    }
    if config.wakeup.threshold <= 0 || config.wakeup.min_run == 0 || config.wakeup.bursts == 0 {
        return validation("all wakeup fields must be positive integers");
    }

    let mut seen = BTreeSet::new();
    for mode in &config.modes {
        let key = mode.mode.key();
        if !seen.insert(mode.mode) {
            return validation(&format!("mode {key} is listed more than once"));
        }
        if mode.window_len == 0 || mode.window_len > MAX_WINDOW_LEN {
            return validation(&format!(
                "mode {key}.window_len must be in 1..={MAX_WINDOW_LEN}"
            ));
        }
        if mode.window_len % 2 != 0 {
            return validation(&format!("mode {key}.window_len must be even"));
        }
        if mode.percentile_n == 0 || mode.percentile_n > mode.window_len {
            return validation(&format!(
                "mode {key}.percentile_n must be in 1..=window_len"
            ));
        }
        for (field, value) in [("low_coeff", mode.low_coeff), ("high_coeff", mode.high_coeff)] {
            if !(value > 0.0 && value <= 1.0) {
                return validation(&format!("mode {key}.{field} must be in (0, 1]"));
            }
        }
        if !(mode.ptop_threshold.is_finite() && mode.ptop_threshold > 0.0) {
            return validation(&format!("mode {key}.ptop_threshold must be > 0"));
        }
        if mode.pair_reach == 0 {
            return validation(&format!("mode {key}.pair_reach must be > 0"));
        }
        if mode.spike_filter != SpikeFilterName::None && mode.peak_time == 0 {
            return validation(&format!(
                "mode {key}.peak_time must be > 0 when spike_filter is enabled"
            ));
        }
    }

    for mode in ModeName::ALL {
        if !seen.contains(&mode) {
            return validation(&format!("mode {} is missing", mode.key()));
        }
    }

    Ok(())
}

fn validation(msg: &str) -> Result<(), ConfigCompilerError> {
    Err(ConfigCompilerError::Validation(msg.to_string()))
}

pub fn render_generated_config(config: &ModesFile) -> String {
    let gait = &config.gait;
    let events = &config.events;
    let mut modes: Vec<&ModeSection> = config.modes.iter().collect();
    modes.sort_by_key(|m| m.mode);

    let mut out = String::new();
    out.push_str("// @generated by mode_config_compiler from config/modes.toml\n");
    out.push_str("pub static ACTIVITY_CONFIG: ActivityConfig = ActivityConfig {\n");
    out.push_str(&format!(
        "    sensor: SensorConfig {{ odr_hz: {} }},\n",
        float(config.sensor.odr_hz)
    ));

    out.push_str("    gait: GaitConfig {\n");
    out.push_str(&format!("        walk_up_ms: {},\n", gait.walk_up_ms));
    out.push_str(&format!("        dash_floor_ms: {},\n", gait.dash_floor_ms));
    out.push_str(&format!(
        "        single_walk_min_ptop: {},\n",
        float(gait.single_walk_min_ptop)
    ));
    out.push_str(&format!(
        "        single_run_min_ptop: {},\n",
        float(gait.single_run_min_ptop)
    ));
    out.push_str(&format!("        change_age: {},\n", gait.change_age));
    for (field, band) in ["junior", "senior"].iter().zip(&gait.age_band) {
        out.push_str(&format!(
            "        {field}: IntervalLimits {{ run_up_ms: {}, dash_up_ms: {} }},\n",
            band.run_up_ms, band.dash_up_ms
        ));
    }
    out.push_str("    },\n");

    out.push_str("    events: EventThresholds {\n");
    out.push_str(&format!(
        "        jump: JumpThresholds {{ minus_max: {}, ptop_min: {}, plus_min: {}, flat_slope: {}, landing_reach: {} }},\n",
        float(events.jump.minus_max),
        float(events.jump.ptop_min),
        float(events.jump.plus_min),
        float(events.jump.flat_slope),
        events.jump.landing_reach
    ));
    out.push_str(&format!(
        "        speed_reaction: SpeedReactionThresholds {{ minus_max: {}, ptop_min: {}, plus_min: {}, flat_slope: {} }},\n",
        float(events.speed_reaction.minus_max),
        float(events.speed_reaction.ptop_min),
        float(events.speed_reaction.plus_min),
        float(events.speed_reaction.flat_slope)
    ));
    out.push_str(&format!(
        "        start_reaction: StartReactionThresholds {{ flat_slope: {}, plateau_ratio: {} }},\n",
        float(events.start_reaction.flat_slope),
        float(events.start_reaction.plateau_ratio)
    ));
    out.push_str(&format!(
        "        tap: CountThresholds {{ minus_max: {}, ptop_min: {} }},\n",
        float(events.tap.minus_max),
        float(events.tap.ptop_min)
    ));
    out.push_str(&format!(
        "        ladder: CountThresholds {{ minus_max: f32::INFINITY, ptop_min: {} }},\n",
        float(events.ladder.ptop_min)
    ));
    out.push_str(&format!(
        "        teleport: CountThresholds {{ minus_max: {}, ptop_min: {} }},\n",
        float(events.teleport.minus_max),
        float(events.teleport.ptop_min)
    ));
    out.push_str(&format!(
        "        side_agility: SideAgilityThresholds {{ minus_offset: {}, ptop_min: {}, min_gap_samples: {}, max_ptop_time: {} }},\n",
        float(events.side_agility.minus_offset),
        float(events.side_agility.ptop_min),
        events.side_agility.min_gap_samples,
        events.side_agility.max_ptop_time
    ));
    out.push_str("    },\n");

    out.push_str(&format!(
        "    wakeup: WakeupConfig {{ threshold: {}, min_run: {}, pair_window: {}, bursts: {} }},\n",
        config.wakeup.threshold,
        config.wakeup.min_run,
        config.wakeup.pair_window,
        config.wakeup.bursts
    ));

    out.push_str("    modes: [\n");
    for mode in modes {
        out.push_str("        ModeConfig {\n");
        out.push_str(&format!(
            "            mode: ActivityMode::{},\n",
            mode.mode.variant()
        ));
        out.push_str(&format!(
            "            axis: Axis::{},\n",
            match mode.axis {
                AxisName::X => "X",
                AxisName::Z => "Z",
            }
        ));
        out.push_str(&format!("            window_len: {},\n", mode.window_len));
        out.push_str(&format!("            percentile_n: {},\n", mode.percentile_n));
        out.push_str(&format!("            low_coeff: {},\n", float(mode.low_coeff)));
        out.push_str(&format!("            high_coeff: {},\n", float(mode.high_coeff)));
        out.push_str(&format!(
            "            ptop_threshold: {},\n",
            float(mode.ptop_threshold)
        ));
        out.push_str(&format!("            pair_reach: {},\n", mode.pair_reach));
        out.push_str(&format!("            peak_time: {},\n", mode.peak_time));
        out.push_str(&format!(
            "            detector: DetectorKind::{},\n",
            match mode.detector {
                DetectorName::Hysteresis => "Hysteresis",
                DetectorName::Ladder => "Ladder",
            }
        ));
        out.push_str(&format!(
            "            pairing: PairingKind::{},\n",
            match mode.pairing {
                PairingName::Forward => "Forward",
                PairingName::ForwardBack => "ForwardBack",
            }
        ));
        out.push_str(&format!(
            "            spike_filter: SpikeFilter::{},\n",
            match mode.spike_filter {
                SpikeFilterName::None => "None",
                SpikeFilterName::Ordered => "Ordered",
                SpikeFilterName::Symmetric => "Symmetric",
            }
        ));
        out.push_str("        },\n");
    }
    out.push_str("    ],\n");
    out.push_str("};\n");
    out
}

fn float(value: f64) -> String {
    format!("{value:?}")
}

pub fn generate_from_path(path: &Path) -> Result<String, ConfigCompilerError> {
    let config = parse_modes_file(path)?;
    validate_config(&config)?;
    Ok(render_generated_config(&config))
}
