use log::{debug, info, warn};

use super::{
    classifiers::{
        bucket_steps, count_matching, count_side_steps, measure_flight, speed_reaction_onset,
        start_reaction_onset, AgeBand, FlightOutcome, GaitTracker,
    },
    config::{active_config, ActivityConfig, ModeConfig},
    continuity::{AxisTrack, CarriedPeaks},
    filters::FilterChain,
    pairing::pair_peaks,
    peak_hsm::detect_peaks,
    rejection::{link_first_interval, reject_duplicates, reject_spikes},
    seq::SeqId,
    threshold::{estimate_levels, WindowLevels},
    trace::CycleTrace,
    types::{
        ActivityMode, Axis, ClassifyError, FlightRecord, ModeResult, SpikeFilter, Status,
        Threshold, WalkPeak, TABLE_CAPACITY,
    },
    window::SampleWindow,
};

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EngineOutput {
    pub status: Status,
    pub result: Option<ModeResult>,
    pub error: Option<ClassifyError>,
    /// Raw samples fed since cold start or the last storage reset, wrapping.
    pub current_sample: u16,
    /// Filtered samples currently held in the window.
    pub window_fill: u16,
    pub trace: CycleTrace,
}

/// All streaming state of the motion classifier.
pub struct ClassifierContext {
    config: &'static ActivityConfig,
    filters: FilterChain,
    window: SampleWindow,
    x_track: AxisTrack,
    z_track: AxisTrack,
    spike_carry: CarriedPeaks,
    gait: GaitTracker,
    active_mode: Option<ActivityMode>,
    samples_fed: u16,
    last_trace: CycleTrace,
}

impl Default for ClassifierContext {
    fn default() -> Self {
        Self::new(active_config())
    }
}

impl ClassifierContext {
    pub fn new(config: &'static ActivityConfig) -> Self {
        Self {
            config,
            filters: FilterChain::new(),
            window: SampleWindow::new(),
            x_track: AxisTrack::default(),
            z_track: AxisTrack::default(),
            spike_carry: CarriedPeaks::default(),
            gait: GaitTracker::default(),
            active_mode: None,
            samples_fed: 0,
            last_trace: CycleTrace::default(),
        }
    }

    pub fn config(&self) -> &'static ActivityConfig {
        self.config
    }

    pub fn active_mode(&self) -> Option<ActivityMode> {
        self.active_mode
    }

    pub fn age_band(&self) -> AgeBand {
        self.gait.band()
    }

    pub fn last_trace(&self) -> &CycleTrace {
        &self.last_trace
    }

    /// Same as [`classify`](Self::classify) with a wire-level mode id.
    pub fn classify_raw(&mut self, x: i16, z: i16, seq: u16, mode_id: u8) -> EngineOutput {
        match ActivityMode::try_from(mode_id) {
            Ok(mode) => self.classify(x, z, seq, mode),
            Err(err) => {
                warn!("classify called with {err}");
                EngineOutput {
                    status: Status::Error,
                    error: Some(err),
                    current_sample: self.samples_fed,
                    window_fill: self.window.len() as u16,
                    ..EngineOutput::default()
                }
            }
        }
    }

    /// Feeds one raw sample pair. Runs a classification cycle whenever the
    /// window for `mode` fills, then keeps the newer half of the window.
    pub fn classify(&mut self, x: i16, z: i16, seq: u16, mode: ActivityMode) -> EngineOutput {
        match self.active_mode {
            Some(active) if active == mode => {}
            Some(active) => {
                info!("mode {} -> {}", active.label(), mode.label());
                self.reset_storage();
                self.active_mode = Some(mode);
            }
            None => self.active_mode = Some(mode),
        }
        self.samples_fed = self.samples_fed.wrapping_add(1);

        let entry = *self.config.mode(mode);
        let raw = match entry.axis {
            Axis::X => x,
            Axis::Z => z,
        };
        let Some(sample) = self.filters.filter(raw, SeqId(seq)) else {
            return self.charging();
        };
        // window_len never exceeds the window capacity, and a full window slides below.
        let _ = self.window.push(sample);
        if self.window.len() < entry.window_len as usize {
            return self.charging();
        }

        let outcome = self.run_cycle(mode, &entry);
        self.window.slide_half();

        match outcome {
            Ok(result) => EngineOutput {
                status: Status::Success,
                result: Some(result),
                error: None,
                current_sample: self.samples_fed,
                window_fill: self.window.len() as u16,
                trace: self.last_trace,
            },
            Err(err) => {
                warn!("{} cycle failed: {err}", mode.label());
                EngineOutput {
                    status: Status::Error,
                    result: None,
                    error: Some(err),
                    current_sample: self.samples_fed,
                    window_fill: self.window.len() as u16,
                    trace: self.last_trace,
                }
            }
        }
    }

    /// Clears filters, window and every cross-window track. The age band is kept.
    pub fn reset_storage(&mut self) {
        self.filters.reset();
        self.window.clear();
        self.x_track.clear();
        self.z_track.clear();
        self.spike_carry.clear();
        self.gait.clear_pending();
        self.active_mode = None;
        self.samples_fed = 0;
        self.last_trace = CycleTrace::default();
        info!("classifier storage reset");
    }

    /// Clears the vertical-axis continuity used by the jump family.
    pub fn reset_skyjump_state(&mut self) {
        self.z_track.clear();
        self.spike_carry.clear();
        debug!("sky jump state reset");
    }

    pub fn select_age_profile(&mut self, age: u16) -> AgeBand {
        let band = self.gait.select_age(age, &self.config.gait);
        info!("age {age} uses {band:?} limits");
        band
    }

    fn charging(&self) -> EngineOutput {
        EngineOutput {
            status: Status::DataCharging,
            current_sample: self.samples_fed,
            window_fill: self.window.len() as u16,
            ..EngineOutput::default()
        }
    }

    fn run_cycle(
        &mut self,
        mode: ActivityMode,
        entry: &ModeConfig,
    ) -> Result<ModeResult, ClassifyError> {
        let mut trace = CycleTrace {
            mode,
            axis: entry.axis,
            window_start: self.window.first_seq().unwrap_or_default(),
            ..CycleTrace::default()
        };
        let outcome = self.run_stages(mode, entry, &mut trace);
        trace.fault = outcome.err();
        self.last_trace = trace;
        outcome
    }

    fn run_stages(
        &mut self,
        mode: ActivityMode,
        entry: &ModeConfig,
        trace: &mut CycleTrace,
    ) -> Result<ModeResult, ClassifyError> {
        let odr_hz = self.config.sensor.odr_hz;
        let window = self.window.as_slice();

        let levels = estimate_levels(
            window,
            entry.percentile_n as usize,
            entry.low_coeff,
            entry.high_coeff,
        )?;
        trace.levels = levels;
        trace.threshold = Threshold::with_axis(entry.axis, levels.bounds);
        debug!(
            "{} ground={} upper=({}, {}) lower=({}, {})",
            mode.label(),
            levels.ground as i32,
            levels.bounds.upper.high as i32,
            levels.bounds.upper.low as i32,
            levels.bounds.lower.high as i32,
            levels.bounds.lower.low as i32,
        );

        let peaks = detect_peaks(window, levels.bounds, entry.detector).inspect_err(|err| {
            if *err == ClassifyError::PeakTableOverflow {
                trace.peak_count = TABLE_CAPACITY as u8;
            }
        })?;
        trace.peak_count = peaks.len() as u8;

        let track = match entry.axis {
            Axis::X => &mut self.x_track,
            Axis::Z => &mut self.z_track,
        };
        let mut walk =
            pair_peaks(&peaks, entry, &track.continuation, odr_hz).inspect_err(|err| {
                if *err == ClassifyError::WalkPeakTableOverflow {
                    trace.walk_peak_count = TABLE_CAPACITY as u8;
                }
            })?;
        track.continuation.observe(&walk);
        trace.walk_peak_count = walk.len() as u8;

        trace.duplicate_rejects = reject_duplicates(&mut walk, track.carried.entries()) as u8;
        if entry.spike_filter == SpikeFilter::None {
            link_first_interval(&mut walk, track.carried.entries(), odr_hz);
            track.carried.observe(&walk);
        } else {
            track.carried.observe(&walk);
            trace.spike_rejects = reject_spikes(
                &mut walk,
                self.spike_carry.entries(),
                entry.spike_filter,
                entry.peak_time,
            ) as u8;
            link_first_interval(&mut walk, self.spike_carry.entries(), odr_hz);
            self.spike_carry.observe(&walk);
        }
        trace.retained = walk.len() as u8;
        debug!(
            "{} peaks={} walk={} dup={} spike={} kept={}",
            mode.label(),
            trace.peak_count,
            trace.walk_peak_count,
            trace.duplicate_rejects,
            trace.spike_rejects,
            trace.retained,
        );

        Ok(self.classify_walk(mode, &walk, &levels))
    }

    fn classify_walk(
        &mut self,
        mode: ActivityMode,
        walk: &[WalkPeak],
        levels: &WindowLevels,
    ) -> ModeResult {
        let config = self.config;
        let events = &config.events;
        let odr_hz = config.sensor.odr_hz;

        match mode {
            ActivityMode::Daily | ActivityMode::Dash10 => {
                let limits = self.gait.limits(&config.gait);
                let raw = bucket_steps(walk, limits, &config.gait);
                ModeResult::Daily(self.gait.settle(raw))
            }
            ActivityMode::StartReaction => {
                let limits = self.gait.limits(&config.gait);
                let count = bucket_steps(walk, limits, &config.gait);
                ModeResult::Onset(start_reaction_onset(
                    walk,
                    count,
                    self.window.as_slice(),
                    &events.start_reaction,
                ))
            }
            ActivityMode::SpeedReaction => ModeResult::Onset(speed_reaction_onset(
                walk,
                self.window.as_slice(),
                levels.bounds.upper.high,
                &events.speed_reaction,
            )),
            ActivityMode::Jump | ActivityMode::SkyJump => {
                let outcome = measure_flight(
                    walk,
                    self.window.as_slice(),
                    levels.bounds.upper.high,
                    levels.ground,
                    &events.jump,
                    odr_hz,
                );
                match outcome {
                    FlightOutcome::Landed(record) => ModeResult::Flight(record),
                    FlightOutcome::NoJump => ModeResult::Flight(FlightRecord::default()),
                    FlightOutcome::NoLanding => {
                        self.reset_skyjump_state();
                        ModeResult::Flight(FlightRecord::default())
                    }
                }
            }
            ActivityMode::Tap => ModeResult::Count(count_matching(walk, &events.tap)),
            ActivityMode::Ladder => ModeResult::Count(count_matching(walk, &events.ladder)),
            ActivityMode::Teleportation => {
                ModeResult::Count(count_matching(walk, &events.teleport))
            }
            ActivityMode::SideAgility => ModeResult::Count(count_side_steps(
                walk,
                levels.negative_mean,
                &events.side_agility,
                odr_hz,
            )),
        }
    }
}
