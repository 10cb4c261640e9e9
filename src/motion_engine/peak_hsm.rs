use log::warn;
use statig::{blocking::IntoStateMachineExt as _, prelude::*};

use super::{
    seq::SeqId,
    types::{AxisBounds, ClassifyError, DetectorKind, Direction, Peak, PeakTable, Sample},
};

#[derive(Clone, Copy, Debug)]
struct ScanStep {
    prev: f32,
    current: Sample,
    next: f32,
}

#[derive(Default)]
struct ScanContext {
    peaks: PeakTable,
    overflowed: bool,
}

impl ScanContext {
    fn emit(&mut self, peak: Peak) {
        if self.peaks.push(peak).is_err() {
            self.overflowed = true;
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    value: f32,
    sample: Sample,
    confirmed: bool,
}

impl Candidate {
    const fn cleared_max() -> Self {
        Self {
            value: f32::MIN,
            sample: Sample {
                value: 0.0,
                seq: SeqId(0),
            },
            confirmed: false,
        }
    }

    const fn cleared_min() -> Self {
        Self {
            value: f32::MAX,
            ..Self::cleared_max()
        }
    }

    // Unconfirmed until a local extreme at least as deep replaces it.
    const fn seeded(sample: Sample) -> Self {
        Self {
            value: sample.value,
            sample,
            confirmed: false,
        }
    }

    const fn confirmed(sample: Sample) -> Self {
        Self {
            value: sample.value,
            sample,
            confirmed: true,
        }
    }

    fn peak(self, direction: Direction) -> Peak {
        Peak {
            value: self.value,
            direction,
            index: self.sample.seq,
        }
    }
}

struct PeakScanner {
    bounds: AxisBounds,
    kind: DetectorKind,
    max: Candidate,
    min: Candidate,
}

impl PeakScanner {
    fn new(bounds: AxisBounds, kind: DetectorKind) -> Self {
        Self {
            bounds,
            kind,
            max: Candidate::cleared_max(),
            min: Candidate::cleared_min(),
        }
    }

    fn opposite_seed(&self, sample: Sample, cleared: Candidate) -> Candidate {
        match self.kind {
            DetectorKind::Hysteresis => Candidate::seeded(sample),
            DetectorKind::Ladder => cleared,
        }
    }

    fn track_max(&mut self, step: &ScanStep) {
        let value = step.current.value;
        if value > self.bounds.upper.high
            && value - step.prev >= 0.0
            && value - step.next > 0.0
            && (value > self.max.value || (!self.max.confirmed && value >= self.max.value))
        {
            self.max = Candidate::confirmed(step.current);
        }
    }

    fn track_min(&mut self, step: &ScanStep) {
        let value = step.current.value;
        if value < self.bounds.lower.low
            && value - step.prev <= 0.0
            && value - step.next < 0.0
            && (value < self.min.value || (!self.min.confirmed && value <= self.min.value))
        {
            self.min = Candidate::confirmed(step.current);
        }
    }
}

#[state_machine(initial = "State::seeking_max()")]
impl PeakScanner {
    #[state]
    fn seeking_max(&mut self, context: &mut ScanContext, event: &ScanStep) -> Outcome<State> {
        self.track_max(event);

        let value = event.current.value;
        let mut leave = false;
        if value < self.bounds.upper.low && self.max.confirmed {
            context.emit(self.max.peak(Direction::Plus));
            self.min = Candidate::cleared_min();
            leave = true;
        }
        if value < self.bounds.lower.low {
            self.min = self.opposite_seed(event.current, Candidate::cleared_min());
            leave = true;
        }

        if !leave {
            return Handled;
        }
        self.max = Candidate::cleared_max();
        // The crossing sample is also the first sample of the minimum search.
        self.track_min(event);
        Transition(State::seeking_min())
    }

    #[state]
    fn seeking_min(&mut self, context: &mut ScanContext, event: &ScanStep) -> Outcome<State> {
        self.track_min(event);

        let value = event.current.value;
        let mut leave = false;
        if value > self.bounds.lower.high && self.min.confirmed {
            context.emit(self.min.peak(Direction::Minus));
            self.max = Candidate::cleared_max();
            leave = true;
        }
        if value > self.bounds.upper.high {
            self.max = self.opposite_seed(event.current, Candidate::cleared_max());
            leave = true;
        }

        if !leave {
            return Handled;
        }
        self.min = Candidate::cleared_min();
        Transition(State::seeking_max())
    }
}

/// Scans `window[1..len-1]` for alternating extrema crossing the hysteresis bounds.
pub fn detect_peaks(
    window: &[Sample],
    bounds: AxisBounds,
    kind: DetectorKind,
) -> Result<PeakTable, ClassifyError> {
    let mut context = ScanContext::default();
    if window.len() < 3 {
        return Ok(context.peaks);
    }

    let mut machine = PeakScanner::new(bounds, kind).state_machine();
    for i in 1..window.len() - 1 {
        let step = ScanStep {
            prev: window[i - 1].value,
            current: window[i],
            next: window[i + 1].value,
        };
        machine.handle_with_context(&step, &mut context);
        if context.overflowed {
            warn!("peak table full at seq {}", window[i].seq.get());
            return Err(ClassifyError::PeakTableOverflow);
        }
    }

    Ok(context.peaks)
}
