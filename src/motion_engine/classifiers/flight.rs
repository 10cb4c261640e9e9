use log::{debug, info};

use crate::motion_engine::{
    config::JumpThresholds,
    seq::samples_to_ms,
    types::{FlightRecord, Sample, WalkPeak},
    window::position_of,
};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FlightOutcome {
    NoJump,
    Landed(FlightRecord),
    NoLanding,
}

fn qualifies(peak: &WalkPeak, thresholds: &JumpThresholds) -> bool {
    peak.minus_value < thresholds.minus_max
        && peak.ptop_value > thresholds.ptop_min
        && peak.plus_value > thresholds.plus_min
}

/// Measures the longest qualifying airborne swing in the window.
///
/// Take-off is searched backwards from the plus peak for the first flat sample
/// below `upper_high`; landing is searched forwards from the deepest minus for the
/// first flat sample above `ground`.
pub fn measure_flight(
    walk: &[WalkPeak],
    window: &[Sample],
    upper_high: f32,
    ground: f32,
    thresholds: &JumpThresholds,
    odr_hz: f32,
) -> FlightOutcome {
    let mut best: Option<&WalkPeak> = None;
    for peak in walk.iter().filter(|w| qualifies(w, thresholds)) {
        if best.map_or(true, |b| peak.ptop_time > b.ptop_time) {
            best = Some(peak);
        }
    }
    let Some(best) = best else {
        return FlightOutcome::NoJump;
    };

    let (Some(plus_pos), Some(minus_pos)) = (
        position_of(window, best.plus_seq),
        position_of(window, best.minus_seq),
    ) else {
        return FlightOutcome::NoJump;
    };

    let mut end_pos = minus_pos;
    let mut deepest = best.minus_value;
    for (k, sample) in window.iter().enumerate().skip(minus_pos) {
        if sample.value < deepest
            && sample.seq.cyclic_distance(best.plus_seq) < thresholds.landing_reach
        {
            debug!("landing moved {} -> {}", window[end_pos].seq.get(), sample.seq.get());
            deepest = sample.value;
            end_pos = k;
        }
    }

    let mut start_pos = 0;
    for j in (1..=plus_pos).rev() {
        if window[j].value - window[j - 1].value < thresholds.flat_slope
            && window[j].value < upper_high
        {
            start_pos = j;
            break;
        }
    }

    let last = window.len() - 1;
    let mut landing = None;
    for i in end_pos..last {
        if window[i + 1].value - window[i].value < thresholds.flat_slope
            && ground < window[i].value
        {
            landing = Some(i);
            break;
        }
    }
    let Some(landing) = landing else {
        info!("jump landing not found before seq {}", window[last].seq.get());
        return FlightOutcome::NoLanding;
    };

    let start = window[start_pos].seq;
    let samples = window[landing].seq.cyclic_distance(start);
    FlightOutcome::Landed(FlightRecord {
        samples,
        duration_ms: samples_to_ms(samples, odr_hz),
        start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion_engine::{config::active_config, seq::SeqId};

    fn thresholds() -> JumpThresholds {
        active_config().events.jump
    }

    fn samples(values: &[f32]) -> heapless::Vec<Sample, 200> {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| Sample {
                value: *v,
                seq: SeqId(500 + i as u16),
            })
            .collect()
    }

    fn swing(window: &[Sample], plus: usize, minus: usize) -> WalkPeak {
        WalkPeak {
            plus_seq: window[plus].seq,
            plus_value: window[plus].value,
            minus_seq: window[minus].seq,
            minus_value: window[minus].value,
            ptop_value: window[plus].value - window[minus].value,
            ptop_time: (minus - plus) as u16,
            interval_ms: 0,
            valid: true,
        }
    }

    // Ground at 1000, push-off spike, free fall near zero, landing spike back to ground.
    fn jump_profile() -> [f32; 40] {
        let mut values = [1000.0f32; 40];
        let rise = [1000.0, 1400.0, 2000.0, 2600.0];
        values[5..9].copy_from_slice(&rise);
        let fall = [1800.0, 900.0, 200.0, 50.0];
        values[9..13].copy_from_slice(&fall);
        for v in &mut values[13..25] {
            *v = 40.0;
        }
        let land = [600.0, 1800.0, 1300.0, 1050.0];
        values[25..29].copy_from_slice(&land);
        values
    }

    #[test]
    fn flight_spans_take_off_to_landing() {
        let window = samples(&jump_profile());
        let walk = [swing(&window, 8, 12)];
        let outcome = measure_flight(&walk, &window, 2000.0, 900.0, &thresholds(), 100.0);

        match outcome {
            FlightOutcome::Landed(record) => {
                // Take-off at the first flat step below 2000 walking back from 2600.
                assert_eq!(record.start, SeqId(505));
                // Free fall bottoms out at index 13; the landing spike settles at index 26.
                assert_eq!(record.samples, 26 - 5);
                assert_eq!(record.duration_ms, samples_to_ms(21, 100.0));
            }
            other => panic!("expected a landed jump, got {other:?}"),
        }
    }

    #[test]
    fn weak_swings_are_not_jumps() {
        let window = samples(&jump_profile());
        let mut weak = swing(&window, 8, 12);
        weak.ptop_value = 900.0;
        let outcome = measure_flight(&[weak], &window, 2000.0, 900.0, &thresholds(), 100.0);
        assert_eq!(outcome, FlightOutcome::NoJump);
        assert_eq!(
            measure_flight(&[], &window, 2000.0, 900.0, &thresholds(), 100.0),
            FlightOutcome::NoJump
        );
    }

    #[test]
    fn missing_landing_is_reported() {
        let mut values = jump_profile();
        for v in &mut values[13..] {
            *v = 40.0;
        }
        let window = samples(&values);
        let walk = [swing(&window, 8, 12)];
        let outcome = measure_flight(&walk, &window, 2000.0, 900.0, &thresholds(), 100.0);
        assert_eq!(outcome, FlightOutcome::NoLanding);
    }
}
