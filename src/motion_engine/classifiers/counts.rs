use crate::motion_engine::{
    config::{CountThresholds, SideAgilityThresholds},
    seq::{samples_to_ms, SeqId},
    types::WalkPeak,
};

/// Counts walk-peaks whose minus stays below `minus_max` and whose swing exceeds `ptop_min`.
pub fn count_matching(walk: &[WalkPeak], thresholds: &CountThresholds) -> u16 {
    walk.iter()
        .filter(|w| w.minus_value < thresholds.minus_max && w.ptop_value > thresholds.ptop_min)
        .count() as u16
}

/// Counts short, strong lateral swings separated by at least `min_gap_samples`.
///
/// The minus limit floats with the window's negative mean. The first counted
/// swing is also held to the gap through its carried-over interval.
pub fn count_side_steps(
    walk: &[WalkPeak],
    negative_mean: f32,
    thresholds: &SideAgilityThresholds,
    odr_hz: f32,
) -> u16 {
    let minus_limit = thresholds.minus_offset + negative_mean;
    // interval_ms is in ms, so the first counted peak compares against the gap
    // converted at the sensor rate (20 samples is 200 ms at 100 Hz).
    let min_gap_ms = samples_to_ms(thresholds.min_gap_samples, odr_hz);
    let mut last_counted: Option<SeqId> = None;
    let mut count = 0u16;

    for peak in walk {
        if !(peak.minus_value < minus_limit
            && peak.ptop_value > thresholds.ptop_min
            && peak.ptop_time < thresholds.max_ptop_time)
        {
            continue;
        }

        let spaced = match last_counted {
            Some(previous) => peak.plus_seq.cyclic_distance(previous) >= thresholds.min_gap_samples,
            None => peak.interval_ms == 0 || peak.interval_ms >= min_gap_ms,
        };
        if spaced {
            count += 1;
            last_counted = Some(peak.plus_seq);
        }
    }
    count
}
