use log::debug;

use crate::motion_engine::{
    config::{SpeedReactionThresholds, StartReactionThresholds},
    filters::FILTER_GROUP_DELAY,
    seq::SeqId,
    types::{DailyCount, OnsetRecord, Sample, WalkPeak},
    window::position_of,
};

fn walk_back_to_flat(window: &[Sample], from: usize, flat_slope: f32, ceiling: f32) -> SeqId {
    for j in (1..=from).rev() {
        if window[j].value - window[j - 1].value < flat_slope && window[j].value < ceiling {
            return window[j].seq;
        }
    }
    window[0].seq
}

fn compensate_delay(onset: SeqId) -> SeqId {
    onset.rewind(FILTER_GROUP_DELAY)
}

/// Onset of the strongest reaction swing, or `None` when no swing qualifies.
pub fn speed_reaction_onset(
    walk: &[WalkPeak],
    window: &[Sample],
    upper_high: f32,
    thresholds: &SpeedReactionThresholds,
) -> OnsetRecord {
    let best = walk
        .iter()
        .filter(|w| {
            w.minus_value < thresholds.minus_max
                && w.ptop_value > thresholds.ptop_min
                && w.plus_value > thresholds.plus_min
        })
        .fold(None::<&WalkPeak>, |best, peak| match best {
            Some(b) if b.ptop_value >= peak.ptop_value => Some(b),
            _ => Some(peak),
        });

    let onset = best
        .and_then(|peak| position_of(window, peak.plus_seq))
        .map(|pos| walk_back_to_flat(window, pos, thresholds.flat_slope, upper_high))
        .map(compensate_delay);
    if let Some(onset) = onset {
        debug!("speed reaction onset {}", onset.get());
    }
    OnsetRecord { onset }
}

/// Onset of the first stride once the gait classifier has counted any steps.
pub fn start_reaction_onset(
    walk: &[WalkPeak],
    count: DailyCount,
    window: &[Sample],
    thresholds: &StartReactionThresholds,
) -> OnsetRecord {
    if count.total() == 0 {
        return OnsetRecord::default();
    }
    let Some(first) = walk.first() else {
        return OnsetRecord::default();
    };

    let ceiling = first.plus_value * thresholds.plateau_ratio;
    let onset = position_of(window, first.plus_seq)
        .map(|pos| walk_back_to_flat(window, pos, thresholds.flat_slope, ceiling))
        .map(compensate_delay);
    if let Some(onset) = onset {
        debug!("start reaction onset {} below {}", onset.get(), ceiling as i32);
    }
    OnsetRecord { onset }
}
