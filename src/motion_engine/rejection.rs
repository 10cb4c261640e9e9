use super::{
    continuity::CarriedPeak,
    seq::{samples_to_ms, SeqId},
    types::{SpikeFilter, WalkPeak, WalkPeakTable},
};

fn compact(walk: &mut WalkPeakTable) -> usize {
    let before = walk.len();
    walk.retain(|w| w.valid);
    before - walk.len()
}

/// Drops walk-peaks already reported from the overlapping half of the previous window.
pub fn reject_duplicates(walk: &mut WalkPeakTable, carried: &[CarriedPeak]) -> usize {
    if carried.is_empty() {
        return 0;
    }
    for peak in walk.iter_mut() {
        if carried
            .iter()
            .any(|c| c.minus_seq == peak.minus_seq || c.plus_seq == peak.plus_seq)
        {
            peak.valid = false;
        }
    }
    compact(walk)
}

fn too_close(filter: SpikeFilter, minus: SeqId, plus: SeqId, peak_time: u16) -> bool {
    match filter {
        SpikeFilter::None => false,
        SpikeFilter::Ordered => {
            let lead = minus.cyclic_distance(plus);
            lead > 0 && lead < peak_time
        }
        SpikeFilter::Symmetric => plus.separation(minus) < peak_time,
    }
}

/// Drops walk-peaks whose plus sits within `peak_time` of an accepted minus,
/// first inside the window, then against the previous window's accepted list.
pub fn reject_spikes(
    walk: &mut WalkPeakTable,
    carried: &[CarriedPeak],
    filter: SpikeFilter,
    peak_time: u16,
) -> usize {
    if filter == SpikeFilter::None || walk.is_empty() {
        return 0;
    }

    let mut anchor = 0;
    for i in 1..walk.len() {
        if too_close(filter, walk[anchor].minus_seq, walk[i].plus_seq, peak_time) {
            walk[i].valid = false;
        } else {
            anchor = i;
        }
    }

    for peak in walk.iter_mut().filter(|w| w.valid) {
        if carried
            .iter()
            .any(|c| too_close(filter, c.minus_seq, peak.plus_seq, peak_time))
        {
            peak.valid = false;
        }
    }

    compact(walk)
}

/// Times the first walk-peak against the last accepted plus of the previous window.
pub fn link_first_interval(walk: &mut [WalkPeak], carried: &[CarriedPeak], odr_hz: f32) {
    if let (Some(first), Some(previous)) = (walk.first_mut(), carried.last()) {
        let samples = first.plus_seq.cyclic_distance(previous.plus_seq);
        first.interval_ms = samples_to_ms(samples, odr_hz);
    }
}
