use super::{
    config::ModeConfig,
    continuity::Continuation,
    seq::{samples_to_ms, SeqId},
    types::{ClassifyError, Direction, PairingKind, Peak, WalkPeak, WalkPeakTable},
};

const PLUS_REFRESH_SPAN: u16 = 20;
const MINUS_REFRESH_SPAN: u16 = 50;

pub fn pair_peaks(
    peaks: &[Peak],
    mode: &ModeConfig,
    continuation: &Continuation,
    odr_hz: f32,
) -> Result<WalkPeakTable, ClassifyError> {
    let mut walk = match mode.pairing {
        PairingKind::Forward => pair_forward(peaks, mode.ptop_threshold, mode.pair_reach)?,
        PairingKind::ForwardBack => {
            pair_forward_back(peaks, mode.ptop_threshold, mode.pair_reach)?
        }
    };
    assign_intervals(&mut walk, continuation.last_plus(), odr_hz);
    Ok(walk)
}

fn push(walk: &mut WalkPeakTable, peak: WalkPeak) -> Result<(), ClassifyError> {
    walk.push(peak)
        .map_err(|_| ClassifyError::WalkPeakTableOverflow)
}

fn extend(peaks: &[Peak], i: usize, held: Peak, reach: u16) -> Peak {
    let Some(next) = peaks.get(i + 1) else {
        return held;
    };
    if next.direction != held.direction || next.index.cyclic_distance(held.index) >= reach {
        return held;
    }
    let deeper = match held.direction {
        Direction::Minus => next.value <= held.value,
        Direction::Plus => next.value >= held.value,
    };
    if deeper {
        *next
    } else {
        held
    }
}

fn refreshed(held: Peak, incoming: Peak, span: u16) -> Peak {
    let more_extreme = match held.direction {
        Direction::Plus => incoming.value >= held.value,
        Direction::Minus => incoming.value <= held.value,
    };
    if more_extreme || incoming.index.separation(held.index) > span {
        incoming
    } else {
        held
    }
}

pub fn pair_forward(
    peaks: &[Peak],
    ptop_threshold: f32,
    reach: u16,
) -> Result<WalkPeakTable, ClassifyError> {
    let mut walk = WalkPeakTable::new();
    let mut held: Option<Peak> = None;

    for (i, peak) in peaks.iter().enumerate() {
        match (held, peak.direction) {
            (None, Direction::Plus) => held = Some(*peak),
            (None, Direction::Minus) => {}
            (Some(plus), Direction::Plus) => held = Some(refreshed(plus, *peak, reach)),
            (Some(plus), Direction::Minus) => {
                if WalkPeak::from_pair(plus, *peak).ptop_value > ptop_threshold {
                    let minus = extend(peaks, i, *peak, reach);
                    push(&mut walk, WalkPeak::from_pair(plus, minus))?;
                    held = None;
                }
            }
        }
    }

    Ok(walk)
}

#[derive(Clone, Copy, Debug)]
enum BackPhase {
    Start,
    HavePlus(Peak),
    HaveMinus(Peak),
}

pub fn pair_forward_back(
    peaks: &[Peak],
    ptop_threshold: f32,
    reach: u16,
) -> Result<WalkPeakTable, ClassifyError> {
    let mut walk = WalkPeakTable::new();
    let mut phase = BackPhase::Start;

    for (i, peak) in peaks.iter().enumerate() {
        phase = match (phase, peak.direction) {
            (BackPhase::Start, Direction::Plus) => BackPhase::HavePlus(*peak),
            (BackPhase::Start, Direction::Minus) => BackPhase::HaveMinus(*peak),
            (BackPhase::HavePlus(plus), Direction::Plus) => {
                BackPhase::HavePlus(refreshed(plus, *peak, PLUS_REFRESH_SPAN))
            }
            (BackPhase::HaveMinus(minus), Direction::Minus) => {
                BackPhase::HaveMinus(refreshed(minus, *peak, MINUS_REFRESH_SPAN))
            }
            (BackPhase::HavePlus(plus), Direction::Minus) => {
                if WalkPeak::from_pair(plus, *peak).ptop_value > ptop_threshold {
                    let minus = extend(peaks, i, *peak, reach);
                    push(&mut walk, WalkPeak::from_pair(plus, minus))?;
                    BackPhase::Start
                } else {
                    phase
                }
            }
            (BackPhase::HaveMinus(minus), Direction::Plus) => {
                if WalkPeak::from_pair(*peak, minus).ptop_value > ptop_threshold {
                    let plus = extend(peaks, i, *peak, reach);
                    push(&mut walk, WalkPeak::from_pair(plus, minus))?;
                    BackPhase::Start
                } else {
                    phase
                }
            }
        };
    }

    Ok(walk)
}

/// Interval from each walk-peak's plus to the previous one's. The first walk-peak
/// is timed against the carried-over plus when there is one.
pub fn assign_intervals(walk: &mut [WalkPeak], previous_plus: Option<SeqId>, odr_hz: f32) {
    for i in 1..walk.len() {
        let samples = walk[i].plus_seq.cyclic_distance(walk[i - 1].plus_seq);
        walk[i].interval_ms = samples_to_ms(samples, odr_hz);
    }
    if let (Some(first), Some(previous)) = (walk.first_mut(), previous_plus) {
        first.interval_ms = samples_to_ms(first.plus_seq.cyclic_distance(previous), odr_hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plus(index: u16, value: f32) -> Peak {
        Peak {
            value,
            direction: Direction::Plus,
            index: SeqId(index),
        }
    }

    fn minus(index: u16, value: f32) -> Peak {
        Peak {
            value,
            direction: Direction::Minus,
            index: SeqId(index),
        }
    }

    #[test]
    fn forward_pairs_plus_with_following_minus() {
        let peaks = [plus(10, 900.0), minus(20, -700.0), plus(60, 800.0), minus(72, -900.0)];
        let walk = pair_forward(&peaks, 1000.0, 20).expect("fits");

        assert_eq!(walk.len(), 2);
        assert_eq!(walk[0].plus_seq, SeqId(10));
        assert_eq!(walk[0].minus_seq, SeqId(20));
        assert_eq!(walk[0].ptop_value, 1600.0);
        assert_eq!(walk[0].ptop_time, 10);
        assert!(walk[0].valid);
        assert_eq!(walk[1].ptop_time, 12);
    }

    #[test]
    fn small_swings_keep_the_plus_held() {
        let peaks = [
            plus(10, 900.0),
            minus(15, 500.0),
            plus(18, 700.0),
            minus(25, -400.0),
        ];
        let walk = pair_forward(&peaks, 1000.0, 20).expect("fits");

        assert_eq!(walk.len(), 1);
        assert_eq!(walk[0].plus_seq, SeqId(10));
        assert_eq!(walk[0].minus_seq, SeqId(25));
    }

    #[test]
    fn stale_plus_is_replaced() {
        let peaks = [
            plus(10, 900.0),
            minus(15, 500.0),
            plus(40, 700.0),
            minus(45, -400.0),
        ];
        let walk = pair_forward(&peaks, 1000.0, 20).expect("fits");
        assert_eq!(walk[0].plus_seq, SeqId(40));
    }

    #[test]
    fn leading_minus_is_ignored() {
        let peaks = [minus(3, -900.0), plus(10, 900.0), minus(20, -900.0)];
        let walk = pair_forward(&peaks, 1000.0, 20).expect("fits");
        assert_eq!(walk.len(), 1);
        assert_eq!(walk[0].plus_seq, SeqId(10));
    }

    #[test]
    fn forward_back_pairs_minus_first_swings() {
        let peaks = [minus(5, -600.0), plus(12, 400.0), minus(30, -200.0)];
        let walk = pair_forward_back(&peaks, 500.0, 10).expect("fits");

        assert_eq!(walk.len(), 1);
        assert_eq!(walk[0].minus_seq, SeqId(5));
        assert_eq!(walk[0].plus_seq, SeqId(12));
        assert_eq!(walk[0].ptop_time, 7);
    }

    #[test]
    fn forward_back_handles_plus_first_swings() {
        let peaks = [plus(5, 600.0), minus(12, -400.0), plus(30, 200.0), minus(36, -400.0)];
        let walk = pair_forward_back(&peaks, 500.0, 10).expect("fits");

        assert_eq!(walk.len(), 2);
        assert_eq!(walk[0].plus_seq, SeqId(5));
        assert_eq!(walk[1].plus_seq, SeqId(30));
        assert_eq!(walk[1].minus_seq, SeqId(36));
    }

    #[test]
    fn extension_follows_deeper_minus() {
        let peaks = [plus(10, 900.0), minus(20, -700.0), minus(25, -900.0)];
        let walk = pair_forward(&peaks, 1000.0, 20).expect("fits");
        assert_eq!(walk[0].minus_seq, SeqId(25));
        assert_eq!(walk[0].ptop_value, 1800.0);
    }

    #[test]
    fn intervals_use_wrapping_distance() {
        let mut walk = [
            WalkPeak::from_pair(plus(65534, 900.0), minus(2, -900.0)),
            WalkPeak::from_pair(plus(5, 900.0), minus(15, -900.0)),
            WalkPeak::from_pair(plus(65, 900.0), minus(70, -900.0)),
        ];
        assign_intervals(&mut walk, None, 100.0);
        assert_eq!(walk[0].interval_ms, 0);
        assert_eq!(walk[1].interval_ms, 70);
        assert_eq!(walk[2].interval_ms, 600);

        let mut unwrapped = [
            WalkPeak::from_pair(plus(100, 900.0), minus(110, -900.0)),
            WalkPeak::from_pair(plus(107, 900.0), minus(117, -900.0)),
        ];
        assign_intervals(&mut unwrapped, None, 100.0);
        assert_eq!(unwrapped[1].interval_ms, walk[1].interval_ms);
    }

    #[test]
    fn first_interval_uses_continuation() {
        let mut walk = [WalkPeak::from_pair(plus(40, 900.0), minus(50, -900.0))];
        assign_intervals(&mut walk, Some(SeqId(65500)), 100.0);
        assert_eq!(walk[0].interval_ms, 760);
    }

    #[test]
    fn empty_input_yields_empty_table() {
        assert!(pair_forward(&[], 1000.0, 20).expect("fits").is_empty());
        assert!(pair_forward_back(&[], 500.0, 10).expect("fits").is_empty());
    }
}
