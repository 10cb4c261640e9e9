use heapless::Vec;

use super::{
    seq::SeqId,
    types::{WalkPeak, TABLE_CAPACITY},
};

const DECAY_LIMIT: u8 = 3;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Decay(u8);

impl Default for Decay {
    fn default() -> Self {
        Self(1)
    }
}

impl Decay {
    pub fn refresh(&mut self) {
        self.0 = 1;
    }

    /// Counts an empty window. Returns true once the carried state has expired.
    pub fn miss(&mut self) -> bool {
        if self.0 > DECAY_LIMIT {
            self.0 = 1;
            true
        } else {
            self.0 += 1;
            false
        }
    }
}

/// Last plus peak paired on an axis, used to time the first walk-peak of the next window.
#[derive(Clone, Copy, Debug, Default)]
pub struct Continuation {
    last_plus: Option<SeqId>,
    decay: Decay,
}

impl Continuation {
    pub fn last_plus(&self) -> Option<SeqId> {
        self.last_plus
    }

    pub fn observe(&mut self, walk: &[WalkPeak]) {
        match walk.last() {
            Some(last) => {
                self.last_plus = Some(last.plus_seq);
                self.decay.refresh();
            }
            None => {
                if self.decay.miss() {
                    self.last_plus = None;
                }
            }
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct CarriedPeak {
    pub plus_seq: SeqId,
    pub plus_value: f32,
    pub minus_seq: SeqId,
}

/// Walk-peaks accepted in the previous window, compared against the next one.
#[derive(Clone, Debug, Default)]
pub struct CarriedPeaks {
    entries: Vec<CarriedPeak, TABLE_CAPACITY>,
    decay: Decay,
}

impl CarriedPeaks {
    pub fn entries(&self) -> &[CarriedPeak] {
        &self.entries
    }

    pub fn last(&self) -> Option<&CarriedPeak> {
        self.entries.last()
    }

    pub fn observe(&mut self, walk: &[WalkPeak]) {
        if walk.is_empty() {
            if self.decay.miss() {
                self.entries.clear();
            }
            return;
        }

        self.entries.clear();
        for peak in walk.iter().filter(|w| w.valid) {
            // Same capacity as the walk-peak table.
            let _ = self.entries.push(CarriedPeak {
                plus_seq: peak.plus_seq,
                plus_value: peak.plus_value,
                minus_seq: peak.minus_seq,
            });
        }
        self.decay.refresh();
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.decay = Decay::default();
    }
}

#[derive(Clone, Debug, Default)]
pub struct AxisTrack {
    pub continuation: Continuation,
    pub carried: CarriedPeaks,
}

impl AxisTrack {
    pub fn clear(&mut self) {
        self.continuation.clear();
        self.carried.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk_at(plus: u16, minus: u16) -> WalkPeak {
        WalkPeak {
            plus_seq: SeqId(plus),
            plus_value: 900.0,
            minus_seq: SeqId(minus),
            minus_value: -900.0,
            ptop_value: 1800.0,
            ptop_time: minus.wrapping_sub(plus),
            interval_ms: 0,
            valid: true,
        }
    }

    #[test]
    fn continuation_expires_after_four_empty_windows() {
        let mut continuation = Continuation::default();
        continuation.observe(&[walk_at(10, 20), walk_at(60, 70)]);
        assert_eq!(continuation.last_plus(), Some(SeqId(60)));

        for _ in 0..3 {
            continuation.observe(&[]);
            assert_eq!(continuation.last_plus(), Some(SeqId(60)));
        }
        continuation.observe(&[]);
        assert_eq!(continuation.last_plus(), None);
    }

    #[test]
    fn success_resets_decay() {
        let mut continuation = Continuation::default();
        continuation.observe(&[walk_at(10, 20)]);
        continuation.observe(&[]);
        continuation.observe(&[]);
        continuation.observe(&[walk_at(300, 310)]);
        for _ in 0..3 {
            continuation.observe(&[]);
        }
        assert_eq!(continuation.last_plus(), Some(SeqId(300)));
    }

    #[test]
    fn carried_list_replaced_by_valid_entries() {
        let mut carried = CarriedPeaks::default();
        let mut dropped = walk_at(40, 50);
        dropped.valid = false;
        carried.observe(&[walk_at(10, 20), dropped, walk_at(70, 80)]);

        assert_eq!(carried.entries().len(), 2);
        assert_eq!(carried.last().map(|c| c.plus_seq), Some(SeqId(70)));

        carried.observe(&[walk_at(200, 210)]);
        assert_eq!(carried.entries().len(), 1);
    }

    #[test]
    fn carried_list_survives_short_gaps() {
        let mut carried = CarriedPeaks::default();
        carried.observe(&[walk_at(10, 20)]);
        for _ in 0..3 {
            carried.observe(&[]);
        }
        assert_eq!(carried.entries().len(), 1);
        carried.observe(&[]);
        assert!(carried.entries().is_empty());
    }
}
