use super::{seq::SeqId, types::Sample};

pub const MEDIAN_LEN: usize = 7;
pub const AVERAGE_LEN: usize = 8;

/// Samples of lag the two stages add to any feature located in the filtered stream.
pub const FILTER_GROUP_DELAY: u16 = (MEDIAN_LEN + AVERAGE_LEN - 2) as u16;

/// Raw samples consumed before the chain emits its first output.
pub const FILTER_WARMUP: u16 = (MEDIAN_LEN + AVERAGE_LEN - 2) as u16;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RawPoint {
    pub value: i16,
    pub seq: SeqId,
}

#[derive(Clone, Copy, Debug)]
pub struct MedianFilter {
    slots: [RawPoint; MEDIAN_LEN],
    len: usize,
}

impl Default for MedianFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl MedianFilter {
    pub const fn new() -> Self {
        Self {
            slots: [RawPoint {
                value: 0,
                seq: SeqId(0),
            }; MEDIAN_LEN],
            len: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn push(&mut self, value: i16, seq: SeqId) -> Option<RawPoint> {
        let point = RawPoint { value, seq };
        if self.len < MEDIAN_LEN {
            self.slots[self.len] = point;
            self.len += 1;
            if self.len < MEDIAN_LEN {
                return None;
            }
        } else {
            self.slots.copy_within(1.., 0);
            self.slots[MEDIAN_LEN - 1] = point;
        }

        let mut sorted = [0i16; MEDIAN_LEN];
        for (dst, src) in sorted.iter_mut().zip(self.slots.iter()) {
            *dst = src.value;
        }
        sorted.sort_unstable();
        Some(RawPoint {
            value: sorted[MEDIAN_LEN / 2],
            seq,
        })
    }
}

#[derive(Clone, Copy, Debug)]
pub struct MovingAverage {
    slots: [RawPoint; AVERAGE_LEN],
    len: usize,
}

impl Default for MovingAverage {
    fn default() -> Self {
        Self::new()
    }
}

impl MovingAverage {
    pub const fn new() -> Self {
        Self {
            slots: [RawPoint {
                value: 0,
                seq: SeqId(0),
            }; AVERAGE_LEN],
            len: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn push(&mut self, point: RawPoint) -> Option<Sample> {
        if self.len < AVERAGE_LEN {
            self.slots[self.len] = point;
            self.len += 1;
            if self.len < AVERAGE_LEN {
                return None;
            }
        } else {
            self.slots.copy_within(1.., 0);
            self.slots[AVERAGE_LEN - 1] = point;
        }

        let sum: i32 = self.slots.iter().map(|p| p.value as i32).sum();
        Some(Sample {
            value: sum as f32 / AVERAGE_LEN as f32,
            seq: point.seq,
        })
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct FilterChain {
    median: MedianFilter,
    average: MovingAverage,
}

impl FilterChain {
    pub const fn new() -> Self {
        Self {
            median: MedianFilter::new(),
            average: MovingAverage::new(),
        }
    }

    pub fn reset(&mut self) {
        self.median.reset();
        self.average.reset();
    }

    pub fn filter(&mut self, raw: i16, seq: SeqId) -> Option<Sample> {
        let median = self.median.push(raw, seq)?;
        self.average.push(median)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_waits_for_seven_samples() {
        let mut filter = MedianFilter::new();
        let values = [9, -4, 120, 7, 3, 55, -30];
        for (i, value) in values.iter().take(6).enumerate() {
            assert_eq!(filter.push(*value, SeqId(i as u16)), None);
        }
        let out = filter.push(values[6], SeqId(6)).expect("seventh sample fills the ring");
        assert_eq!(out.value, 7);
        assert_eq!(out.seq, SeqId(6));
    }

    #[test]
    fn median_drops_the_oldest_sample() {
        let mut filter = MedianFilter::new();
        for i in 0..7 {
            filter.push(1000, SeqId(i));
        }
        for i in 7..10 {
            assert_eq!(filter.push(0, SeqId(i)).map(|p| p.value), Some(1000));
        }
        assert_eq!(filter.push(0, SeqId(10)).map(|p| p.value), Some(0));
    }

    #[test]
    fn average_of_eight() {
        let mut average = MovingAverage::new();
        for i in 0..7u16 {
            let point = RawPoint {
                value: (i as i16) * 8,
                seq: SeqId(i),
            };
            assert!(average.push(point).is_none());
        }
        let out = average
            .push(RawPoint {
                value: 56,
                seq: SeqId(7),
            })
            .expect("eighth sample fills the ring");
        assert_eq!(out.value, 28.0);
        assert_eq!(out.seq, SeqId(7));
    }

    #[test]
    fn chain_emits_after_warmup() {
        let mut chain = FilterChain::new();
        for i in 0..FILTER_WARMUP {
            assert!(chain.filter(250, SeqId(i)).is_none());
        }
        let out = chain
            .filter(250, SeqId(FILTER_WARMUP))
            .expect("chain is primed");
        assert_eq!(out.value, 250.0);
        assert_eq!(out.seq, SeqId(FILTER_WARMUP));
    }

    #[test]
    fn reset_returns_to_cold_state() {
        let mut chain = FilterChain::new();
        for i in 0..20 {
            chain.filter(10, SeqId(i));
        }
        chain.reset();
        assert!(chain.filter(10, SeqId(20)).is_none());
    }
}
