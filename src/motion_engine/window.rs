use heapless::Vec;

use super::{
    seq::SeqId,
    types::{Sample, WINDOW_CAPACITY},
};

/// Filtered samples awaiting classification, in arrival order.
#[derive(Clone, Debug, Default)]
pub struct SampleWindow {
    samples: Vec<Sample, WINDOW_CAPACITY>,
}

impl SampleWindow {
    pub const fn new() -> Self {
        Self {
            samples: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn push(&mut self, sample: Sample) -> bool {
        self.samples.push(sample).is_ok()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }

    pub fn first_seq(&self) -> Option<SeqId> {
        self.samples.first().map(|s| s.seq)
    }

    /// Keeps the newer half so the next cycle overlaps the previous one.
    pub fn slide_half(&mut self) {
        let len = self.samples.len();
        let keep = len - len / 2;
        self.samples.copy_within(len - keep.., 0);
        self.samples.truncate(keep);
    }
}

pub fn position_of(samples: &[Sample], seq: SeqId) -> Option<usize> {
    samples.iter().position(|s| s.seq == seq)
}
