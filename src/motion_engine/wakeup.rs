use log::info;

use super::{config::WakeupConfig, seq::SeqId};

/// Raises a latched flag after repeated hard lateral pushes in quick succession.
///
/// A burst is a run of at least `min_run` consecutive samples at or below
/// `-threshold`. The flag latches once `bursts` bursts end less than
/// `pair_window` sequence ids apart.
#[derive(Clone, Copy, Debug)]
pub struct LateralWakeup {
    config: WakeupConfig,
    run: u16,
    run_end: SeqId,
    bursts: u8,
    last_burst_end: Option<SeqId>,
    latched: bool,
}

impl LateralWakeup {
    pub const fn new(config: WakeupConfig) -> Self {
        Self {
            config,
            run: 0,
            run_end: SeqId(0),
            bursts: 0,
            last_burst_end: None,
            latched: false,
        }
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    pub fn feed(&mut self, seq: SeqId, lateral: i16) -> bool {
        if self.latched {
            return true;
        }

        if (lateral as i32) <= -(self.config.threshold as i32) {
            self.run = self.run.saturating_add(1);
            self.run_end = seq;
            return false;
        }

        if self.run >= self.config.min_run {
            self.finish_burst();
        }
        self.run = 0;
        self.latched
    }

    /// Clears the latch and any partial burst history.
    pub fn rearm(&mut self) {
        *self = Self::new(self.config);
    }

    fn finish_burst(&mut self) {
        let end = self.run_end;
        self.bursts = match self.last_burst_end {
            Some(previous) if end.cyclic_distance(previous) < self.config.pair_window => {
                self.bursts.saturating_add(1)
            }
            _ => 1,
        };
        self.last_burst_end = Some(end);

        if self.bursts >= self.config.bursts {
            info!("lateral wakeup at seq {}", end.get());
            self.latched = true;
        }
    }
}
