use log::debug;

use crate::motion_engine::{
    config::{GaitConfig, IntervalLimits},
    types::{DailyCount, WalkPeak},
};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Default)]
pub enum AgeBand {
    #[default]
    Junior,
    Senior,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Stride {
    Walk,
    Run,
    Dash,
}

fn stride_for(interval_ms: u32, limits: IntervalLimits, gait: &GaitConfig) -> Option<Stride> {
    if limits.run_up_ms < interval_ms && interval_ms < gait.walk_up_ms {
        Some(Stride::Walk)
    } else if limits.dash_up_ms < interval_ms && interval_ms <= limits.run_up_ms {
        Some(Stride::Run)
    } else if gait.dash_floor_ms < interval_ms && interval_ms <= limits.dash_up_ms {
        Some(Stride::Dash)
    } else {
        None
    }
}

fn add(count: &mut DailyCount, stride: Stride, times: u16) {
    match stride {
        Stride::Walk => count.walk += times,
        Stride::Run => count.run += times,
        Stride::Dash => count.dash += times,
    }
}

/// Buckets walk-peak intervals into walk, run and dash strides.
pub fn bucket_steps(walk: &[WalkPeak], limits: IntervalLimits, gait: &GaitConfig) -> DailyCount {
    let mut count = DailyCount::default();
    let Some(first) = walk.first() else {
        return count;
    };

    if walk.len() == 1 {
        if first.interval_ms != 0 {
            if let Some(stride) = stride_for(first.interval_ms, limits, gait) {
                add(&mut count, stride, 1);
            }
        } else if first.ptop_value >= gait.single_run_min_ptop {
            count.run += 1;
        } else if first.ptop_value >= gait.single_walk_min_ptop {
            count.walk += 1;
        }
        return count;
    }

    if first.interval_ms == 0 {
        // The untimed first stride is credited through the second one.
        for (i, peak) in walk.iter().enumerate().skip(1) {
            if let Some(stride) = stride_for(peak.interval_ms, limits, gait) {
                add(&mut count, stride, if i == 1 { 2 } else { 1 });
            }
        }
    } else {
        for peak in walk {
            if let Some(stride) = stride_for(peak.interval_ms, limits, gait) {
                add(&mut count, stride, 1);
            }
        }
    }
    count
}

/// Daily-mode stride state: active age band and a withheld single run or dash.
#[derive(Clone, Copy, Debug, Default)]
pub struct GaitTracker {
    band: AgeBand,
    pending: DailyCount,
}

impl GaitTracker {
    pub fn band(&self) -> AgeBand {
        self.band
    }

    pub fn limits(&self, gait: &GaitConfig) -> IntervalLimits {
        match self.band {
            AgeBand::Junior => gait.junior,
            AgeBand::Senior => gait.senior,
        }
    }

    pub fn select_age(&mut self, age: u16, gait: &GaitConfig) -> AgeBand {
        self.band = if age <= gait.change_age {
            AgeBand::Junior
        } else {
            AgeBand::Senior
        };
        self.band
    }

    pub fn pending(&self) -> DailyCount {
        self.pending
    }

    pub fn clear_pending(&mut self) {
        self.pending = DailyCount::default();
    }

    /// A lone run or dash is held back one cycle and only reported together
    /// with a following run or dash.
    pub fn settle(&mut self, mut count: DailyCount) -> DailyCount {
        let isolated = count.walk == 0 && count.run + count.dash == 1;
        let has_pending = self.pending.run > 0 || self.pending.dash > 0;

        if isolated {
            if has_pending {
                count.run += self.pending.run;
                count.dash += self.pending.dash;
                self.clear_pending();
            } else {
                debug!("withholding single run/dash");
                self.pending = count;
                count.run = 0;
                count.dash = 0;
            }
            return count;
        }

        if (count.run > 0 || count.dash > 0) && has_pending {
            count.run += self.pending.run;
            count.dash += self.pending.dash;
        }
        self.clear_pending();
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion_engine::{config::active_config, seq::SeqId};

    fn gait() -> GaitConfig {
        active_config().gait
    }

    fn stride(interval_ms: u32, ptop_value: f32) -> WalkPeak {
        WalkPeak {
            plus_seq: SeqId(0),
            plus_value: 0.0,
            minus_seq: SeqId(0),
            minus_value: 0.0,
            ptop_value,
            ptop_time: 0,
            interval_ms,
            valid: true,
        }
    }

    #[test]
    fn intervals_bucket_by_age_limits() {
        let gait = gait();
        let walk = [stride(1200, 2000.0), stride(700, 2000.0), stride(620, 2000.0), stride(400, 2000.0)];

        let junior = bucket_steps(&walk, gait.junior, &gait);
        assert_eq!(junior, DailyCount { walk: 1, run: 2, dash: 1 });

        let senior = bucket_steps(&walk, gait.senior, &gait);
        assert_eq!(senior, DailyCount { walk: 1, run: 1, dash: 2 });
    }

    #[test]
    fn out_of_range_intervals_are_ignored() {
        let gait = gait();
        let walk = [stride(3000, 2000.0), stride(300, 2000.0), stride(5000, 2000.0)];
        assert_eq!(bucket_steps(&walk, gait.junior, &gait), DailyCount::default());
    }

    #[test]
    fn single_untimed_stride_uses_amplitude() {
        let gait = gait();
        assert_eq!(
            bucket_steps(&[stride(0, 3000.0)], gait.senior, &gait),
            DailyCount { walk: 1, run: 0, dash: 0 }
        );
        assert_eq!(
            bucket_steps(&[stride(0, 4500.0)], gait.senior, &gait),
            DailyCount { walk: 0, run: 1, dash: 0 }
        );
        assert_eq!(
            bucket_steps(&[stride(0, 999.0)], gait.senior, &gait),
            DailyCount::default()
        );
    }

    #[test]
    fn untimed_first_stride_doubles_the_second() {
        let gait = gait();
        let walk = [stride(0, 2000.0), stride(1000, 2000.0), stride(1100, 2000.0)];
        assert_eq!(
            bucket_steps(&walk, gait.junior, &gait),
            DailyCount { walk: 3, run: 0, dash: 0 }
        );
    }

    #[test]
    fn empty_list_counts_nothing() {
        let gait = gait();
        assert_eq!(bucket_steps(&[], gait.junior, &gait), DailyCount::default());
    }

    #[test]
    fn age_band_switches_after_change_age() {
        let gait = gait();
        let mut tracker = GaitTracker::default();
        assert_eq!(tracker.select_age(8, &gait), AgeBand::Junior);
        assert_eq!(tracker.limits(&gait).dash_up_ms, 600);
        assert_eq!(tracker.select_age(10, &gait), AgeBand::Senior);
        assert_eq!(tracker.limits(&gait).dash_up_ms, 650);
    }

    #[test]
    fn lone_run_is_withheld_then_merged() {
        let mut tracker = GaitTracker::default();
        let lone = DailyCount { walk: 0, run: 1, dash: 0 };

        assert_eq!(tracker.settle(lone), DailyCount::default());
        assert_eq!(tracker.pending(), lone);

        assert_eq!(tracker.settle(lone), DailyCount { walk: 0, run: 2, dash: 0 });
        assert_eq!(tracker.pending(), DailyCount::default());
    }

    #[test]
    fn withheld_run_dropped_by_walking() {
        let mut tracker = GaitTracker::default();
        tracker.settle(DailyCount { walk: 0, run: 0, dash: 1 });

        let walking = DailyCount { walk: 3, run: 0, dash: 0 };
        assert_eq!(tracker.settle(walking), walking);
        assert_eq!(tracker.pending(), DailyCount::default());
    }

    #[test]
    fn withheld_run_joins_a_longer_burst() {
        let mut tracker = GaitTracker::default();
        tracker.settle(DailyCount { walk: 0, run: 1, dash: 0 });

        let burst = DailyCount { walk: 1, run: 2, dash: 0 };
        assert_eq!(tracker.settle(burst), DailyCount { walk: 1, run: 3, dash: 0 });
    }
}
