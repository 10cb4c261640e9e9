use core::cell::RefCell;

use embassy_sync::blocking_mutex::{raw::CriticalSectionRawMutex, Mutex};

use super::{
    classifiers::AgeBand,
    engine::{ClassifierContext, EngineOutput},
    types::ActivityMode,
};

/// A [`ClassifierContext`] that the sensor interrupt and application tasks can share.
///
/// Every call runs inside one critical section, so a reset can never interleave
/// with a classification cycle.
pub struct SharedClassifier {
    inner: Mutex<CriticalSectionRawMutex, RefCell<ClassifierContext>>,
}

impl SharedClassifier {
    pub const fn new(context: ClassifierContext) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(context)),
        }
    }

    pub fn classify(&self, x: i16, z: i16, seq: u16, mode: ActivityMode) -> EngineOutput {
        self.with(|ctx| ctx.classify(x, z, seq, mode))
    }

    pub fn classify_raw(&self, x: i16, z: i16, seq: u16, mode_id: u8) -> EngineOutput {
        self.with(|ctx| ctx.classify_raw(x, z, seq, mode_id))
    }

    pub fn reset_storage(&self) {
        self.with(ClassifierContext::reset_storage);
    }

    pub fn reset_skyjump_state(&self) {
        self.with(ClassifierContext::reset_skyjump_state);
    }

    pub fn select_age_profile(&self, age: u16) -> AgeBand {
        self.with(|ctx| ctx.select_age_profile(age))
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut ClassifierContext) -> R) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }
}

#[cfg(test)]
mod tests {
    use critical_section as _;

    use super::*;
    use crate::motion_engine::types::Status;

    #[test]
    fn calls_share_one_context() {
        let shared = SharedClassifier::new(ClassifierContext::default());
        for i in 0..20u16 {
            let out = shared.classify(0, 0, i, ActivityMode::Tap);
            assert_eq!(out.status, Status::DataCharging);
        }
        assert_eq!(shared.with(|ctx| ctx.active_mode()), Some(ActivityMode::Tap));

        shared.reset_storage();
        let out = shared.classify_raw(0, 0, 20, ActivityMode::Tap.as_u8());
        assert_eq!(out.current_sample, 1);
        assert_eq!(shared.select_age_profile(12), AgeBand::Senior);
    }
}
