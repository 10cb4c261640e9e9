pub mod classifiers;
pub mod config;
pub mod continuity;
pub mod engine;
pub mod filters;
pub mod pairing;
pub mod peak_hsm;
pub mod rejection;
pub mod seq;
pub mod shared;
pub mod threshold;
pub mod trace;
pub mod types;
pub mod wakeup;
pub mod window;

pub use classifiers::AgeBand;
pub use config::{active_config, ActivityConfig, ModeConfig};
pub use engine::{ClassifierContext, EngineOutput};
pub use seq::SeqId;
pub use shared::SharedClassifier;
pub use trace::CycleTrace;
pub use types::{
    ActivityMode, Axis, ClassifyError, DailyCount, FlightRecord, ModeResult, OnsetRecord, Status,
};
pub use wakeup::LateralWakeup;
