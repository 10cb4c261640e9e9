pub mod counts;
pub mod flight;
pub mod gait;
pub mod onset;

pub use counts::{count_matching, count_side_steps};
pub use flight::{measure_flight, FlightOutcome};
pub use gait::{bucket_steps, AgeBand, GaitTracker};
pub use onset::{speed_reaction_onset, start_reaction_onset};
