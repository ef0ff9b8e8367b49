pub mod countries;
pub mod geo;
pub mod live;
pub mod presence;
pub mod visits;

pub use live::{LiveStats, LiveStatsHandle};
