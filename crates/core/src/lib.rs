pub mod dashboard;
pub mod error;
pub mod format;
pub mod generation;
pub mod model;
pub mod scoring;
pub mod time;

pub use error::Error;
pub use time::Clock;
