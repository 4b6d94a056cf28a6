// Library surface for the binary, headless runs and integration tests.
// Keep this free of terminal setup; that lives in main.rs.
pub mod activity;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod estimator;
pub mod export;
pub mod keymap;
pub mod logging;
pub mod report;
pub mod runtime;
pub mod sampler;
pub mod session;
pub mod store;
pub mod time_series;
pub mod tracker;
pub mod util;

pub use activity::ActivityState;
pub use error::{Error, StoreError};
pub use store::{Sample, SampleStore};
pub use tracker::{Tracker, TrackerEvent};
