pub mod cancel;
pub mod config;
pub mod error;
pub mod ics;
pub mod model;
pub mod report;
pub mod scheduler;
pub mod services;
pub mod store;
pub mod template;
pub mod utils;

pub use crate::cancel::CancelToken;
pub use crate::error::{CoreError, CoreResult};
pub use crate::scheduler::{BatchReport, Scheduler, StepOutcome};
