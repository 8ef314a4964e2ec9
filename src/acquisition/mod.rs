//! End-to-end "show me something new" operation.

mod controller;
mod retry;

pub use controller::{
    AcquireOutcome, AcquisitionController, AcquisitionEvent, Phase, DEFAULT_MAX_ATTEMPTS,
};
pub use retry::{acquire_observed, acquire_with_rotation};
