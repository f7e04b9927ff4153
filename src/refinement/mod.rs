// Refinement workflow
//
// The controller drives generate/refine requests; the validation gate runs
// the automatic critique loop for test cases; retry bounds every provider
// call.

pub mod controller;
pub mod gate;
pub mod retry;
pub mod types;

pub use controller::RefinementController;
pub use gate::ValidationGate;
pub use retry::{with_retry, RetryPolicy};
pub use types::{GenerationOutcome, ValidationReport, ValidationStatus};
