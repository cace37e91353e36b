//! Port definitions for hexagonal architecture.
//!
//! These traits define the boundaries between the core and the external
//! services it talks to. Adapters implement them over HTTP; tests use the
//! mocks in `bodymesh-test-support`.

mod capabilities;
mod reconstruction;
mod record_store;

pub use capabilities::{BackgroundRemover, PoseDetector, RegistrationHook, SizeAdvisor};
pub use reconstruction::{ReconstructionService, RemoteSession};
pub use record_store::RecordStore;
