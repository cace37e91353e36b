//! Test support utilities for bodymesh.
//!
//! Provides mock port implementations and synthetic landmark builders for
//! testing the measurement engine and the avatar session lifecycle.
//!
//! # Example
//!
//! ```
//! use bodymesh_test_support::{LandmarkSetBuilder, MockRecordStore};
//!
//! // A 170 cm figure with 40 cm shoulders
//! let builder = LandmarkSetBuilder::new().shoulder_cm(40.0);
//! let front = builder.front();
//! let side = builder.side();
//!
//! // A store with one session waiting on reconstruction
//! let store = MockRecordStore::new().with_pending_session("session-1", "avatar-1");
//! ```

mod builders;
mod mocks;

pub use builders::LandmarkSetBuilder;
pub use mocks::{
    unreachable, AvatarUpdate, MockBackgroundRemover, MockPoseDetector, MockReconstruction,
    MockRecordStore, MockRegistration, MockSizeAdvisor, SessionRow,
};
