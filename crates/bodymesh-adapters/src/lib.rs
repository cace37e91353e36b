//! Bodymesh Adapters - HTTP implementations of the core ports.
//!
//! This crate provides adapters for:
//! - The avatar and session record store
//! - The 3D reconstruction service
//! - Pose detection, background removal and size recommendation
//! - The fitting registration callback

mod csm;
mod http;
mod pocketbase;
mod services;

pub use csm::CsmReconstruction;
pub use http::build_client;
pub use pocketbase::PocketBaseStore;
pub use services::{
    HttpBackgroundRemover, HttpPoseDetector, HttpRegistration, HttpSizeAdvisor,
    PassthroughBackgroundRemover,
};
