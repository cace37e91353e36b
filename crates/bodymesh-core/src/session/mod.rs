//! Remote reconstruction session client with bounded retry.

mod client;
mod retry;

pub use client::{SessionCheck, SessionClient};
pub use retry::RetryPolicy;
