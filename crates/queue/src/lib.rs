//! Background job queue for pulse-feed.
//!
//! This crate provides asynchronous fan-out processing using Redis:
//!
//! - **Jobs**: write-time fan-out of activities into follower feeds
//! - **Workers**: concurrent job execution with Apalis
//! - **Dispatch**: the queue-backed [`pulse_core::FanOutDispatch`] impl
//!
//! Delivery is at-least-once; the feed-item unique key makes repeated
//! executions of the same job converge on the same rows.

pub mod dispatch_impl;
pub mod jobs;
pub mod workers;

pub use dispatch_impl::RedisFanOutDispatcher;
pub use jobs::*;
pub use workers::*;
