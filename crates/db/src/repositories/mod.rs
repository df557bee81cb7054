//! Database repositories.

#![allow(missing_docs)]

pub mod activity;
pub mod feed_item;
pub mod follow;

pub use activity::ActivityRepository;
pub use feed_item::FeedItemRepository;
pub use follow::FollowRepository;
