//! Database entities.

#![allow(missing_docs)]

pub mod activity;
pub mod feed_item;
pub mod follow;

pub use activity::Entity as Activity;
pub use feed_item::Entity as FeedItem;
pub use follow::Entity as Follow;
