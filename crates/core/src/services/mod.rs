//! Business logic services.

#![allow(missing_docs)]

pub mod activity;
pub mod dispatch;
pub mod fan_out;
pub mod feed;
pub mod follow;

pub use activity::{ActivityService, CreateActivityInput};
pub use dispatch::{FanOutDispatch, FanOutDispatcher, NullDispatcher};
pub use fan_out::FanOutService;
pub use feed::{ActivitySnapshot, AggregatedActivity, FeedItemView, FeedPage, FeedService};
pub use follow::{FollowService, FollowStats};
