//! Feed reader and read-state tracker.

use pulse_common::AppResult;
use pulse_db::entities::activity::ActivityVerb;
use pulse_db::entities::feed_item;
use pulse_db::repositories::FeedItemRepository;
use sea_orm::entity::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;

/// The activity fields frozen into a feed item at fan-out time.
///
/// Unknown fields in the stored snapshot are ignored so older snapshots
/// keep deserializing as the activity shape grows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySnapshot {
    pub id: String,
    pub actor: String,
    pub verb: ActivityVerb,
    pub object: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_id: Option<String>,
    pub occurred_at: DateTimeWithTimeZone,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// A feed item as served to readers.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItemView {
    pub id: String,
    pub activity_id: String,
    /// The frozen activity snapshot, or an "activity unavailable"
    /// placeholder when the stored snapshot cannot be decoded (e.g. an
    /// orphan left by a crash mid cascade-delete).
    pub activity: serde_json::Value,
    pub score: i64,
    pub seen: bool,
    pub read: bool,
    pub created_at: DateTimeWithTimeZone,
}

impl From<feed_item::Model> for FeedItemView {
    fn from(item: feed_item::Model) -> Self {
        let activity =
            if serde_json::from_value::<ActivitySnapshot>(item.activity_snapshot.clone()).is_ok() {
                item.activity_snapshot
            } else {
                json!({
                    "id": item.activity_id,
                    "object": "activity unavailable",
                })
            };

        Self {
            id: item.id,
            activity_id: item.activity_id,
            activity,
            score: item.score,
            seen: item.is_seen,
            read: item.is_read,
            created_at: item.created_at,
        }
    }
}

/// One page of a user's feed.
#[derive(Debug, Clone, Serialize)]
pub struct FeedPage {
    pub items: Vec<FeedItemView>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub has_more: bool,
}

/// Activities of one page grouped by verb.
#[derive(Debug, Clone, Serialize)]
pub struct AggregatedActivity {
    pub group_key: String,
    pub verb: ActivityVerb,
    pub actors: Vec<String>,
    pub activity_count: u64,
    pub first_activity: ActivitySnapshot,
    pub latest_activity: ActivitySnapshot,
    pub window_start: DateTimeWithTimeZone,
    pub window_end: DateTimeWithTimeZone,
}

/// Feed reader service.
///
/// Serves the denormalized per-owner feed rows written by fan-out and owns
/// the seen/read flags on them.
#[derive(Clone)]
pub struct FeedService {
    feed_item_repo: FeedItemRepository,
}

impl FeedService {
    /// Create a new feed service.
    #[must_use]
    pub const fn new(feed_item_repo: FeedItemRepository) -> Self {
        Self { feed_item_repo }
    }

    /// Get a page of a user's feed, highest score first.
    pub async fn get_feed_items(
        &self,
        tenant_id: &str,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<FeedPage> {
        let page = page.max(1);
        let offset = (page - 1) * limit;

        let total = self.feed_item_repo.count_by_owner(tenant_id, user_id).await?;
        let items = self
            .feed_item_repo
            .find_by_owner(tenant_id, user_id, limit, offset)
            .await?;

        Ok(FeedPage {
            items: items.into_iter().map(Into::into).collect(),
            total,
            page,
            limit,
            has_more: total > page * limit,
        })
    }

    /// Get a page of a user's feed grouped by verb.
    ///
    /// Grouping is scoped to the fetched page, not the full feed: the page
    /// is selected exactly as in [`Self::get_feed_items`] and only then
    /// collapsed into one group per distinct verb. Items whose snapshot
    /// cannot be decoded are left out of the groups.
    pub async fn get_aggregated_feed(
        &self,
        tenant_id: &str,
        user_id: &str,
        page: u64,
        limit: u64,
    ) -> AppResult<Vec<AggregatedActivity>> {
        let page = page.max(1);
        let offset = (page - 1) * limit;

        let items = self
            .feed_item_repo
            .find_by_owner(tenant_id, user_id, limit, offset)
            .await?;

        let mut groups: Vec<AggregatedActivity> = Vec::new();
        let mut index: HashMap<ActivityVerb, usize> = HashMap::new();

        for item in items {
            let Ok(snapshot) =
                serde_json::from_value::<ActivitySnapshot>(item.activity_snapshot.clone())
            else {
                tracing::debug!(
                    item_id = %item.id,
                    activity_id = %item.activity_id,
                    "Skipping feed item with unreadable snapshot"
                );
                continue;
            };

            if let Some(&i) = index.get(&snapshot.verb) {
                let group = &mut groups[i];
                group.activity_count += 1;
                if !group.actors.contains(&snapshot.actor) {
                    group.actors.push(snapshot.actor.clone());
                }
                if snapshot.occurred_at < group.first_activity.occurred_at {
                    group.first_activity = snapshot.clone();
                }
                if snapshot.occurred_at > group.latest_activity.occurred_at {
                    group.latest_activity = snapshot.clone();
                }
                if item.created_at < group.window_start {
                    group.window_start = item.created_at;
                }
                if item.created_at > group.window_end {
                    group.window_end = item.created_at;
                }
            } else {
                index.insert(snapshot.verb, groups.len());
                groups.push(AggregatedActivity {
                    group_key: String::new(),
                    verb: snapshot.verb,
                    actors: vec![snapshot.actor.clone()],
                    activity_count: 1,
                    first_activity: snapshot.clone(),
                    latest_activity: snapshot,
                    window_start: item.created_at,
                    window_end: item.created_at,
                });
            }
        }

        for group in &mut groups {
            group.group_key = format!("{}-{}", group.verb.as_str(), group.window_start.timestamp());
        }

        Ok(groups)
    }

    /// Mark feed items as seen.
    ///
    /// IDs that do not exist or are owned by someone else are silently
    /// ignored so repeated or late calls stay safe no-ops. Returns the
    /// number of items updated.
    pub async fn mark_seen(
        &self,
        tenant_id: &str,
        user_id: &str,
        item_ids: &[String],
    ) -> AppResult<u64> {
        self.feed_item_repo
            .mark_seen(tenant_id, user_id, item_ids)
            .await
    }

    /// Mark feed items as read (and therefore seen).
    ///
    /// Same silent-ignore policy as [`Self::mark_seen`].
    pub async fn mark_read(
        &self,
        tenant_id: &str,
        user_id: &str,
        item_ids: &[String],
    ) -> AppResult<u64> {
        self.feed_item_repo
            .mark_read(tenant_id, user_id, item_ids)
            .await
    }
}
