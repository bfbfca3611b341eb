//! Moderation queues for managers.
//!
//! A queue caches one community's items, every page of them. Every action
//! sends exactly one request and, on success, re-fetches the list. Nothing is applied
//! optimistically: when the action fails the cached list stays as it was.

use reqwest::Method;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

use crate::error::{HearthError, Result};
use crate::rest::RestClient;
use crate::types::{
    JoinRequest, Listing, ListingAction, ListingStatus, Pulse, ReviewAction, ReviewStatus,
};

/// What a queue holds and where its endpoints live.
pub trait QueueKind {
    type Item: DeserializeOwned + Clone;
    type Action: Copy;

    const RESOURCE: &'static str;

    fn list_path(community_id: &str) -> String;

    fn action_path(community_id: &str, item_id: &str, action: Self::Action) -> String;

    fn item_id(item: &Self::Item) -> &str;

    /// Status of a cached item, and whether it allows `action`.
    fn check(item: &Self::Item, action: Self::Action) -> (String, bool);

    fn action_name(action: Self::Action) -> &'static str;
}

/// A cached, refreshable moderation list.
pub struct ModerationQueue<K: QueueKind> {
    rest: RestClient,
    community_id: String,
    items: Vec<K::Item>,
    _kind: PhantomData<K>,
}

impl<K: QueueKind> ModerationQueue<K> {
    pub fn new(rest: RestClient, community_id: impl Into<String>) -> Self {
        Self {
            rest,
            community_id: community_id.into(),
            items: Vec::new(),
            _kind: PhantomData,
        }
    }

    pub fn items(&self) -> &[K::Item] {
        &self.items
    }

    /// Replace the cache with the server's current list.
    pub async fn refresh(&mut self) -> Result<&[K::Item]> {
        let path = K::list_path(&self.community_id);
        self.items = self.rest.fetch_all(&path).await?;
        Ok(&self.items)
    }

    /// Apply `action` to one item, then re-fetch.
    ///
    /// A cached item whose status forbids the action is refused without
    /// contacting the server.
    pub async fn act(&mut self, item_id: &str, action: K::Action) -> Result<&[K::Item]> {
        if let Some(item) = self.items.iter().find(|i| K::item_id(i) == item_id) {
            let (status, allowed) = K::check(item, action);
            if !allowed {
                return Err(HearthError::InvalidTransition {
                    resource: K::RESOURCE,
                    status,
                    action: K::action_name(action),
                });
            }
        }

        let path = K::action_path(&self.community_id, item_id, action);
        self.rest
            .request::<serde_json::Value>(Method::PUT, &path, None)
            .await
            .inspect_err(|e| {
                tracing::warn!(
                    resource = K::RESOURCE,
                    item_id,
                    action = K::action_name(action),
                    error = %e,
                    "Moderation action failed"
                );
            })?;

        self.refresh().await
    }
}

/// Actions that include an approve/reject pair.
pub trait Review: Copy {
    const APPROVE: Self;
    const REJECT: Self;
}

impl Review for ReviewAction {
    const APPROVE: Self = ReviewAction::Approve;
    const REJECT: Self = ReviewAction::Reject;
}

impl Review for ListingAction {
    const APPROVE: Self = ListingAction::Approve;
    const REJECT: Self = ListingAction::Reject;
}

impl<K: QueueKind> ModerationQueue<K>
where
    K::Action: Review,
{
    pub async fn approve(&mut self, item_id: &str) -> Result<&[K::Item]> {
        self.act(item_id, <K::Action as Review>::APPROVE).await
    }

    pub async fn reject(&mut self, item_id: &str) -> Result<&[K::Item]> {
        self.act(item_id, <K::Action as Review>::REJECT).await
    }
}

impl ModerationQueue<Listings> {
    pub async fn mark_sold(&mut self, listing_id: &str) -> Result<&[Listing]> {
        self.act(listing_id, ListingAction::MarkSold).await
    }
}

// ── Kinds ─────────────────────────────────────────────────────────────────────

pub struct JoinRequests;

impl QueueKind for JoinRequests {
    type Item = JoinRequest;
    type Action = ReviewAction;
    const RESOURCE: &'static str = "join request";

    fn list_path(community_id: &str) -> String {
        format!("/communities/{community_id}/join-requests")
    }

    fn action_path(community_id: &str, item_id: &str, action: ReviewAction) -> String {
        format!(
            "/communities/{community_id}/join-requests/{item_id}/{}",
            action.as_str()
        )
    }

    fn item_id(item: &JoinRequest) -> &str {
        &item.id
    }

    fn check(item: &JoinRequest, action: ReviewAction) -> (String, bool) {
        review_check(item.status, action)
    }

    fn action_name(action: ReviewAction) -> &'static str {
        action.as_str()
    }
}

pub struct Pulses;

impl QueueKind for Pulses {
    type Item = Pulse;
    type Action = ReviewAction;
    const RESOURCE: &'static str = "pulse";

    fn list_path(community_id: &str) -> String {
        format!("/pulses?community_id={community_id}")
    }

    fn action_path(_community_id: &str, item_id: &str, action: ReviewAction) -> String {
        format!("/pulses/{item_id}/{}", action.as_str())
    }

    fn item_id(item: &Pulse) -> &str {
        &item.id
    }

    fn check(item: &Pulse, action: ReviewAction) -> (String, bool) {
        review_check(item.status, action)
    }

    fn action_name(action: ReviewAction) -> &'static str {
        action.as_str()
    }
}

pub struct Listings;

impl QueueKind for Listings {
    type Item = Listing;
    type Action = ListingAction;
    const RESOURCE: &'static str = "listing";

    fn list_path(community_id: &str) -> String {
        format!("/marketplace?community_id={community_id}")
    }

    fn action_path(_community_id: &str, item_id: &str, action: ListingAction) -> String {
        format!("/marketplace/{item_id}/{}", action.path_segment())
    }

    fn item_id(item: &Listing) -> &str {
        &item.id
    }

    fn check(item: &Listing, action: ListingAction) -> (String, bool) {
        listing_check(item.status, action)
    }

    fn action_name(action: ListingAction) -> &'static str {
        match action {
            ListingAction::Approve => "approve",
            ListingAction::Reject => "reject",
            ListingAction::MarkSold => "mark_sold",
        }
    }
}

fn review_check(status: ReviewStatus, action: ReviewAction) -> (String, bool) {
    (status.as_str().to_owned(), status.allows(action))
}

fn listing_check(status: ListingStatus, action: ListingAction) -> (String, bool) {
    (status.as_str().to_owned(), status.allows(action))
}

pub type JoinRequestQueue = ModerationQueue<JoinRequests>;
pub type PulseQueue = ModerationQueue<Pulses>;
pub type ListingQueue = ModerationQueue<Listings>;
