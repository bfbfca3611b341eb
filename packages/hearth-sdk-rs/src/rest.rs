//! Async REST client for the Hearth API.

use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use crate::envelope::{error_message, unwrap_envelope};
use crate::error::{HearthError, Result};
use crate::types::*;

const DEFAULT_BASE: &str = "http://localhost:8080/api/v1";

/// Page size requested by list calls. Must not exceed the server's
/// `limits.max_page_size`, or a full page reads as the last one.
pub const PAGE_SIZE: usize = 100;

/// Async Hearth REST client.
///
/// ```rust,no_run
/// use hearth_sdk::RestClient;
///
/// #[tokio::main]
/// async fn main() -> hearth_sdk::Result<()> {
///     let rest = RestClient::new(Some("my-access-token"), None)?;
///     let communities = rest.list_communities(None).await?;
///     println!("{communities:?}");
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    base_url: String,
}

impl RestClient {
    /// `token` is a bearer access token; `None` for the auth endpoints.
    pub fn new(token: Option<&str>, base_url: Option<&str>) -> Result<Self> {
        let mut headers = reqwest::header::HeaderMap::new();
        if let Some(token) = token {
            let token = token.strip_prefix("Bearer ").unwrap_or(token);
            headers.insert(
                reqwest::header::AUTHORIZATION,
                reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|e| HearthError::Other(e.to_string()))?,
            );
        }
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(HearthError::Http)?;

        Ok(Self {
            client,
            base_url: base_url.unwrap_or(DEFAULT_BASE).trim_end_matches('/').to_owned(),
        })
    }

    // ── Internal ──────────────────────────────────────────────────────────────

    pub(crate) async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "Hearth API request");

        let mut req = self.client.request(method, &url);
        if let Some(b) = body {
            req = req.json(b);
        }
        let resp = req.send().await?;
        let status = resp.status();

        if !status.is_success() {
            let body = resp.json::<Value>().await.ok();
            let message = error_message(status, body.as_ref());
            tracing::debug!(status = status.as_u16(), %message, "Hearth API error");
            return Err(HearthError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if status == StatusCode::NO_CONTENT {
            return Ok(serde_json::from_value(Value::Null)?);
        }

        let body = resp.json::<Value>().await?;
        Ok(serde_json::from_value(unwrap_envelope(body))?)
    }

    /// GET every page of a list endpoint, stopping at the first short page.
    pub(crate) async fn fetch_all<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>> {
        let sep = if path.contains('?') { '&' } else { '?' };
        let mut items = Vec::new();
        loop {
            let page: Vec<T> = self
                .get(&format!("{path}{sep}limit={PAGE_SIZE}&offset={}", items.len()))
                .await?;
            let done = page.len() < PAGE_SIZE;
            items.extend(page);
            if done {
                return Ok(items);
            }
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request(Method::GET, path, None).await
    }

    async fn post<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.request(Method::POST, path, Some(body)).await
    }

    async fn put<T: DeserializeOwned>(&self, path: &str, body: Option<&Value>) -> Result<T> {
        self.request(Method::PUT, path, body).await
    }

    async fn patch<T: DeserializeOwned>(&self, path: &str, body: &Value) -> Result<T> {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE, ignoring whatever payload comes back.
    async fn delete(&self, path: &str) -> Result<()> {
        self.request::<Value>(Method::DELETE, path, None).await?;
        Ok(())
    }

    // ── Auth ──────────────────────────────────────────────────────────────────

    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<Session> {
        self.post(
            "/auth/register",
            &json!({ "name": name, "email": email, "password": password }),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        self.post("/auth/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn me(&self) -> Result<User> {
        self.get("/users/me").await
    }

    pub async fn my_communities(&self) -> Result<Vec<Community>> {
        self.get("/users/me/communities").await
    }

    pub async fn my_join_requests(&self) -> Result<Vec<JoinRequest>> {
        self.get("/users/me/join-requests").await
    }

    // ── Communities ───────────────────────────────────────────────────────────

    pub async fn list_communities(&self, status: Option<CommunityStatus>) -> Result<Vec<Community>> {
        match status {
            Some(s) => self.fetch_all(&format!("/communities?status={}", s.as_str())).await,
            None => self.fetch_all("/communities").await,
        }
    }

    pub async fn get_community(&self, community_id: &str) -> Result<Community> {
        self.get(&format!("/communities/{community_id}")).await
    }

    pub async fn create_community(&self, name: &str, description: Option<&str>) -> Result<Community> {
        self.post(
            "/communities",
            &json!({ "name": name, "description": description }),
        )
        .await
    }

    pub async fn update_community(&self, community_id: &str, fields: &Value) -> Result<Community> {
        self.put(&format!("/communities/{community_id}"), Some(fields)).await
    }

    pub async fn set_community_status(
        &self,
        community_id: &str,
        status: CommunityStatus,
    ) -> Result<Community> {
        self.put(
            &format!("/communities/{community_id}/status"),
            Some(&json!({ "status": status })),
        )
        .await
    }

    pub async fn delete_community(&self, community_id: &str) -> Result<()> {
        self.delete(&format!("/communities/{community_id}")).await
    }

    pub async fn join_community(&self, community_id: &str, message: Option<&str>) -> Result<JoinRequest> {
        self.post(
            &format!("/communities/{community_id}/join"),
            &json!({ "message": message }),
        )
        .await
    }

    pub async fn leave_community(&self, community_id: &str) -> Result<()> {
        self.request::<Value>(Method::POST, &format!("/communities/{community_id}/leave"), None)
            .await?;
        Ok(())
    }

    // ── Join requests ─────────────────────────────────────────────────────────

    pub async fn list_join_requests(&self, community_id: &str) -> Result<Vec<JoinRequest>> {
        self.fetch_all(&format!("/communities/{community_id}/join-requests")).await
    }

    pub async fn review_join_request(
        &self,
        community_id: &str,
        request_id: &str,
        action: ReviewAction,
    ) -> Result<JoinRequest> {
        self.put(
            &format!(
                "/communities/{community_id}/join-requests/{request_id}/{}",
                action.as_str()
            ),
            None,
        )
        .await
    }

    // ── Directory ─────────────────────────────────────────────────────────────

    pub async fn list_members(&self, community_id: &str) -> Result<Vec<Member>> {
        self.fetch_all(&format!("/directory/{community_id}")).await
    }

    pub async fn block_member(&self, community_id: &str, user_id: &str) -> Result<Value> {
        self.put(&format!("/directory/{community_id}/block/{user_id}"), None).await
    }

    pub async fn unblock_member(&self, community_id: &str, user_id: &str) -> Result<Value> {
        self.put(&format!("/directory/{community_id}/unblock/{user_id}"), None).await
    }

    pub async fn set_member_role(
        &self,
        community_id: &str,
        user_id: &str,
        role: MemberRole,
    ) -> Result<Value> {
        self.put(
            &format!("/directory/{community_id}/role/{user_id}"),
            Some(&json!({ "role": role })),
        )
        .await
    }

    // ── Pulses ────────────────────────────────────────────────────────────────

    pub async fn list_pulses(&self, community_id: &str) -> Result<Vec<Pulse>> {
        self.fetch_all(&format!("/pulses?community_id={community_id}")).await
    }

    pub async fn create_pulse(&self, community_id: &str, content: &str) -> Result<Pulse> {
        self.post(
            "/pulses",
            &json!({ "community_id": community_id, "content": content }),
        )
        .await
    }

    pub async fn get_pulse(&self, pulse_id: &str) -> Result<Pulse> {
        self.get(&format!("/pulses/{pulse_id}")).await
    }

    pub async fn update_pulse(&self, pulse_id: &str, content: &str) -> Result<Pulse> {
        self.put(&format!("/pulses/{pulse_id}"), Some(&json!({ "content": content })))
            .await
    }

    pub async fn delete_pulse(&self, pulse_id: &str) -> Result<()> {
        self.delete(&format!("/pulses/{pulse_id}")).await
    }

    pub async fn review_pulse(&self, pulse_id: &str, action: ReviewAction) -> Result<Pulse> {
        self.put(&format!("/pulses/{pulse_id}/{}", action.as_str()), None).await
    }

    // ── Marketplace ───────────────────────────────────────────────────────────

    pub async fn list_listings(&self, community_id: &str) -> Result<Vec<Listing>> {
        self.fetch_all(&format!("/marketplace?community_id={community_id}")).await
    }

    /// Submit a body built with [`crate::builders::ListingBuilder`].
    pub async fn create_listing(&self, listing: &Value) -> Result<Listing> {
        self.post("/marketplace", listing).await
    }

    pub async fn get_listing(&self, listing_id: &str) -> Result<Listing> {
        self.get(&format!("/marketplace/{listing_id}")).await
    }

    pub async fn update_listing(&self, listing_id: &str, fields: &Value) -> Result<Listing> {
        self.put(&format!("/marketplace/{listing_id}"), Some(fields)).await
    }

    pub async fn delete_listing(&self, listing_id: &str) -> Result<()> {
        self.delete(&format!("/marketplace/{listing_id}")).await
    }

    pub async fn apply_listing_action(
        &self,
        listing_id: &str,
        action: ListingAction,
    ) -> Result<Listing> {
        self.put(
            &format!("/marketplace/{listing_id}/{}", action.path_segment()),
            None,
        )
        .await
    }

    // ── Events ────────────────────────────────────────────────────────────────

    pub async fn list_events(&self, community_id: &str) -> Result<Vec<Event>> {
        self.fetch_all(&format!("/events?community_id={community_id}")).await
    }

    pub async fn get_event(&self, event_id: &str) -> Result<Event> {
        self.get(&format!("/events/{event_id}")).await
    }

    /// Submit a body built with [`crate::builders::EventBuilder`].
    pub async fn create_event(&self, event: &Value) -> Result<Event> {
        self.post("/events", event).await
    }

    pub async fn update_event(&self, event_id: &str, fields: &Value) -> Result<Event> {
        self.put(&format!("/events/{event_id}"), Some(fields)).await
    }

    pub async fn delete_event(&self, event_id: &str) -> Result<()> {
        self.delete(&format!("/events/{event_id}")).await
    }

    pub async fn register_for_event(&self, event_id: &str) -> Result<Event> {
        self.request(Method::POST, &format!("/events/{event_id}/register"), None)
            .await
    }

    pub async fn unregister_from_event(&self, event_id: &str) -> Result<Event> {
        self.request(Method::DELETE, &format!("/events/{event_id}/register"), None)
            .await
    }

    /// Managers only.
    pub async fn list_event_registrations(&self, event_id: &str) -> Result<Vec<EventRegistration>> {
        self.get(&format!("/events/{event_id}/registrations")).await
    }

    // ── SOS ───────────────────────────────────────────────────────────────────

    pub async fn list_sos(&self, community_id: &str) -> Result<Vec<SosAlert>> {
        self.fetch_all(&format!("/sos?community_id={community_id}")).await
    }

    pub async fn raise_sos(
        &self,
        community_id: &str,
        message: &str,
        location: Option<&str>,
    ) -> Result<SosAlert> {
        self.post(
            "/sos",
            &json!({ "community_id": community_id, "message": message, "location": location }),
        )
        .await
    }

    pub async fn update_sos(&self, alert_id: &str, status: SosStatus) -> Result<SosAlert> {
        self.patch(&format!("/sos/{alert_id}"), &json!({ "status": status }))
            .await
    }

    pub async fn delete_sos(&self, alert_id: &str) -> Result<()> {
        self.delete(&format!("/sos/{alert_id}")).await
    }
}
