//! Client behavior against a mock server.

use hearth_sdk::{
    HearthError, RestClient,
    builders::ListingBuilder,
    directory::MemberDirectory,
    moderation::{JoinRequestQueue, ListingQueue},
    rest::PAGE_SIZE,
};
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path, query_param},
};

fn client(server: &MockServer) -> RestClient {
    RestClient::new(Some("token-1"), Some(&server.uri())).unwrap()
}

fn join_request(id: &str, status: &str) -> serde_json::Value {
    json!({ "id": id, "user_id": "u1", "community_id": "comm1", "status": status })
}

#[tokio::test]
async fn approving_issues_one_put_then_refetches() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/communities/comm1/join-requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "result": [join_request("abc123", "approved")],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/communities/comm1/join-requests/abc123/approve"))
        .and(header("authorization", "Bearer token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Join request approved",
            "result": join_request("abc123", "approved"),
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut queue = JoinRequestQueue::new(client(&server), "comm1");
    let items = queue.approve("abc123").await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].status, hearth_sdk::ReviewStatus::Approved);

    let received = server.received_requests().await.unwrap();
    let order: Vec<_> = received
        .iter()
        .map(|r| (r.method.to_string(), r.url.path().to_owned()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("PUT".to_owned(), "/communities/comm1/join-requests/abc123/approve".to_owned()),
            ("GET".to_owned(), "/communities/comm1/join-requests".to_owned()),
        ]
    );
}

#[tokio::test]
async fn failed_action_keeps_cached_list() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/communities/comm1/join-requests"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [join_request("abc123", "pending")],
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/communities/comm1/join-requests/abc123/reject"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "status": 403, "code": "MISSING_PERMISSION", "message": "Missing permission: REVIEW_JOIN_REQUESTS" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut queue = JoinRequestQueue::new(client(&server), "comm1");
    queue.refresh().await.unwrap();

    let err = queue.reject("abc123").await.unwrap_err();
    match err {
        HearthError::Api { status, message } => {
            assert_eq!(status, 403);
            assert_eq!(message, "Missing permission: REVIEW_JOIN_REQUESTS");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(queue.items().len(), 1);
    assert_eq!(queue.items()[0].status, hearth_sdk::ReviewStatus::Pending);
}

#[tokio::test]
async fn resolved_requests_are_never_sent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/communities/comm1/join-requests"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([join_request("abc123", "rejected")])),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut queue = JoinRequestQueue::new(client(&server), "comm1");
    queue.refresh().await.unwrap();

    let err = queue.approve("abc123").await.unwrap_err();
    assert!(matches!(err, HearthError::InvalidTransition { .. }));
}

#[tokio::test]
async fn listing_price_string_is_submitted_as_number() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/marketplace"))
        .and(body_json(json!({ "community_id": "comm1", "title": "Bike", "price": 12.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "Listing submitted for review",
            "result": {
                "id": "l1", "community_id": "comm1", "user_id": "u1",
                "title": "Bike", "price": 12.5, "status": "pending",
            },
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = ListingBuilder::new("comm1")
        .title("Bike")
        .price("12.5")
        .build()
        .unwrap();
    let listing = client(&server).create_listing(&body).await.unwrap();
    assert_eq!(listing.price, 12.5);
}

#[tokio::test]
async fn listing_queue_marks_sold_only_from_approved() {
    let server = MockServer::start().await;
    let listing = |status: &str| {
        json!({
            "id": "l1", "community_id": "comm1", "user_id": "u1",
            "title": "Bike", "price": 12.5, "status": status,
        })
    };

    Mock::given(method("GET"))
        .and(path("/marketplace"))
        .and(query_param("community_id", "comm1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [listing("pending")] })),
        )
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/marketplace/l1/sold"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut queue = ListingQueue::new(client(&server), "comm1");
    queue.refresh().await.unwrap();
    assert!(matches!(
        queue.mark_sold("l1").await,
        Err(HearthError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn error_text_falls_back_to_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/users/me"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = client(&server).me().await.unwrap_err();
    assert_eq!(err.status(), Some(502));
    assert_eq!(err.to_string(), "API error 502: Bad Gateway");
}

fn member(n: usize) -> serde_json::Value {
    json!({
        "user_id": format!("u{n}"),
        "community_id": "comm1",
        "name": format!("Resident {n}"),
        "email": format!("resident{n}@hearth.test"),
        "role": "member",
        "status": "active",
    })
}

#[tokio::test]
async fn directory_refresh_reads_every_page() {
    let server = MockServer::start().await;

    let first: Vec<_> = (0..PAGE_SIZE).map(member).collect();
    Mock::given(method("GET"))
        .and(path("/directory/comm1"))
        .and(query_param("offset", "0"))
        .and(query_param("limit", PAGE_SIZE.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": first })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/directory/comm1"))
        .and(query_param("offset", PAGE_SIZE.to_string()))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "result": [member(PAGE_SIZE)] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut directory = MemberDirectory::new(client(&server), "comm1", "u0");
    directory.refresh().await.unwrap();
    assert_eq!(directory.members().len(), PAGE_SIZE + 1);

    let last = format!("Resident {PAGE_SIZE}");
    let hits = directory.search(&last.to_uppercase());
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].user_id, format!("u{PAGE_SIZE}"));
}

#[tokio::test]
async fn queue_refresh_pages_past_the_first_page() {
    let server = MockServer::start().await;

    let first: Vec<_> = (0..PAGE_SIZE)
        .map(|n| join_request(&format!("r{n}"), "pending"))
        .collect();
    Mock::given(method("GET"))
        .and(path("/communities/comm1/join-requests"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": first })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/communities/comm1/join-requests"))
        .and(query_param("offset", PAGE_SIZE.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "result": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let mut queue = JoinRequestQueue::new(client(&server), "comm1");
    assert_eq!(queue.refresh().await.unwrap().len(), PAGE_SIZE);
}
