use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use party_manager_back::{
    config::AppConfig, proxy::LocalProxy, routes, state::AppState,
};

fn app_with(config: AppConfig, proxy: &LocalProxy) -> Router {
    routes::router(AppState::new(config, Arc::new(proxy.clone())))
}

fn app() -> Router {
    app_with(AppConfig::default(), &LocalProxy::new())
}

async fn call(app: &Router, method: Method, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

async fn register(app: &Router, leader: Uuid) -> Uuid {
    let (status, body) = call(
        app,
        Method::POST,
        &format!("/party/register?leaderUuid={leader}"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["partyUUID"].as_str().unwrap().parse().unwrap()
}

async fn join(app: &Router, party: Uuid, player: Uuid) -> (StatusCode, Value) {
    call(
        app,
        Method::POST,
        &format!("/party/join?partyUUID={party}&playerUUID={player}"),
    )
    .await
}

#[tokio::test]
async fn register_then_info_returns_party() {
    let app = app();
    let leader = Uuid::new_v4();
    let party = register(&app, leader).await;

    let (status, body) = call(&app, Method::GET, &format!("/party/info?playerUUID={leader}")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["uuid"], party.to_string());
    assert_eq!(body["leader"], leader.to_string());
    assert!(body["name"].is_null());
    assert_eq!(body["members"], serde_json::json!([leader.to_string()]));
}

#[tokio::test]
async fn missing_and_malformed_parameters_are_bad_requests() {
    let app = app();

    let (status, body) = call(&app, Method::POST, "/party/register").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing parameter: leaderUuid");

    let (status, body) = call(&app, Method::POST, "/party/join?partyUUID=nope&playerUUID=nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid UUID for partyUUID"));

    let player = Uuid::new_v4();
    let (status, body) = call(&app, Method::POST, &format!("/party/join?playerUUID={player}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing parameter: partyUUID");
}

#[tokio::test]
async fn core_errors_render_as_bad_request_with_message() {
    let app = app();
    let leader = Uuid::new_v4();
    register(&app, leader).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/register?leaderUuid={leader}"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Player {leader} already in a party"));

    let missing = Uuid::new_v4();
    let (status, body) = join(&app, missing, Uuid::new_v4()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Party {missing} does not exist"));

    let stranger = Uuid::new_v4();
    let (status, body) = call(&app, Method::GET, &format!("/party/info?playerUUID={stranger}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Player {stranger} not in any Party"));
}

#[tokio::test]
async fn membership_flow_over_http() {
    let app = app();
    let leader = Uuid::new_v4();
    let member = Uuid::new_v4();
    let party = register(&app, leader).await;

    let (status, body) = join(&app, party, member).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Joined party successfully");

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/transferLeader?playerUUID={member}&newLeaderUUID={leader}"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], format!("Player {member} is not the Leader"));

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/transferLeader?playerUUID={leader}&newLeaderUUID={member}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Party leader transferred successfully");

    let (status, body) = call(&app, Method::POST, &format!("/party/leave?playerUUID={leader}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Left party successfully");

    let (_, info) = call(&app, Method::GET, &format!("/party/info?playerUUID={member}")).await;
    assert_eq!(info["leader"], member.to_string());
    assert_eq!(info["members"], serde_json::json!([member.to_string()]));

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/unregister?playerUUID={member}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Party unregistered successfully");

    let (status, _) = call(&app, Method::GET, &format!("/party/info?playerUUID={member}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn relocation_requests_connections_through_proxy() {
    let proxy = LocalProxy::with_servers(["lobby", "minigames"]);
    let app = app_with(AppConfig::default().with_default_server("lobby"), &proxy);
    let leader = Uuid::new_v4();
    let member = Uuid::new_v4();
    let party = register(&app, leader).await;
    join(&app, party, member).await;
    proxy.connect_player(leader, Some("lobby"));
    proxy.connect_player(member, Some("lobby"));

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/transfer?playerUUID={leader}&serverAlias=minigames"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Party transfer initiated");
    assert_eq!(proxy.current_server(member).as_deref(), Some("minigames"));

    let (status, _) = call(&app, Method::POST, &format!("/party/transfer?playerUUID={leader}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(proxy.current_server(leader).as_deref(), Some("lobby"));

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/transfer?playerUUID={leader}&serverAlias=survival"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Server survival doesn't exist");

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/party/transfer?playerUUID={leader}&serverAlias=bad%20alias"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rename_and_list_parties() {
    let app = app();
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    register(&app, first).await;
    register(&app, second).await;

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/party/rename?playerUUID={first}&name=Night%20Raid"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Party renamed successfully");

    let (status, body) = call(&app, Method::GET, "/party/list").await;
    assert_eq!(status, StatusCode::OK);
    let parties = body.as_array().unwrap();
    assert_eq!(parties.len(), 2);
    assert_eq!(parties[0]["leader"], first.to_string());
    assert_eq!(parties[0]["name"], "Night Raid");
    assert_eq!(parties[1]["leader"], second.to_string());

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/party/rename?playerUUID={first}&name={}", "x".repeat(40)),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn healthcheck_reports_party_count() {
    let app = app();
    register(&app, Uuid::new_v4()).await;

    let (status, body) = call(&app, Method::GET, "/healthcheck").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["parties"], 1);
}
