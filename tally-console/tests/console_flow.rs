// tally-console/tests/console_flow.rs
// 集成测试: 登录、持久化、路由守卫、结账与登出 (进程内 axum 假后端)

use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::{Value, json};
use shared::client::Role;
use shared::{ApiResponse, ErrorKind};
use tally_console::{Console, ConsoleConfig, NoticeLevel, RequestStatus, Route};
use tempfile::TempDir;

fn authorization(headers: &HeaderMap) -> Option<&str> {
    headers.get("authorization").and_then(|v| v.to_str().ok())
}

async fn login(Json(body): Json<Value>) -> impl IntoResponse {
    if body["password"] != "secret" {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Wrong password" })),
        );
    }
    let data = if body["username"] == "root" {
        json!({
            "access": "tok-root",
            "user": { "uuid": "u1", "username": "root", "first_name": "Rita", "shop_id": "s1" },
            "permissions": []
        })
    } else {
        json!({
            "access": "tok-admin",
            "user": { "uuid": "u2", "username": body["username"], "shop_id": "s1", "branch": "b1" },
            "permissions": ["products"]
        })
    };
    (StatusCode::OK, Json(json!({ "message": "Welcome", "data": data })))
}

async fn logout() -> impl IntoResponse {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "message": "Session store unavailable" })),
    )
}

async fn list_products(headers: HeaderMap) -> impl IntoResponse {
    match authorization(&headers) {
        Some("tok-root") | Some("tok-admin") => (
            StatusCode::OK,
            Json(json!({
                "message": "ok",
                "data": [{
                    "id": "p1", "name": "Cola", "net_price": 1, "sell_price": 1.5,
                    "cost_price": 0.8, "quantity": 7, "category": "c1"
                }, {
                    "id": "p2", "name": "Tea", "net_price": 1, "sell_price": 2,
                    "cost_price": 1, "quantity": 3
                }]
            })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid token" })),
        ),
    }
}

async fn record_sale(Json(body): Json<Value>) -> impl IntoResponse {
    if body["product"] == "p2" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Tea is not sold at this branch" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({
            "message": "Sale recorded",
            "data": {
                "id": "s1", "product": body["product"], "quantity": body["quantity"],
                "amount": body["amount"], "day": 9, "month": 1, "year": 2024
            }
        })),
    )
}

async fn list_categories() -> impl IntoResponse {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Token revoked" })),
    )
}

async fn whoami(headers: HeaderMap) -> Json<Value> {
    let pick = |name: &str| headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string);
    Json(json!({
        "message": "ok",
        "data": { "shop_id": pick("shop_id"), "branch": pick("branch") }
    }))
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route("/auth/superuser/login", post(login))
        .route("/auth/admin/login", post(login))
        .route("/auth/logout", post(logout))
        .route("/products", get(list_products))
        .route("/categories", get(list_categories))
        .route("/sales", post(record_sale))
        .route("/whoami", get(whoami));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

fn config(base: &str, dir: &TempDir) -> ConsoleConfig {
    ConsoleConfig {
        api_url: base.to_string(),
        timeout_secs: 5,
        data_dir: dir.path().to_path_buf(),
        log_dir: dir.path().join("logs"),
        ..Default::default()
    }
}

async fn scope_headers(console: &Console) -> Value {
    let resp: ApiResponse<Value> = console.http().get("whoami").await.unwrap();
    resp.data.unwrap()
}

#[tokio::test]
async fn test_failed_login_keeps_previous_user() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut console = Console::open(&config(&base, &dir)).await.unwrap();

    console.login(Role::Admin, "kim", "secret").await.unwrap();
    assert!(console.session().is_authenticated());

    let err = console.login(Role::Admin, "kim", "wrong").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert_eq!(err.message, "Wrong password");

    let session = console.session();
    assert!(!session.is_authenticated());
    assert_eq!(session.state().status, RequestStatus::Rejected);
    assert_eq!(session.error().map(|e| e.message.clone()), Some("Wrong password".to_string()));
    assert_eq!(session.user().map(|u| u.username.as_str()), Some("kim"));
    assert_eq!(
        console.notices().last().map(|n| n.level),
        Some(NoticeLevel::Error)
    );
}

#[tokio::test]
async fn test_empty_credentials_are_rejected_locally() {
    let dir = tempfile::tempdir().unwrap();
    // Nothing listens here; a request would fail as Transport
    let mut console = Console::open(&config("http://127.0.0.1:9", &dir)).await.unwrap();

    let err = console.login(Role::Superuser, "  ", "secret").await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert!(!console.session().is_authenticated());
}

#[tokio::test]
async fn test_session_survives_restart() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();

    {
        let mut console = Console::open(&config(&base, &dir)).await.unwrap();
        let user = console.login(Role::Superuser, "root", "secret").await.unwrap();
        assert_eq!(user.display_name(), "Rita");
        console.save().unwrap();
    }
    assert!(dir.path().join("state.json").exists());

    let mut console = Console::open(&config(&base, &dir)).await.unwrap();
    assert!(console.session().is_authenticated());
    assert_eq!(console.session().role(), Some(Role::Superuser));

    console.require(Route::Products).await.unwrap();
    assert_eq!(console.products.refresh().await.unwrap(), 2);
    assert_eq!(console.products.get("p1").await.map(|p| p.quantity), Some(7));

    let headers = scope_headers(&console).await;
    assert_eq!(headers["shop_id"], "s1");
    assert!(headers["branch"].is_null());
}

#[tokio::test]
async fn test_admin_scope_and_route_guard() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut console = Console::open(&config(&base, &dir)).await.unwrap();

    let err = console.require(Route::Products).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    console.login(Role::Admin, "kim", "secret").await.unwrap();
    console.require(Route::Products).await.unwrap();
    console.require(Route::Brands).await.unwrap();

    let err = console.require(Route::Sales).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);
    let err = console.require(Route::Admins).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Forbidden);

    let headers = scope_headers(&console).await;
    assert_eq!(headers["shop_id"], "s1");
    assert_eq!(headers["branch"], "b1");

    console.select_branch(Some("b7".into())).await;
    assert_eq!(scope_headers(&console).await["branch"], "b7");
}

#[tokio::test]
async fn test_rejected_token_ends_session() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut console = Console::open(&config(&base, &dir)).await.unwrap();
    console.login(Role::Admin, "kim", "secret").await.unwrap();

    let err = console.categories.refresh().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);

    let err = console.require(Route::Products).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Unauthorized);
    assert!(!console.session().is_authenticated());
    assert!(console.http().token().await.is_none());
}

#[tokio::test]
async fn test_partial_checkout_fails_and_keeps_rejected_lines() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let mut console = Console::open(&config(&base, &dir)).await.unwrap();
    console.login(Role::Superuser, "root", "secret").await.unwrap();

    console.cart_add("p1", 2).await.unwrap();
    console.cart_add("p2", 1).await.unwrap();

    let err = console.cart_checkout().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Business);
    assert_eq!(
        err.message,
        "1 of 2 cart lines were not recorded: Tea is not sold at this branch"
    );
    assert_eq!(err.detail("recorded"), Some(&Value::from(1)));

    let cart = &console.state().cart;
    assert_eq!(cart.lines.len(), 1);
    assert_eq!(cart.lines[0].product, "p2");
    assert_eq!(console.sales.len().await, 1);
}

#[tokio::test]
async fn test_logout_purges_local_state() {
    let base = spawn_backend().await;
    let dir = tempfile::tempdir().unwrap();
    let state_file = dir.path().join("state.json");

    let mut console = Console::open(&config(&base, &dir)).await.unwrap();
    console.login(Role::Superuser, "root", "secret").await.unwrap();
    console.products.refresh().await.unwrap();
    console.save().unwrap();
    assert!(state_file.exists());

    // The server call fails, the local session is cleared regardless
    console.logout().await.unwrap();
    assert!(!state_file.exists());
    assert!(!console.session().is_authenticated());
    assert!(console.products.is_empty().await);
    assert!(console.http().token().await.is_none());

    let notices = console.notices().drain();
    assert!(notices.iter().any(|n| n.level == NoticeLevel::Info));
    assert_eq!(notices.last().map(|n| n.message.as_str()), Some("Logged out"));

    let reopened = Console::open(&config(&base, &dir)).await.unwrap();
    assert!(!reopened.session().is_authenticated());
}
