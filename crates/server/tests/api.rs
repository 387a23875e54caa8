use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use engine::{Engine, NewUserCmd, RoleCmd};
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use serde_json::{Value, json};
use tower::ServiceExt;

const ADMIN: (&str, &str) = ("admin", "admin-pw");
const CLERK: (&str, &str) = ("clerk", "clerk-pw");

async fn spawn_app_with_origins(origins: &[String]) -> (Router, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .bcrypt_cost(4)
        .build()
        .await
        .unwrap();

    engine.new_role(RoleCmd::new("Users")).await.unwrap();
    engine
        .new_user(NewUserCmd::new(ADMIN.0, ADMIN.1, "admin@example.com").admin(true))
        .await
        .unwrap();
    engine
        .new_user(NewUserCmd::new(CLERK.0, CLERK.1, "clerk@example.com"))
        .await
        .unwrap();

    (server::router(engine, origins), db)
}

async fn spawn_app() -> (Router, DatabaseConnection) {
    spawn_app_with_origins(&[]).await
}

fn basic(credentials: (&str, &str)) -> String {
    let encoded = STANDARD.encode(format!("{}:{}", credentials.0, credentials.1));
    format!("Basic {encoded}")
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    auth: Option<(&str, &str)>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(credentials) = auth {
        builder = builder.header(header::AUTHORIZATION, basic(credentials));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn login_returns_identity() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "ADMIN", "password": "admin-pw"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"id": 1, "username": "admin", "role": "Users", "is_admin": true})
    );
}

#[tokio::test]
async fn login_error_statuses() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "admin", "password": "wrong-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "nobody", "password": "admin-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "admin", "password": "abc"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn login_migrates_legacy_hash() {
    let (app, db) = spawn_app().await;
    let backend = db.get_database_backend();
    db.execute(Statement::from_string(
        backend,
        "UPDATE users SET password_hash = 'clerk-pw' WHERE username = 'clerk'",
    ))
    .await
    .unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "clerk", "password": "clerk-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "clerk");

    let row = db
        .query_one(Statement::from_string(
            backend,
            "SELECT password_hash FROM users WHERE username = 'clerk'",
        ))
        .await
        .unwrap()
        .unwrap();
    let hash: String = row.try_get("", "password_hash").unwrap();
    assert!(hash.starts_with("$2"));
}

#[tokio::test]
async fn user_role_is_public() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(&app, "GET", "/api/users/user-role/2", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"role": "Users", "is_admin": false}));

    let (status, _) = send(&app, "GET", "/api/users/user-role/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn admin_routes_require_admin_credentials() {
    let (app, _db) = spawn_app().await;

    let (status, _) = send(&app, "GET", "/api/roles", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/roles", Some(("admin", "bad-pw")), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, "GET", "/api/roles", Some(CLERK), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "GET", "/api/users/get-all-users", Some(CLERK), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, "GET", "/api/roles", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["name"], "Users");
    assert_eq!(body[0]["group"], "Global Roles");
    assert_eq!(body[0]["users"], json!(["admin", "clerk"]));
}

#[tokio::test]
async fn role_management() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/roles",
        Some(ADMIN),
        Some(json!({"name": "Managers", "group": "Shop"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let managers = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/roles",
        Some(ADMIN),
        Some(json!({"name": "managers"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/roles",
        Some(ADMIN),
        Some(json!({"name": "no"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        "POST",
        &format!("/api/roles/{managers}/members"),
        Some(ADMIN),
        Some(json!({"user_id": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/roles/{managers}"),
        Some(ADMIN),
        Some(json!({"name": "Supervisors", "group": "Shop", "is_auto_assigned": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Supervisors");
    assert_eq!(body["users"], json!(["clerk"]));

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/roles/{managers}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["group"], "Shop");
    assert_eq!(body["is_auto_assigned"], true);

    let (status, _) = send(&app, "GET", "/api/roles/99", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", "/api/roles/1", Some(CLERK), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, "DELETE", "/api/roles/1", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/roles/{managers}/members/2"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/roles/{managers}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/roles/{managers}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_management() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/users/create-user",
        Some(ADMIN),
        Some(json!({"username": "dave", "password": "dave-pw", "email": "dave@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let dave = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/create-user",
        Some(ADMIN),
        Some(json!({"username": "DAVE", "password": "dave-pw", "email": "d2@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/read-user/{dave}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role_name"], "Users");
    assert!(body.get("password_hash").is_none());

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/update-user/{dave}"),
        Some(ADMIN),
        Some(json!({"username": "david", "email": "david@example.com", "role_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "david");

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "david", "password": "dave-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/rehash-password",
        Some(ADMIN),
        Some(json!({"username": "David", "password": "new-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "POST",
        "/api/users/login",
        None,
        Some(json!({"username": "david", "password": "new-pw"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/api/users/get-all-users", Some(ADMIN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/api/users/delete-user/{dave}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/users/read-user/{dave}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cash_flow_endpoints() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/cashflow",
        None,
        Some(json!({"date": "2024-03-01", "description": "opening", "amount_minor": 10000})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["date"], "2024-03-01");
    let id = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/cashflow",
        None,
        Some(json!({"date": "01/03/2024", "description": "opening", "amount_minor": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/cashflow/{id}"),
        None,
        Some(json!({"date": "2024-03-02", "description": "opening", "amount_minor": -50})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["amount_minor"], -50);

    let (status, body) = send(&app, "GET", "/api/cashflow", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/api/cashflow/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app, "DELETE", &format!("/api/cashflow/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "GET", &format!("/api/cashflow/{id}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn expense_and_sale_endpoints() {
    let (app, _db) = spawn_app().await;

    let (status, _) = send(
        &app,
        "POST",
        "/api/expenses",
        None,
        Some(json!({
            "date": "2024-03-01",
            "category": "Rent",
            "description": "shop rent",
            "amount_minor": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/expenses",
        None,
        Some(json!({
            "date": "2024-03-01",
            "category": "Rent",
            "description": "shop rent",
            "amount_minor": 120000
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["category"], "Rent");

    let (status, body) = send(
        &app,
        "POST",
        "/api/sales",
        None,
        Some(json!({
            "date": "2024-03-01",
            "customer_name": "Acme",
            "item_sold": "Widget",
            "quantity": 3,
            "unit_price_minor": 1250
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total_amount_minor"], 3750);

    let (status, _) = send(&app, "GET", "/api/sales/99", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn cors_allows_configured_origin() {
    let (app, _db) = spawn_app_with_origins(&["http://localhost:3000".to_string()]).await;

    let request = Request::builder()
        .method("GET")
        .uri("/api/cashflow")
        .header(header::ORIGIN, "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "http://localhost:3000"
    );

    let request = Request::builder()
        .method("GET")
        .uri("/api/cashflow")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_none()
    );
}

#[tokio::test]
async fn user_in_role_endpoints() {
    let (app, _db) = spawn_app().await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/roles",
        Some(ADMIN),
        Some(json!({"name": "Managers"})),
    )
    .await;
    let managers = body["id"].as_i64().unwrap();
    let (_, body) = send(
        &app,
        "POST",
        "/api/roles",
        Some(ADMIN),
        Some(json!({"name": "Auditors"})),
    )
    .await;
    let auditors = body["id"].as_i64().unwrap();
    send(
        &app,
        "POST",
        &format!("/api/roles/{managers}/members"),
        Some(ADMIN),
        Some(json!({"user_id": 2})),
    )
    .await;

    let (status, _) = send(
        &app,
        "GET",
        "/api/users/get-all-user-in-roles",
        Some(CLERK),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "GET",
        "/api/users/get-all-user-in-roles",
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["username"], "clerk");
    assert_eq!(rows[0]["role_name"], "Managers");
    let id = rows[0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/users/read-user-in-role/{id}"),
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role_id"], managers);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/users/update-user-in-role/{id}"),
        Some(ADMIN),
        Some(json!({"user_id": 2, "role_id": auditors})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role_name"], "Auditors");

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/users/update-user-in-role/{id}"),
        Some(ADMIN),
        Some(json!({"user_id": 2, "role_id": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(
        &app,
        "GET",
        "/api/users/read-user-in-role/99",
        Some(ADMIN),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn warehouse_and_product_endpoints() {
    let (app, _db) = spawn_app().await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/warehouses",
        None,
        Some(json!({"name": "Main", "location": "Dock 4"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let main = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/products",
        None,
        Some(json!({"name": "Widget", "sku": "W-1", "unit_price_minor": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        None,
        Some(json!({"name": "Widget", "sku": "W-1", "unit_price_minor": 250, "warehouse_id": 99})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["error"],
        "Invalid input: warehouse does not exist or is not active"
    );

    let (status, body) = send(
        &app,
        "POST",
        "/api/products",
        None,
        Some(json!({
            "name": "Widget",
            "sku": "W-1",
            "unit_price_minor": 250,
            "quantity": 4,
            "warehouse_id": main
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], 4);
    let widget = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/products",
        None,
        Some(json!({"name": "Copy", "sku": "w-1", "unit_price_minor": 100})),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", &format!("/api/warehouses/{main}"), None, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = send(&app, "DELETE", &format!("/api/products/{widget}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, body) = send(&app, "GET", "/api/products", None, None).await;
    assert_eq!(body, json!([]));
    let (_, body) = send(&app, "GET", "/api/products?include_deleted=true", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (status, body) = send(&app, "GET", &format!("/api/products/{widget}"), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["deleted_at"].is_null());

    let (status, _) = send(&app, "DELETE", &format!("/api/warehouses/{main}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/api/warehouses", None, None).await;
    assert_eq!(body, json!([]));
    let (_, body) = send(&app, "GET", "/api/warehouses?include_deleted=true", None, None).await;
    assert_eq!(body[0]["location"], "Dock 4");
}

#[tokio::test]
async fn inventory_endpoints() {
    let (app, _db) = spawn_app().await;

    let (_, body) = send(
        &app,
        "POST",
        "/api/warehouses",
        None,
        Some(json!({"name": "Main"})),
    )
    .await;
    let main = body["id"].as_i64().unwrap();
    let (_, body) = send(
        &app,
        "POST",
        "/api/products",
        None,
        Some(json!({"name": "Widget", "sku": "W-1", "unit_price_minor": 250})),
    )
    .await;
    let widget = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/inventory/transaction",
        None,
        Some(json!({"product_id": widget, "warehouse_id": main, "kind": "in", "quantity": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["kind"], "in");

    let (status, body) = send(
        &app,
        "POST",
        "/api/inventory/transaction",
        None,
        Some(json!({"product_id": widget, "warehouse_id": main, "kind": "out", "quantity": 25})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["quantity"], -25);
    let out = body["id"].as_i64().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        "/api/inventory/transaction",
        None,
        Some(json!({"product_id": widget, "warehouse_id": main, "kind": "out", "quantity": 6})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/inventory/status", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["warehouse_name"], "Main");
    assert_eq!(body[0]["quantity"], 5);

    let (_, body) = send(&app, "GET", "/api/inventory/lowstock", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(&app, "GET", "/api/inventory/lowstock?threshold=4", None, None).await;
    assert_eq!(body, json!([]));
    let (status, _) = send(&app, "GET", "/api/inventory/lowstock?threshold=-1", None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        "GET",
        &format!("/api/transactions/history?product_id={widget}"),
        None,
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);
    let (status, _) = send(
        &app,
        "GET",
        "/api/transactions/history?start_date=2024-13-01",
        None,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "DELETE", &format!("/api/transactions/{out}"), None, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (_, body) = send(&app, "GET", "/api/inventory/status", None, None).await;
    assert_eq!(body[0]["quantity"], 30);
    let (_, body) = send(&app, "GET", "/api/transactions/history", None, None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    let (_, body) = send(
        &app,
        "GET",
        "/api/transactions/history?include_deleted=true",
        None,
        None,
    )
    .await;
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (status, _) = send(&app, "DELETE", &format!("/api/transactions/{out}"), None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
