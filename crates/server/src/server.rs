use axum::{
    Router,
    extract::{Request, State},
    http::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use std::sync::Arc;

use crate::{
    ServerError, cash_flow, expenses, inventory, products, roles, sales, users, warehouses,
};
use engine::Engine;

#[derive(Clone)]
pub struct ServerState {
    pub engine: Arc<Engine>,
}

/// Admin gate for account and role management.
///
/// Credentials come from the `Authorization: Basic` header and go through the
/// regular login flow, so a legacy hash is migrated here as well. Any login
/// failure other than an internal one is reported as 401.
async fn admin_auth(
    auth_header: Option<TypedHeader<Authorization<Basic>>>,
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ServerError> {
    let Some(TypedHeader(credentials)) = auth_header else {
        return Err(ServerError::Unauthorized);
    };

    let account = match state
        .engine
        .login(credentials.username(), credentials.password())
        .await
    {
        Ok(account) => account,
        Err(err) if err.is_internal() => return Err(err.into()),
        Err(_) => return Err(ServerError::Unauthorized),
    };
    state.engine.require_admin(account.id).await?;

    request.extensions_mut().insert(account);
    Ok(next.run(request).await)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if allowed_origins.iter().any(|origin| origin == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("ignoring invalid CORS origin {origin}");
                None
            }
        })
        .collect();
    cors.allow_origin(origins)
}

/// Build the full `/api` router.
pub fn router(engine: Engine, allowed_origins: &[String]) -> Router {
    let state = ServerState {
        engine: Arc::new(engine),
    };

    let admin = Router::new()
        .route("/api/users/create-user", post(users::create))
        .route("/api/users/read-user/{id}", get(users::read))
        .route("/api/users/update-user/{id}", put(users::update))
        .route(
            "/api/users/delete-user/{id}",
            axum::routing::delete(users::delete),
        )
        .route("/api/users/get-all-users", get(users::list))
        .route("/api/users/rehash-password", post(users::rehash_password))
        .route(
            "/api/users/get-all-user-in-roles",
            get(users::list_role_assignments),
        )
        .route(
            "/api/users/read-user-in-role/{id}",
            get(users::read_role_assignment),
        )
        .route(
            "/api/users/update-user-in-role/{id}",
            put(users::update_role_assignment),
        )
        .route("/api/roles", get(roles::list).post(roles::create))
        .route(
            "/api/roles/{id}",
            get(roles::get).put(roles::update).delete(roles::delete),
        )
        .route("/api/roles/{id}/members", post(roles::add_member))
        .route(
            "/api/roles/{id}/members/{user_id}",
            axum::routing::delete(roles::remove_member),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        .route("/api/users/login", post(users::login))
        .route("/api/users/user-role/{user_id}", get(users::user_role))
        .route("/api/cashflow", get(cash_flow::list).post(cash_flow::create))
        .route(
            "/api/cashflow/{id}",
            get(cash_flow::get)
                .put(cash_flow::update)
                .delete(cash_flow::delete),
        )
        .route("/api/expenses", get(expenses::list).post(expenses::create))
        .route(
            "/api/expenses/{id}",
            get(expenses::get)
                .put(expenses::update)
                .delete(expenses::delete),
        )
        .route("/api/sales", get(sales::list).post(sales::create))
        .route(
            "/api/sales/{id}",
            get(sales::get).put(sales::update).delete(sales::delete),
        )
        .route(
            "/api/warehouses",
            get(warehouses::list).post(warehouses::create),
        )
        .route(
            "/api/warehouses/{id}",
            get(warehouses::get)
                .put(warehouses::update)
                .delete(warehouses::delete),
        )
        .route("/api/products", get(products::list).post(products::create))
        .route(
            "/api/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/api/inventory/transaction", post(inventory::record))
        .route("/api/inventory/status", get(inventory::status))
        .route("/api/inventory/lowstock", get(inventory::low_stock))
        .route("/api/transactions/history", get(inventory::history))
        .route(
            "/api/transactions/{id}",
            axum::routing::delete(inventory::delete),
        )
        .merge(admin)
        .layer(cors_layer(allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run(engine: Engine, addr: &str, allowed_origins: &[String]) {
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener on {addr}: {err}");
            return;
        }
    };
    if let Err(err) = run_with_listener(engine, allowed_origins, listener).await {
        tracing::error!("server failed: {err}");
    }
}

pub async fn run_with_listener(
    engine: Engine,
    allowed_origins: &[String],
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(engine, allowed_origins)).await
}

pub fn spawn_with_listener(
    engine: Engine,
    allowed_origins: Vec<String>,
    listener: tokio::net::TcpListener,
) -> Result<std::net::SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(engine, &allowed_origins, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
