use axum::{
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::from_fn_with_state,
    response::{IntoResponse, Json},
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};

use crate::database::models::{ChartOfDay, Comment, Quiz, Quote, Resource, Stock, Video};
use crate::handlers::{admin_posts, auth, crud, posts, upload};
use crate::middleware::{admin_middleware, jwt_auth_middleware, transaction_middleware};
use crate::state::AppState;

/// Build the full application router
pub fn app(state: AppState) -> Router {
    let config = &state.config;

    let mut router = Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .merge(auth_routes(&state))
        .merge(upload_routes(&state))
        .merge(content_routes(&state))
        .merge(stock_routes(&state))
        .merge(admin_post_routes(&state))
        .merge(post_routes(&state))
        .nest_service("/uploads", ServeDir::new(&config.uploads.dir))
        // Global middleware
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config.security.cors_origins));

    if config.api.enable_request_logging {
        router = router.layer(TraceLayer::new_for_http());
    }

    router.with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();
    layer.allow_origin(allowed)
}

/// JWT only
fn authenticated(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router.route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

/// JWT, then the stored user must be an admin
fn admin_only(state: &AppState, router: Router<AppState>) -> Router<AppState> {
    router
        .route_layer(from_fn_with_state(state.clone(), admin_middleware))
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware))
}

fn auth_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login));

    let protected = authenticated(state, Router::new().route("/api/auth/me", get(auth::me)));

    let admin = admin_only(
        state,
        Router::new()
            .route("/api/auth/get-users", get(auth::get_users))
            .route("/api/auth/assign-role", put(auth::assign_role))
            .route(
                "/api/auth/users/:id",
                put(auth::update_user).delete(auth::delete_user),
            ),
    );

    public.merge(protected).merge(admin)
}

fn upload_routes(state: &AppState) -> Router<AppState> {
    authenticated(
        state,
        Router::new().route("/api/upload/images", post(upload::upload_images)),
    )
}

/// Create, update and delete for one resource, admin only
fn resource_writes<R: Resource>(state: &AppState, base: &str) -> Router<AppState> {
    admin_only(
        state,
        Router::new()
            .route(base, post(crud::create::<R>))
            .route(
                &format!("{}/:id", base),
                put(crud::update::<R>).delete(crud::delete::<R>),
            ),
    )
}

fn content_routes(state: &AppState) -> Router<AppState> {
    // Quotes and comments are readable by any signed-in user
    let member_reads = authenticated(
        state,
        Router::new()
            .route("/api/quotes", get(crud::list::<Quote>))
            .route("/api/quotes/:id", get(crud::get::<Quote>))
            .route("/api/comments", get(crud::list::<Comment>))
            .route("/api/comments/:id", get(crud::get::<Comment>))
            .route("/api/charts/:id", get(crud::get::<ChartOfDay>)),
    );

    let public_reads = Router::new()
        .route("/api/charts", get(crud::list::<ChartOfDay>))
        .route("/api/videos", get(crud::list::<Video>))
        .route("/api/videos/:id", get(crud::get::<Video>))
        .route("/api/quizzes", get(crud::list::<Quiz>))
        .route("/api/quizzes/:id", get(crud::get::<Quiz>));

    member_reads
        .merge(public_reads)
        .merge(resource_writes::<Quote>(state, "/api/quotes"))
        .merge(resource_writes::<Comment>(state, "/api/comments"))
        .merge(resource_writes::<ChartOfDay>(state, "/api/charts"))
        .merge(resource_writes::<Video>(state, "/api/videos"))
        .merge(resource_writes::<Quiz>(state, "/api/quizzes"))
}

/// Every stock route runs inside the transaction lock
fn stock_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/api/stocks/list", get(crud::list::<Stock>))
        .route("/api/stocks/:id", get(crud::get::<Stock>))
        .merge(resource_writes::<Stock>(state, "/api/stocks"))
        .route_layer(from_fn_with_state(state.clone(), transaction_middleware))
}

fn admin_post_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new().route("/api/admin-posts", get(admin_posts::list));

    let members = authenticated(
        state,
        Router::new()
            .route("/api/admin-posts/:id/like", post(admin_posts::like))
            .route("/api/admin-posts/:id/comments", post(admin_posts::add_comment)),
    );

    let admin = admin_only(
        state,
        Router::new()
            .route("/api/admin-posts", post(admin_posts::create))
            .route(
                "/api/admin-posts/:id/comments/:comment_id",
                delete(admin_posts::delete_comment),
            ),
    );

    public.merge(members).merge(admin)
}

fn post_routes(state: &AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/api/posts", get(posts::list))
        .route("/api/posts/:id", get(posts::get));

    let members = authenticated(
        state,
        Router::new()
            .route("/api/posts", post(posts::create))
            .route("/api/posts/:id", delete(posts::delete))
            .route("/api/posts/:id/like", post(posts::like))
            .route("/api/posts/:id/comments", post(posts::add_comment)),
    );

    public.merge(members)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "message": "Chini API",
        "result": {
            "name": "Chini API",
            "version": version,
            "endpoints": {
                "auth": "/api/auth/* (register/login public, user management admin)",
                "upload": "/api/upload/images (JWT)",
                "content": "/api/{quotes,comments,charts,videos,quizzes} (reads mixed, writes admin)",
                "stocks": "/api/stocks/list, /api/stocks/:id (reads public, writes admin)",
                "admin_posts": "/api/admin-posts (feed public, interactions JWT)",
                "posts": "/api/posts (reads public, writes JWT)",
                "uploads": "/uploads/* (public static files)",
            }
        }
    }))
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();
    let backend = state.store.backend();

    match state.store.health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "ok",
                "result": {
                    "status": "ok",
                    "timestamp": now,
                    "database": backend
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed on {} store: {}", backend, e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "database unavailable",
                    "code": "SERVICE_UNAVAILABLE",
                    "result": {
                        "status": "degraded",
                        "timestamp": now,
                        "database": backend
                    }
                })),
            )
        }
    }
}
