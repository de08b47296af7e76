use axum::{
    http::{HeaderValue, Method},
    middleware::from_fn,
    routing::{get, post, put},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use edvirons_api::config;
use edvirons_api::database::manager::DatabaseManager;
use edvirons_api::handlers;
use edvirons_api::middleware::{
    jwt_auth_middleware, resolve_tenant_middleware, resolve_user_middleware,
};
use edvirons_api::services::TenantService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edvirons_api=debug,tower_http=debug".into()),
        )
        .init();

    let cfg = config::config();
    tracing::info!(
        environment = ?cfg.environment,
        apex_domain = %cfg.tenancy.apex_domain,
        "starting edvirons-api"
    );

    // Warm the pool if the database is up; a failure is not fatal, the
    // health endpoint keeps reporting degraded until it recovers.
    if let Err(e) = DatabaseManager::pool().await {
        tracing::warn!("database unavailable at startup: {}", e);
    }

    let tenant_service = TenantService::new();

    // Routes that require a resolved tenant plus an authenticated,
    // tenant-scoped user. Layers run outside-in: tenant resolution, then
    // token validation, then user load.
    let api_routes = Router::new()
        .route(
            "/api/:entity",
            get(handlers::entities::list).post(handlers::entities::create),
        )
        .route(
            "/api/:entity/:id",
            get(handlers::entities::get)
                .put(handlers::entities::update)
                .delete(handlers::entities::delete),
        )
        .route("/api/apps-hub", get(handlers::apps_hub::list_tenant_apps))
        .route("/api/apps-hub/usage", post(handlers::apps_hub::record_usage))
        .route(
            "/api/global-apps-hub",
            get(handlers::apps_hub::list_global_apps).post(handlers::apps_hub::create_global_app),
        )
        .route(
            "/api/global-apps-hub/:id",
            put(handlers::apps_hub::update_global_app)
                .delete(handlers::apps_hub::delete_global_app),
        )
        .route(
            "/api/tenant-app-access",
            post(handlers::apps_hub::set_tenant_app_access),
        )
        .route(
            "/api/tenant-app-access/bulk",
            post(handlers::apps_hub::bulk_set_tenant_app_access),
        )
        .route(
            "/api/tenant-app-access/:tenant_id",
            get(handlers::apps_hub::list_tenant_app_access),
        )
        .route(
            "/api/global-analytics",
            get(handlers::apps_hub::global_analytics),
        )
        .route(
            "/api/global-popular-apps",
            get(handlers::apps_hub::global_popular_apps),
        )
        .route_layer(from_fn(resolve_user_middleware))
        .route_layer(from_fn(jwt_auth_middleware))
        .route_layer(from_fn(resolve_tenant_middleware));

    // Tenant resolution without authentication
    let tenant_routes = Router::new()
        .route("/tenant", get(handlers::tenant::get_tenant))
        .route_layer(from_fn(resolve_tenant_middleware));

    let mut app = Router::new()
        .route("/", get(handlers::system::root))
        .route("/health", get(handlers::system::health))
        .merge(tenant_routes)
        .merge(api_routes)
        .layer(Extension(tenant_service))
        .layer(TraceLayer::new_for_http());

    if cfg.security.enable_cors {
        app = app.layer(build_cors_layer(&cfg.security.cors_origins));
    }

    let port = std::env::var("EDVIRONS_API_PORT")
        .or_else(|_| std::env::var("PORT"))
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    tracing::info!("listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    if origins.iter().any(|o| o == "*") {
        layer.allow_origin(tower_http::cors::Any)
    } else {
        let parsed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer.allow_origin(tower_http::cors::AllowOrigin::list(parsed))
    }
}
