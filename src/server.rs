//! # Server Configuration
//!
//! Router assembly, shared application state, and the OpenAPI document for
//! the RBAC API. Protected resources live under `/api/v1` behind bearer
//! authentication; `/` and `/healthz` stay public for probes.

use std::sync::Arc;

use axum::{
    Router,
    extract::Request,
    http::header::HeaderValue,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::auth;
use crate::config::AppConfig;
use crate::handlers;
use crate::telemetry::{self, TraceContext};

/// Application state containing shared resources
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
}

/// Creates and configures the Axum application router
pub fn create_app(state: AppState) -> Router {
    let api_v1 = Router::new()
        .route(
            "/tenants",
            post(handlers::tenants::create_tenant).get(handlers::tenants::list_tenants),
        )
        .route(
            "/tenants/{id}",
            get(handlers::tenants::get_tenant).delete(handlers::tenants::delete_tenant),
        )
        .route(
            "/users",
            post(handlers::users::create_user).get(handlers::users::list_users),
        )
        .route(
            "/users/{id}",
            get(handlers::users::get_user)
                .patch(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .route(
            "/users/{id}/roles/{role_id}",
            post(handlers::users::assign_role).delete(handlers::users::remove_role),
        )
        .route(
            "/roles",
            post(handlers::roles::create_role).get(handlers::roles::list_roles),
        )
        .route(
            "/roles/{id}",
            get(handlers::roles::get_role)
                .patch(handlers::roles::update_role)
                .delete(handlers::roles::delete_role),
        )
        .route(
            "/permissions",
            post(handlers::permissions::create_permission)
                .get(handlers::permissions::list_permissions),
        )
        .route(
            "/permissions/{id}",
            get(handlers::permissions::get_permission)
                .delete(handlers::permissions::delete_permission),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::health))
        .nest("/api/v1", api_v1)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        // Outermost layer so every request carries a trace id.
        .layer(middleware::from_fn(trace_context_middleware))
}

/// Middleware that assigns each request a correlation id, scopes it into
/// task-local storage, and echoes it back in the `x-trace-id` header.
async fn trace_context_middleware(request: Request, next: Next) -> Response {
    let trace_id = Uuid::new_v4().to_string();
    let context = TraceContext {
        trace_id: trace_id.clone(),
    };

    let mut response = telemetry::with_trace_context(context, next.run(request)).await;

    if let Ok(value) = HeaderValue::from_str(&trace_id) {
        response.headers_mut().insert("x-trace-id", value);
    }

    response
}

/// Starts the server with the given configuration
pub async fn run_server(config: AppConfig, db: DatabaseConnection) -> anyhow::Result<()> {
    let addr = config
        .bind_addr()
        .map_err(|e| anyhow::anyhow!("invalid server address '{}': {}", config.api_bind_addr, e))?;
    let profile = config.profile.clone();

    let state = AppState {
        db,
        config: Arc::new(config),
    };
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, %profile, "Server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

/// Registers the bearer token scheme referenced by the protected paths.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("opaque")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::root,
        crate::handlers::health,
        crate::handlers::tenants::create_tenant,
        crate::handlers::tenants::get_tenant,
        crate::handlers::tenants::list_tenants,
        crate::handlers::tenants::delete_tenant,
        crate::handlers::users::create_user,
        crate::handlers::users::get_user,
        crate::handlers::users::list_users,
        crate::handlers::users::update_user,
        crate::handlers::users::delete_user,
        crate::handlers::users::assign_role,
        crate::handlers::users::remove_role,
        crate::handlers::roles::create_role,
        crate::handlers::roles::get_role,
        crate::handlers::roles::list_roles,
        crate::handlers::roles::update_role,
        crate::handlers::roles::delete_role,
        crate::handlers::permissions::create_permission,
        crate::handlers::permissions::get_permission,
        crate::handlers::permissions::list_permissions,
        crate::handlers::permissions::delete_permission,
    ),
    components(
        schemas(
            crate::models::ServiceInfo,
            crate::handlers::HealthResponse,
            crate::handlers::tenants::CreateTenantRequestDto,
            crate::handlers::tenants::TenantResponseDto,
            crate::handlers::users::CreateUserRequestDto,
            crate::handlers::users::UpdateUserRequestDto,
            crate::handlers::users::UserResponseDto,
            crate::handlers::users::UserWithRolesResponseDto,
            crate::handlers::roles::CreateRoleRequestDto,
            crate::handlers::roles::UpdateRoleRequestDto,
            crate::handlers::roles::RoleResponseDto,
            crate::handlers::roles::RoleWithPermissionsResponseDto,
            crate::handlers::permissions::CreatePermissionRequestDto,
            crate::handlers::permissions::PermissionResponseDto,
            crate::error::ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    info(
        title = "RBAC API",
        description = "Multi-tenant role-based access control API",
        version = env!("CARGO_PKG_VERSION"),
    )
)]
pub struct ApiDoc;
