//! Server construction and middleware wiring.

mod config;
#[cfg(feature = "metrics")]
mod metrics;
mod session_key;
mod settings;
mod state_builders;

pub use config::ServerConfig;
pub use session_key::load_session_key;
pub use settings::AppSettings;

#[cfg(feature = "metrics")]
pub use metrics::make_metrics;
#[cfg(feature = "metrics")]
use metrics::MetricsLayer;
use state_builders::build_http_state;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use habit_tracker::Trace;
#[cfg(debug_assertions)]
use habit_tracker::doc::ApiDoc;
use habit_tracker::inbound::http::configure_api;
use habit_tracker::inbound::http::error::extractor_config;
use habit_tracker::inbound::http::health::{HealthState, live, ready};
use habit_tracker::inbound::http::session::IdentityFallback;
use habit_tracker::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    identity_fallback: Option<web::Data<IdentityFallback>>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        identity_fallback,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default().session_ttl(actix_web::cookie::time::Duration::hours(2)),
        )
        .build();

    let api = web::scope("/api").wrap(session).configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .configure(extractor_config)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    let app = match identity_fallback {
        Some(fallback) => app.app_data(fallback),
        None => app,
    };

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));
    #[cfg(not(debug_assertions))]
    let app = app;

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// The habit store is prepared (fallback user, demo seed) before the listener
/// is bound, and readiness is flagged once binding succeeds.
///
/// # Errors
/// Propagates [`std::io::Error`] when preparing the store, binding the socket,
/// or starting the server fails.
pub async fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let http_state = build_http_state(&config).await?;
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        db_pool: _,
        identity_fallback,
        seed_user: _,
        #[cfg(feature = "metrics")]
        prometheus,
    } = config;
    let identity_fallback = identity_fallback.map(|id| web::Data::new(IdentityFallback(id)));

    #[cfg(feature = "metrics")]
    let metrics_layer = MetricsLayer::from_option(prometheus);

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            identity_fallback: identity_fallback.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(metrics_layer.clone());

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use habit_tracker::domain::UserId;
    use rstest::rstest;
    use serde_json::{Value, json};

    async fn deps(fallback: Option<&str>) -> AppDependencies {
        let config = ServerConfig::new(
            Key::generate(),
            false,
            SameSite::Lax,
            "127.0.0.1:0".parse().expect("addr"),
        )
        .with_identity_fallback(fallback.map(|id| UserId::new(id).expect("valid id")));
        let http_state = build_http_state(&config).await.expect("state");
        AppDependencies {
            health_state: web::Data::new(HealthState::new()),
            http_state,
            identity_fallback: config
                .identity_fallback
                .map(|id| web::Data::new(IdentityFallback(id))),
            key: config.key,
            cookie_secure: false,
            same_site: SameSite::Lax,
        }
    }

    #[rstest]
    #[actix_web::test]
    async fn api_requires_identity_without_fallback() {
        let app = test::init_service(build_app(deps(None).await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/api/habits").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert!(res.headers().contains_key("trace-id"));
    }

    #[rstest]
    #[actix_web::test]
    async fn fallback_identity_serves_requests() {
        let app = test::init_service(build_app(deps(Some("demo-user-id")).await)).await;

        let created = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/habits")
                .set_json(json!({ "name": "Read" }))
                .to_request(),
        )
        .await;
        assert_eq!(created.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(created).await;
        assert_eq!(body["userId"], "demo-user-id");

        let analytics = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/api/analytics?today=2024-01-15")
                .to_request(),
        )
        .await;
        assert_eq!(analytics.status(), StatusCode::OK);
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_starts_unready() {
        let app = test::init_service(build_app(deps(None).await)).await;
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/health/ready").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
