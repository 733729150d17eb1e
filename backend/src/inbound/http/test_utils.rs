//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{HttpResponse, test, web};
use actix_http::Request;
use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

use crate::domain::{Error, UserId};
use crate::inbound::http::session::SessionContext;

/// Cookie session middleware with a throwaway key and the `Secure` flag off.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock(pub DateTime<Utc>);

impl FixtureClock {
    /// Clock frozen at noon UTC on `2024-01-15`.
    pub fn mid_january() -> Arc<Self> {
        let instant = Utc
            .with_ymd_and_hms(2024, 1, 15, 12, 0, 0)
            .single()
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        Arc::new(Self(instant))
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

pub fn user(raw: &str) -> UserId {
    UserId::new(raw).expect("fixture user id is valid")
}

/// Stand-in for the auth integration: `GET /test-login/{user}` writes the
/// session identity.
pub async fn test_login(
    session: SessionContext,
    path: web::Path<String>,
) -> Result<HttpResponse, Error> {
    session.persist_user(&user(&path.into_inner()))?;
    Ok(HttpResponse::Ok().finish())
}

/// Session cookie for `user_id`, obtained through [`test_login`].
pub async fn login_cookie<S>(app: &S, user_id: &str) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/test-login/{user_id}"))
            .to_request(),
    )
    .await;
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("login sets a session cookie")
        .into_owned()
}
