//! Caller identity for HTTP handlers.
//!
//! The auth integration writes `user_id` into the shared cookie session; this
//! module only reads it. Development deployments may register an
//! [`IdentityFallback`] so unauthenticated requests act as a demo user.

use actix_session::Session;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::warn;

use crate::domain::{Error, UserId};

pub(crate) const USER_ID_KEY: &str = "user_id";

/// Identity assumed when the session carries none. Register it as
/// `web::Data<IdentityFallback>`; absent means no fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityFallback(pub UserId);

/// Session wrapper exposing the caller's [`UserId`].
#[derive(Clone)]
pub struct SessionContext {
    session: Session,
    fallback: Option<UserId>,
}

impl SessionContext {
    pub fn new(session: Session, fallback: Option<UserId>) -> Self {
        Self { session, fallback }
    }

    /// Record `user_id` in the session cookie.
    pub fn persist_user(&self, user_id: &UserId) -> Result<(), Error> {
        self.session
            .insert(USER_ID_KEY, user_id.as_ref())
            .map_err(|error| Error::internal(format!("failed to persist session: {error}")))
    }

    /// The session's user id, ignoring malformed values.
    pub fn user_id(&self) -> Result<Option<UserId>, Error> {
        let raw = self
            .session
            .get::<String>(USER_ID_KEY)
            .map_err(|error| Error::internal(format!("failed to read session: {error}")))?;
        Ok(raw.and_then(|raw| match UserId::new(raw) {
            Ok(id) => Some(id),
            Err(error) => {
                warn!(%error, "invalid user id in session cookie");
                None
            }
        }))
    }

    /// The caller's id, falling back to the configured identity, else `401`.
    pub fn require_user_id(&self) -> Result<UserId, Error> {
        self.user_id()?
            .or_else(|| self.fallback.clone())
            .ok_or_else(|| Error::unauthorized("login required"))
    }
}

impl FromRequest for SessionContext {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fallback = req
            .app_data::<web::Data<IdentityFallback>>()
            .map(|data| data.0.clone());
        let fut = Session::from_request(req, payload);
        Box::pin(async move { fut.await.map(|session| SessionContext::new(session, fallback)) })
    }
}
