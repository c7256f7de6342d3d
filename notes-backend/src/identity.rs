//! Caller identity for the notes API.
//!
//! Authentication happens upstream. An authenticating proxy forwards the
//! caller's id in `X-User-Id`; single-user deployments can instead set
//! `NOTES_ACTING_USER`. The note store only ever sees the resolved id.

use actix_web::{web, HttpRequest, HttpResponse};

use crate::AppState;

pub const USER_ID_HEADER: &str = "X-User-Id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity(String);

impl CallerIdentity {
    pub fn user_id(&self) -> &str {
        &self.0
    }
}

/// Resolve the caller, or the 401 response to send back.
pub fn resolve_caller(
    state: &web::Data<AppState>,
    req: &HttpRequest,
) -> Result<CallerIdentity, HttpResponse> {
    let from_header = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    match from_header.or_else(|| state.config.acting_user.clone()) {
        Some(user_id) => Ok(CallerIdentity(user_id)),
        None => Err(HttpResponse::Unauthorized().json(serde_json::json!({
            "error": "No caller identity provided"
        }))),
    }
}
