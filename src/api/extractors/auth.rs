use axum::{
    extract::{FromRequestParts, FromRef},
    http::request::Parts,
};
use crate::state::AppState;
use crate::domain::models::user::Role;
use crate::error::AppError;
use std::sync::Arc;
use tower_cookies::Cookies;
use tracing::Span;

pub const ACTIVE_ROLE_HEADER: &str = "X-Active-Role";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

/// Caller identity plus the role they act in for this request.
/// Users registered as `both` pick guest or host with `X-Active-Role`; guest is the default.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
    pub acting_as: Role,
}

impl AuthUser {
    pub fn require_host(&self) -> Result<(), AppError> {
        if self.acting_as == Role::Host {
            Ok(())
        } else if self.role.can_act_as(Role::Host) {
            Err(AppError::Forbidden("Switch to host mode to access this resource".into()))
        } else {
            Err(AppError::Forbidden("Access denied. This resource is for hosts only".into()))
        }
    }

    pub fn require_guest(&self) -> Result<(), AppError> {
        if self.acting_as == Role::Guest {
            Ok(())
        } else if self.role.can_act_as(Role::Guest) {
            Err(AppError::Forbidden("Switch to guest mode to book a stay".into()))
        } else {
            Err(AppError::Forbidden("Hosts cannot book stays".into()))
        }
    }
}

fn acting_role(role: Role, header: Option<&str>) -> Result<Role, AppError> {
    let requested = match header {
        Some(raw) => Some(
            raw.trim().to_ascii_lowercase().parse::<Role>()
                .map_err(|e| AppError::Validation(e.to_string()))?,
        ),
        None => None,
    };

    match (role, requested) {
        (_, Some(Role::Both)) => Err(AppError::Validation("Active role must be guest or host".into())),
        (Role::Both, Some(acting)) => Ok(acting),
        (Role::Both, None) => Ok(Role::Guest),
        (own, Some(acting)) if acting != own => {
            Err(AppError::Forbidden(format!("Account cannot act as {}", acting)))
        }
        (own, _) => Ok(own),
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    Arc<AppState>: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookies = parts.extensions.get::<Cookies>()
            .ok_or(AppError::Internal)?;

        let access_token = cookies.get("access_token")
            .ok_or(AppError::Unauthorized)?
            .value()
            .to_string();

        let app_state = <Arc<AppState> as FromRef<S>>::from_ref(state);
        let claims = app_state.auth_service.decode_access_token(&access_token)?;

        let method = &parts.method;
        if method != "GET" && method != "HEAD" && method != "OPTIONS" {
            let csrf_header_val = parts.headers.get(CSRF_HEADER)
                .ok_or_else(|| AppError::Forbidden("Missing CSRF token".into()))?
                .to_str()
                .map_err(|_| AppError::Forbidden("Malformed CSRF token".into()))?;

            if csrf_header_val != claims.csrf_token {
                return Err(AppError::Forbidden("CSRF token mismatch".into()));
            }
        }

        let header = parts.headers.get(ACTIVE_ROLE_HEADER)
            .map(|v| v.to_str().map_err(|_| AppError::Validation("Malformed active role".into())))
            .transpose()?;
        let acting_as = acting_role(claims.role, header)?;

        Span::current().record("user_id", claims.sub.as_str());

        Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            acting_as,
        })
    }
}
