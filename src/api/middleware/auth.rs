//! JWT authentication middleware.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::api::AppState;
use crate::config::BEARER_TOKEN_PREFIX;
use crate::domain::{Actor, UserRole};
use crate::errors::AppError;

/// Authenticated user extracted from JWT token
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// The identity services authorize against.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role)
    }
}

/// Handlers take `CurrentUser` (401 when the middleware found no
/// token) or `Option<CurrentUser>` on routes open to anonymous callers.
#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

fn bearer_token(request: &Request) -> Option<Result<&str, AppError>> {
    let header = request.headers().get(AUTHORIZATION)?;
    Some(
        header
            .to_str()
            .ok()
            .and_then(|h| h.strip_prefix(BEARER_TOKEN_PREFIX))
            .ok_or(AppError::Unauthorized),
    )
}

/// Verify the token, then resolve the account it names. A deleted user is
/// locked out at once and a role change applies on the next request.
async fn authenticate(state: &AppState, token: &str) -> Result<CurrentUser, AppError> {
    let claims = state.services.auth().verify_token(token)?;
    let user = match state.services.users().get_user(claims.sub).await {
        Ok(user) => user,
        Err(AppError::NotFound) => {
            tracing::debug!(user_id = %claims.sub, "token names a deleted account");
            return Err(AppError::Unauthorized);
        }
        Err(e) => return Err(e),
    };

    Ok(CurrentUser {
        id: user.id,
        email: user.email,
        role: user.role,
    })
}

/// JWT authentication middleware.
///
/// Extracts and validates the JWT token from the Authorization header,
/// then injects the CurrentUser into the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request).ok_or(AppError::Unauthorized)??;
    let current_user = authenticate(&state, token).await?;

    request.extensions_mut().insert(current_user);

    Ok(next.run(request).await)
}

/// Like `auth_middleware`, but a request without an Authorization header
/// passes through anonymously. A header that is present must be valid.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(token) = bearer_token(&request) {
        let current_user = authenticate(&state, token?).await?;
        request.extensions_mut().insert(current_user);
    }

    Ok(next.run(request).await)
}

/// Gate for the admin router; runs after `auth_middleware`.
pub async fn admin_middleware(
    current_user: CurrentUser,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    require_admin(&current_user)?;
    Ok(next.run(request).await)
}

/// Require admin role, returns Forbidden error if not admin.
pub fn require_admin(user: &CurrentUser) -> Result<(), AppError> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
