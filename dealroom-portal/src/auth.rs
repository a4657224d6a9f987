//! Identity extraction and role checks
//!
//! The portal sits behind an external auth layer that injects identity
//! headers on every proxied request. Role values are parsed at this
//! boundary only; unrecognized roles are rejected, never defaulted.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dealroom_core::{Role, Signer};

use crate::error::PortalError;
use crate::store::RoleStore;

pub const USER_ID_HEADER: &str = "x-auth-user";
pub const USER_EMAIL_HEADER: &str = "x-auth-email";
pub const USER_NAME_HEADER: &str = "x-auth-name";

/// Authenticated identity taken from the auth layer's headers
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub email: Option<String>,
    pub name: Option<String>,
}

impl Identity {
    pub fn signer(&self) -> Signer {
        Signer::from_identity(self.name.as_deref(), self.email.as_deref())
    }
}

fn header_value(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn identity_from_parts(parts: &Parts) -> Option<Identity> {
    let user_id = header_value(parts, USER_ID_HEADER)?;
    Some(Identity {
        user_id,
        email: header_value(parts, USER_EMAIL_HEADER),
        name: header_value(parts, USER_NAME_HEADER),
    })
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = PortalError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_parts(parts).ok_or(PortalError::Unauthorized)
    }
}

/// Identity for endpoints that also serve unauthenticated callers
#[derive(Debug, Clone)]
pub struct MaybeIdentity(pub Option<Identity>);

impl<S> FromRequestParts<S> for MaybeIdentity
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeIdentity(identity_from_parts(parts)))
    }
}

/// Resolve a user's role from the role store, rejecting users without an
/// assignment and assignments outside the known set.
pub fn resolve_role<R: RoleStore>(roles: &R, user_id: &str) -> Result<Role, PortalError> {
    let raw = roles.role_for(user_id)?.ok_or(PortalError::Forbidden)?;
    raw.parse::<Role>().map_err(|_| {
        tracing::warn!(user_id = %user_id, role = %raw, "Rejecting unrecognized role");
        PortalError::Forbidden
    })
}

/// Admin checks re-run on every call; a role established earlier in the
/// session is never trusted.
pub fn require_admin(role: Role) -> Result<(), PortalError> {
    if role == Role::Admin {
        Ok(())
    } else {
        Err(PortalError::Forbidden)
    }
}
