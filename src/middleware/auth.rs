use axum::{extract::FromRef, extract::FromRequestParts, http::header};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::Occupation,
    token::{PrincipalKind, TokenCodec},
};

/// Verified identity attached to a request. The token carries only id and
/// principal type; occupation is looked up when a check needs it.
#[derive(Debug, Clone, Copy)]
pub struct AuthPrincipal {
    pub id: Uuid,
    pub kind: PrincipalKind,
}

pub fn require_customer(principal: &AuthPrincipal) -> Result<(), AppError> {
    match principal.kind {
        PrincipalKind::Customer => Ok(()),
        PrincipalKind::Employee => Err(AppError::Forbidden),
    }
}

pub fn require_employee(principal: &AuthPrincipal) -> Result<(), AppError> {
    match principal.kind {
        PrincipalKind::Employee => Ok(()),
        PrincipalKind::Customer => Err(AppError::Forbidden),
    }
}

/// Occupation changes and other manager-only actions: the principal must be
/// an employee whose stored occupation is manager.
pub async fn require_manager(pool: &DbPool, principal: &AuthPrincipal) -> Result<(), AppError> {
    require_employee(principal)?;
    let occupation: Option<(String,)> =
        sqlx::query_as("SELECT occupation FROM employees WHERE id = $1")
            .bind(principal.id)
            .fetch_optional(pool)
            .await?;
    match occupation {
        Some((occ,)) if Occupation::try_from(occ.clone()) == Ok(Occupation::Manager) => Ok(()),
        Some(_) => Err(AppError::Forbidden),
        None => Err(AppError::Unauthorized("TOKEN_INVALID")),
    }
}

impl<S> FromRequestParts<S> for AuthPrincipal
where
    S: Send + Sync,
    TokenCodec: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        state: &S,
    ) -> Result<Self, Self::Rejection> {
        // The raw token is the header value, no scheme prefix.
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AppError::Unauthorized("TOKEN_MISSING"))?
            .to_str()
            .map_err(|_| AppError::Unauthorized("TOKEN_MALFORMED"))?
            .trim();

        let codec = TokenCodec::from_ref(state);
        let credential = codec.verify(token)?;

        Ok(AuthPrincipal {
            id: credential.principal_id,
            kind: credential.kind,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_gate_is_exclusive() {
        let customer = AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Customer,
        };
        let employee = AuthPrincipal {
            id: Uuid::new_v4(),
            kind: PrincipalKind::Employee,
        };

        assert!(require_customer(&customer).is_ok());
        assert!(require_employee(&customer).is_err());
        assert!(require_employee(&employee).is_ok());
        assert!(require_customer(&employee).is_err());
    }
}
