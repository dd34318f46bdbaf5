use actix_web::{dev::Payload, Error, FromRequest, HttpRequest, HttpResponse};
use futures::future::{ready, Ready};
use serde::{Deserialize, Serialize};

use crate::models::personnel::Role;
use crate::services::error::ServiceError;
use crate::utils::jwt;

/// Identité de l'appelant authentifié, extraite du Bearer token.
/// C'est le SEUL canal par lequel les services reçoivent l'identité :
/// jamais d'état ambiant, l'AuthUser est passé explicitement partout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_id: i32,
    pub role: Role,
    pub display_name: String,
}

impl AuthUser {
    /// Vérifie que l'appelant a exactement le rôle attendu
    pub fn require(&self, role: Role) -> Result<(), ServiceError> {
        if self.role == role {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized(format!(
                "{:?} role required",
                role
            )))
        }
    }

    /// Vérifie que l'appelant a l'un des rôles attendus
    pub fn require_any(&self, roles: &[Role]) -> Result<(), ServiceError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized(format!(
                "one of {:?} required",
                roles
            )))
        }
    }
}

/// Extrait le token du header "Authorization: Bearer <token>"
fn extract_bearer(auth_str: &str) -> Option<&str> {
    auth_str.strip_prefix("Bearer ")
}

fn unauthorized(message: &str) -> Error {
    let response = HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": message
    }));
    actix_web::error::InternalError::from_response("", response).into()
}

/// Implémentation de FromRequest pour AuthUser : Actix extrait
/// automatiquement l'identité dans les routes protégées.
impl FromRequest for AuthUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        // 1. Extraire le header Authorization
        let auth_header = match req.headers().get("Authorization") {
            Some(header) => header,
            None => return ready(Err(unauthorized("Missing Authorization header"))),
        };

        // 2. Convertir le header en string
        let auth_str = match auth_header.to_str() {
            Ok(s) => s,
            Err(_) => return ready(Err(unauthorized("Invalid Authorization header"))),
        };

        // 3. Extraire le token (format: "Bearer <token>")
        let token = match extract_bearer(auth_str) {
            Some(t) => t,
            None => {
                return ready(Err(unauthorized(
                    "Invalid Authorization format (expected: Bearer <token>)",
                )))
            }
        };

        // 4. Vérifier le token JWT
        let claims = match jwt::verify_token(token) {
            Ok(claims) => claims,
            Err(e) => return ready(Err(unauthorized(&format!("Invalid token: {}", e)))),
        };

        // 5. Créer et retourner AuthUser
        ready(Ok(AuthUser {
            user_id: claims.sub,
            role: claims.role,
            display_name: claims.name,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bearer() {
        assert_eq!(extract_bearer("Bearer abc.def.ghi"), Some("abc.def.ghi"));
        assert_eq!(extract_bearer("Basic abc"), None);
        assert_eq!(extract_bearer("bearer abc"), None);
    }

    #[test]
    fn test_require_role() {
        let chief = AuthUser {
            user_id: 1,
            role: Role::Chief,
            display_name: "Chef".to_string(),
        };

        assert!(chief.require(Role::Chief).is_ok());
        assert!(chief.require(Role::Admin).is_err());
        assert!(chief.require_any(&[Role::Chief, Role::Admin]).is_ok());
        assert!(chief.require_any(&[Role::Student]).is_err());
    }
}
