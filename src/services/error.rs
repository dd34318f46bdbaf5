use std::fmt;

use actix_web::HttpResponse;
use rust_decimal::Decimal;
use sea_orm::DbErr;

/// Erreurs métier des services. Chaque variante correspond à une règle du
/// domaine ; la conversion HTTP se fait en un seul endroit (to_response)
/// avec l'enveloppe {success: false, error: ...}.
#[derive(Debug)]
pub enum ServiceError {
    /// Transition d'état interdite (ex: accepter une candidature déjà refusée)
    InvalidTransition { entity: &'static str, from: String, action: &'static str },
    /// Plus aucune place disponible sur le stage
    CapacityExceeded,
    /// L'étudiant a déjà une candidature PENDING/ACCEPTED sur ce stage
    DuplicateApplication,
    /// Note d'évaluation hors bornes [0, 20]
    InvalidScore(Decimal),
    /// Le rôle ou l'identité de l'appelant ne donne pas accès à ce scope
    Unauthorized(String),
    /// Entité référencée introuvable
    NotFound(&'static str),
    Database(DbErr),
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceError::InvalidTransition { entity, from, action } => {
                write!(f, "Invalid transition: cannot {} {} in status {}", action, entity, from)
            }
            ServiceError::CapacityExceeded => {
                write!(f, "No places left on this internship")
            }
            ServiceError::DuplicateApplication => {
                write!(f, "Student already has an active application for this internship")
            }
            ServiceError::InvalidScore(score) => {
                write!(f, "Invalid score {}: must be between 0 and 20", score)
            }
            ServiceError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ServiceError::NotFound(entity) => write!(f, "{} not found", entity),
            ServiceError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl From<DbErr> for ServiceError {
    fn from(e: DbErr) -> Self {
        ServiceError::Database(e)
    }
}

impl ServiceError {
    /// Construit la réponse HTTP avec l'enveloppe d'erreur normalisée
    pub fn to_response(&self) -> HttpResponse {
        let body = serde_json::json!({
            "success": false,
            "error": self.to_string()
        });

        match self {
            ServiceError::InvalidTransition { .. }
            | ServiceError::CapacityExceeded
            | ServiceError::DuplicateApplication => HttpResponse::Conflict().json(body),
            ServiceError::InvalidScore(_) => HttpResponse::UnprocessableEntity().json(body),
            ServiceError::Unauthorized(_) => HttpResponse::Forbidden().json(body),
            ServiceError::NotFound(_) => HttpResponse::NotFound().json(body),
            ServiceError::Database(_) => HttpResponse::InternalServerError().json(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn test_display_messages() {
        let e = ServiceError::InvalidTransition {
            entity: "application",
            from: "REJECTED".to_string(),
            action: "accept",
        };
        assert_eq!(
            e.to_string(),
            "Invalid transition: cannot accept application in status REJECTED"
        );

        let e = ServiceError::InvalidScore(Decimal::new(21, 0));
        assert_eq!(e.to_string(), "Invalid score 21: must be between 0 and 20");
    }
}
