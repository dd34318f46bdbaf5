use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::models::dto::{EvaluationStatusFilter, SubmitEvaluationRequest};
use crate::models::personnel::Role;
use crate::services::evaluation_service::EvaluationService;
use crate::services::query_service::QueryService;

/// GET /evaluations - Liste à scope de rôle:
/// médecin → évaluations assignées (filtre status optionnel),
/// étudiant → ses propres évaluations
#[get("")]
pub async fn list(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    filter: web::Query<EvaluationStatusFilter>,
) -> impl Responder {
    if let Err(e) = auth_user.require_any(&[Role::Doctor, Role::Student]) {
        return e.to_response();
    }

    let result = if auth_user.role == Role::Doctor {
        QueryService::list_assigned_evaluations(db.get_ref(), &auth_user, filter.status.clone())
            .await
    } else {
        QueryService::list_student_evaluations(db.get_ref(), &auth_user).await
    };

    match result {
        Ok(evaluations) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": evaluations
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /evaluations/{id}/submit - Soumission de la note (MÉDECIN assigné)
#[post("/{id}/submit")]
pub async fn submit(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<SubmitEvaluationRequest>,
) -> impl Responder {
    match EvaluationService::submit(
        db.get_ref(),
        &auth_user,
        path.into_inner(),
        request.into_inner(),
    )
    .await
    {
        Ok(evaluation) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": evaluation
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /evaluations/{id}/validate - Validation finale (CHEF propriétaire).
/// La réponse contient la demande d'attestation émise vers le service de
/// génération de documents.
#[post("/{id}/validate")]
pub async fn validate(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match EvaluationService::validate(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok((evaluation, attestation)) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": {
                "evaluation": evaluation,
                "attestation": attestation
            }
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/evaluations")
            .service(list)
            .service(submit)
            .service(validate),
    );
}
