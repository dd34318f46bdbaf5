use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::models::dto::{ApplicationStatusFilter, RejectRequest, SubmitApplicationRequest};
use crate::models::personnel::Role;
use crate::services::application_service::ApplicationService;
use crate::services::query_service::QueryService;

/// POST /applications/submit - Dépôt de candidature (ÉTUDIANT)
#[post("/submit")]
pub async fn submit(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<SubmitApplicationRequest>,
) -> impl Responder {
    match ApplicationService::submit(db.get_ref(), &auth_user, request.into_inner()).await {
        Ok(application) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": application
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /applications - Liste à scope de rôle:
/// étudiant → ses candidatures, chef → celles reçues sur ses offres
#[get("")]
pub async fn list(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    filter: web::Query<ApplicationStatusFilter>,
) -> impl Responder {
    if let Err(e) = auth_user.require_any(&[Role::Student, Role::Chief]) {
        return e.to_response();
    }

    let result = if auth_user.role == Role::Student {
        QueryService::list_my_applications(db.get_ref(), &auth_user, filter.status.clone()).await
    } else {
        QueryService::list_applications_for_my_internships(
            db.get_ref(),
            &auth_user,
            filter.status.clone(),
        )
        .await
    };

    match result {
        Ok(applications) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": applications
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /applications/{id}/accept - Acceptation (CHEF propriétaire)
#[post("/{id}/accept")]
pub async fn accept(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match ApplicationService::accept(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(application) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": application
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /applications/{id}/reject - Refus motivé (CHEF propriétaire)
#[post("/{id}/reject")]
pub async fn reject(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<RejectRequest>,
) -> impl Responder {
    match ApplicationService::reject(
        db.get_ref(),
        &auth_user,
        path.into_inner(),
        request.into_inner().reason,
    )
    .await
    {
        Ok(application) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": application
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /applications/{id}/withdraw - Désistement (ÉTUDIANT propriétaire)
#[post("/{id}/withdraw")]
pub async fn withdraw(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match ApplicationService::withdraw(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(application) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": application
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/applications")
            .service(submit)
            .service(list)
            .service(accept)
            .service(reject)
            .service(withdraw),
    );
}
