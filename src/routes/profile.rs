use actix_web::{get, put, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::dto::UpdateStudentProfileRequest;
use crate::services::student_service::StudentService;

/// GET /students/profile - Profil de l'étudiant connecté, avec taux de
/// complétion dérivé (ÉTUDIANT)
#[get("")]
pub async fn get_profile(db: web::Data<DatabaseConnection>, auth_user: AuthUser) -> impl Responder {
    match StudentService::profile(db.get_ref(), &auth_user).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": profile
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /students/profile - Mise à jour partielle de ses coordonnées (ÉTUDIANT)
#[put("")]
pub async fn update_profile(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<UpdateStudentProfileRequest>,
) -> impl Responder {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match StudentService::update_profile(db.get_ref(), &auth_user, request.into_inner()).await {
        Ok(profile) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": profile
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students/profile")
            .service(get_profile)
            .service(update_profile),
    );
}
