use actix_web::{get, post, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::dto::{CreateInternshipRequest, InternshipFilters, SearchParams};
use crate::services::internship_service::InternshipService;
use crate::services::query_service::QueryService;

/// GET /internships/available - Stages ouverts aux candidatures (ÉTUDIANT)
/// Filtres conjonctifs optionnels: department_id, city, level
#[get("/available")]
pub async fn available(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    filters: web::Query<InternshipFilters>,
) -> impl Responder {
    match QueryService::list_available_internships(db.get_ref(), &auth_user, &filters).await {
        Ok(internships) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": internships
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /internships/search?q=... - Recherche texte libre parmi les stages
/// ouverts (ÉTUDIANT)
#[get("/search")]
pub async fn search(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    params: web::Query<SearchParams>,
) -> impl Responder {
    match QueryService::search_available_internships(db.get_ref(), &auth_user, &params.q).await {
        Ok(internships) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": internships
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /internships/{id} - Fiche détaillée avec places restantes (tout rôle)
#[get("/{id}")]
pub async fn detail(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match QueryService::internship_detail(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(detail) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": detail
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /internships/mine - Offres publiées par le chef connecté (CHEF)
#[get("/mine")]
pub async fn mine(db: web::Data<DatabaseConnection>, auth_user: AuthUser) -> impl Responder {
    match QueryService::list_my_internships(db.get_ref(), &auth_user).await {
        Ok(internships) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": internships
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /internships - Publication d'une offre (CHEF)
pub async fn create(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<CreateInternshipRequest>,
) -> impl Responder {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match InternshipService::create(db.get_ref(), &auth_user, request.into_inner()).await {
        Ok(internship) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": internship
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /internships/{id}/close - Clôture explicite (CHEF propriétaire)
#[post("/{id}/close")]
pub async fn close(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match InternshipService::close(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(internship) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": internship
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    // Les segments littéraux (available, mine, search) sont enregistrés
    // avant /{id} pour ne pas être capturés par le paramètre de chemin
    cfg.service(
        web::scope("/internships")
            .route("", web::post().to(create))
            .service(available)
            .service(mine)
            .service(search)
            .service(close)
            .service(detail),
    );
}
