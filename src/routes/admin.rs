use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::dto::{
    CreateEstablishmentRequest, CreatePersonnelRequest, CreateStudentRequest, PageParams,
    RoleFilter, UpdateEstablishmentRequest, UpdatePersonnelRequest,
};
use crate::models::personnel::Role;
use crate::services::admin_service::AdminService;
use crate::services::query_service::QueryService;

// ---------------------------------------------------------------------------
// Établissements (ADMIN)
// ---------------------------------------------------------------------------

/// GET /establishments - Liste paginée
#[get("")]
pub async fn list_establishments(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    params: web::Query<PageParams>,
) -> impl Responder {
    match QueryService::list_establishments_paged(db.get_ref(), &auth_user, &params).await {
        Ok(page) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": page
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /establishments/{id} - Détail avec compteurs dérivés
#[get("/{id}")]
pub async fn get_establishment(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match AdminService::establishment_with_counts(db.get_ref(), &auth_user, path.into_inner())
        .await
    {
        Ok(detail) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": detail
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /establishments - Création
#[post("")]
pub async fn create_establishment(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<CreateEstablishmentRequest>,
) -> impl Responder {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match AdminService::create_establishment(db.get_ref(), &auth_user, request.into_inner()).await
    {
        Ok(establishment) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": establishment
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /establishments/{id} - Mise à jour partielle
#[put("/{id}")]
pub async fn update_establishment(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdateEstablishmentRequest>,
) -> impl Responder {
    match AdminService::update_establishment(
        db.get_ref(),
        &auth_user,
        path.into_inner(),
        request.into_inner(),
    )
    .await
    {
        Ok(establishment) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": establishment
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /establishments/{id}
#[delete("/{id}")]
pub async fn delete_establishment(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match AdminService::delete_establishment(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": { "deleted": true }
        })),
        Err(e) => e.to_response(),
    }
}

// ---------------------------------------------------------------------------
// Comptes personnel (ADMIN)
// ---------------------------------------------------------------------------

/// GET /users - Liste paginée du personnel, filtre de rôle optionnel
#[get("")]
pub async fn list_users(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    role_filter: web::Query<RoleFilter>,
    params: web::Query<PageParams>,
) -> impl Responder {
    match QueryService::list_personnel_paged(db.get_ref(), &auth_user, role_filter.role, &params)
        .await
    {
        Ok(page) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": page
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /users - Création d'un compte personnel
#[post("")]
pub async fn create_user(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<CreatePersonnelRequest>,
) -> impl Responder {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    // Les comptes étudiants passent par /students (matricule obligatoire)
    if request.role == Role::Student {
        return HttpResponse::BadRequest().json(serde_json::json!({
            "success": false,
            "error": "Student accounts are created via POST /students"
        }));
    }

    match AdminService::create_personnel(db.get_ref(), &auth_user, request.into_inner()).await {
        Ok(member) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": member
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /users/{id} - Mise à jour partielle
#[put("/{id}")]
pub async fn update_user(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
    request: web::Json<UpdatePersonnelRequest>,
) -> impl Responder {
    match AdminService::update_personnel(
        db.get_ref(),
        &auth_user,
        path.into_inner(),
        request.into_inner(),
    )
    .await
    {
        Ok(member) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": member
        })),
        Err(e) => e.to_response(),
    }
}

/// DELETE /users/{id}
#[delete("/{id}")]
pub async fn delete_user(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match AdminService::delete_personnel(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(()) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": { "deleted": true }
        })),
        Err(e) => e.to_response(),
    }
}

// ---------------------------------------------------------------------------
// Comptes étudiants + tableau de bord (ADMIN)
// ---------------------------------------------------------------------------

/// GET /students - Liste paginée des étudiants
#[get("")]
pub async fn list_students(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    params: web::Query<PageParams>,
) -> impl Responder {
    match QueryService::list_students_paged(db.get_ref(), &auth_user, &params).await {
        Ok(page) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": page
        })),
        Err(e) => e.to_response(),
    }
}

/// POST /students - Création d'un compte étudiant
#[post("")]
pub async fn create_student(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<CreateStudentRequest>,
) -> impl Responder {
    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    match AdminService::create_student(db.get_ref(), &auth_user, request.into_inner()).await {
        Ok(student) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": student
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /admin/internships - Liste paginée de tous les stages
#[get("/internships")]
pub async fn list_all_internships(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    params: web::Query<PageParams>,
) -> impl Responder {
    match QueryService::list_internships_paged(db.get_ref(), &auth_user, &params).await {
        Ok(page) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": page
        })),
        Err(e) => e.to_response(),
    }
}

/// GET /admin/dashboard - Agrégats globaux
#[get("/dashboard")]
pub async fn dashboard(db: web::Data<DatabaseConnection>, auth_user: AuthUser) -> impl Responder {
    match AdminService::dashboard_stats(db.get_ref(), &auth_user).await {
        Ok(stats) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": stats
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/establishments")
            .service(list_establishments)
            .service(create_establishment)
            .service(get_establishment)
            .service(update_establishment)
            .service(delete_establishment),
    );
    cfg.service(
        web::scope("/users")
            .service(list_users)
            .service(create_user)
            .service(update_user)
            .service(delete_user),
    );
    cfg.service(
        web::scope("/students")
            .service(list_students)
            .service(create_student),
    );
    cfg.service(
        web::scope("/admin")
            .service(list_all_internships)
            .service(dashboard),
    );
}
