use actix_web::{delete, get, post, web, HttpResponse, Responder};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use validator::Validate;

use crate::middleware::AuthUser;
use crate::models::documents;
use crate::models::dto::RegisterDocumentRequest;
use crate::models::personnel::Role;

// Métadonnées seulement: le stockage binaire est un service externe,
// le client enregistre ici l'URL obtenue à l'upload.

/// GET /students/documents - Documents de l'étudiant connecté
#[get("")]
pub async fn list(db: web::Data<DatabaseConnection>, auth_user: AuthUser) -> impl Responder {
    if let Err(e) = auth_user.require(Role::Student) {
        return e.to_response();
    }

    let documents = documents::Entity::find()
        .filter(documents::Column::StudentId.eq(auth_user.user_id))
        .order_by_desc(documents::Column::UploadedDate)
        .all(db.get_ref())
        .await;

    match documents {
        Ok(documents) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": documents
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}

/// POST /students/documents - Enregistrer les métadonnées d'un document
#[post("")]
pub async fn register(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    request: web::Json<RegisterDocumentRequest>,
) -> impl Responder {
    if let Err(e) = auth_user.require(Role::Student) {
        return e.to_response();
    }

    if let Err(errors) = request.validate() {
        return HttpResponse::BadRequest().json(errors);
    }

    let request = request.into_inner();
    let new_document = documents::ActiveModel {
        student_id: Set(auth_user.user_id),
        name: Set(request.name),
        file_url: Set(request.file_url),
        file_size: Set(request.file_size),
        mime_type: Set(request.mime_type),
        uploaded_date: Set(Utc::now()),
        ..Default::default()
    };

    match new_document.insert(db.get_ref()).await {
        Ok(document) => HttpResponse::Created().json(serde_json::json!({
            "success": true,
            "data": document
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}

/// DELETE /students/documents/{id} - Supprimer son propre document
#[delete("/{id}")]
pub async fn remove(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    if let Err(e) = auth_user.require(Role::Student) {
        return e.to_response();
    }

    // La suppression est bornée au propriétaire: l'id seul ne suffit pas
    let result = documents::Entity::delete_many()
        .filter(documents::Column::Id.eq(path.into_inner()))
        .filter(documents::Column::StudentId.eq(auth_user.user_id))
        .exec(db.get_ref())
        .await;

    match result {
        Ok(result) if result.rows_affected > 0 => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": { "deleted": result.rows_affected }
        })),
        Ok(_) => HttpResponse::NotFound().json(serde_json::json!({
            "success": false,
            "error": "Document not found"
        })),
        Err(e) => HttpResponse::InternalServerError().json(serde_json::json!({
            "success": false,
            "error": format!("Database error: {}", e)
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/students/documents")
            .service(list)
            .service(register)
            .service(remove),
    );
}
