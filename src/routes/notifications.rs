use actix_web::{get, put, web, HttpResponse, Responder};
use sea_orm::DatabaseConnection;

use crate::middleware::AuthUser;
use crate::services::notification_service::NotificationService;

/// GET /notifications - Notifications de l'appelant, récentes en premier
#[get("")]
pub async fn list(db: web::Data<DatabaseConnection>, auth_user: AuthUser) -> impl Responder {
    match NotificationService::list(db.get_ref(), &auth_user).await {
        Ok(notifications) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": notifications
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /notifications/{id}/read - Marquer comme lue (idempotent)
#[put("/{id}/read")]
pub async fn mark_as_read(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
    path: web::Path<i32>,
) -> impl Responder {
    match NotificationService::mark_as_read(db.get_ref(), &auth_user, path.into_inner()).await {
        Ok(notification) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": notification
        })),
        Err(e) => e.to_response(),
    }
}

/// PUT /notifications/read-all - Tout marquer comme lu (idempotent)
#[put("/read-all")]
pub async fn mark_all_as_read(
    db: web::Data<DatabaseConnection>,
    auth_user: AuthUser,
) -> impl Responder {
    match NotificationService::mark_all_as_read(db.get_ref(), &auth_user).await {
        Ok(marked) => HttpResponse::Ok().json(serde_json::json!({
            "success": true,
            "data": { "marked": marked }
        })),
        Err(e) => e.to_response(),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/notifications")
            .service(list)
            .service(mark_all_as_read)
            .service(mark_as_read),
    );
}
