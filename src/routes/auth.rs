use actix_web::{post, get, web, HttpResponse};
use sea_orm::{DatabaseConnection, EntityTrait, QueryFilter, ColumnTrait};
use serde::Deserialize;

use crate::middleware::AuthUser;
use crate::models::personnel::{self, Role};
use crate::models::students;
use crate::utils::{password, jwt};

// DTO pour la connexion étudiant (matricule)
#[derive(Deserialize)]
pub struct StudentLoginRequest {
    pub matricule: String,
    pub password: String,
}

// DTO pour la connexion du personnel (email)
#[derive(Deserialize)]
pub struct PersonnelLoginRequest {
    pub email: String,
    pub password: String,
}

fn invalid_credentials() -> HttpResponse {
    HttpResponse::Unauthorized().json(serde_json::json!({
        "success": false,
        "error": "Invalid credentials"
    }))
}

/// POST /auth/student-login - Connexion étudiant par matricule (PUBLIC)
#[post("/student-login")]
pub async fn student_login(
    body: web::Json<StudentLoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver l'étudiant par matricule
    let student = match students::Entity::find()
        .filter(students::Column::Matricule.eq(&body.matricule))
        .one(db.get_ref())
        .await
    {
        Ok(Some(student)) => student,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if !student.is_active {
        return invalid_credentials();
    }

    // 2. Vérifier le mot de passe
    let password_hash = match student.password_hash {
        Some(ref hash) => hash,
        None => return invalid_credentials(),
    };

    match password::verify_password(&body.password, password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("Password verification error: {}", e)
            }));
        }
    }

    // 3. Générer le JWT avec le rôle student
    let token = match jwt::generate_token(student.id, Role::Student, &student.display_name()) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    // 4. Retourner token + profil (password_hash jamais sérialisé)
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "token": token,
            "user": student
        }
    }))
}

/// POST /auth/personnel-login - Connexion personnel par email (PUBLIC)
#[post("/personnel-login")]
pub async fn personnel_login(
    body: web::Json<PersonnelLoginRequest>,
    db: web::Data<DatabaseConnection>,
) -> HttpResponse {
    // 1. Trouver le membre du personnel par email
    let member = match personnel::Entity::find()
        .filter(personnel::Column::Email.eq(&body.email))
        .one(db.get_ref())
        .await
    {
        Ok(Some(member)) => member,
        Ok(None) => return invalid_credentials(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("Database error: {}", e)
            }));
        }
    };

    if !member.is_active {
        return invalid_credentials();
    }

    // 2. Vérifier le mot de passe
    let password_hash = match member.password_hash {
        Some(ref hash) => hash,
        None => return invalid_credentials(),
    };

    match password::verify_password(&body.password, password_hash) {
        Ok(true) => {}
        Ok(false) => return invalid_credentials(),
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("Password verification error: {}", e)
            }));
        }
    }

    // 3. Générer le JWT avec le rôle stocké en base (doctor/chief/admin)
    let token = match jwt::generate_token(member.id, member.role, &member.display_name()) {
        Ok(token) => token,
        Err(e) => {
            return HttpResponse::InternalServerError().json(serde_json::json!({
                "success": false,
                "error": format!("Failed to generate token: {}", e)
            }));
        }
    };

    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": {
            "token": token,
            "user": member
        }
    }))
}

/// GET /auth/me - Introspection du token (PROTÉGÉE)
#[get("/me")]
pub async fn me(auth_user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "success": true,
        "data": auth_user
    }))
}

pub fn auth_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(student_login)
            .service(personnel_login)
            .service(me),
    );
}
