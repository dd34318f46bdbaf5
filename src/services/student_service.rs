use sea_orm::*;

use crate::middleware::AuthUser;
use crate::models::dto::{StudentProfile, UpdateStudentProfileRequest};
use crate::models::personnel::Role;
use crate::models::students;
use crate::services::error::ServiceError;

/// Profil de l'étudiant connecté (consultation et mise à jour de ses
/// propres coordonnées).
pub struct StudentService;

/// Pourcentage de champs de profil renseignés (email, téléphone, niveau,
/// spécialité). Dérivé en lecture, jamais stocké.
pub fn profile_completion(student: &students::Model) -> u8 {
    let fields = [
        !student.email.trim().is_empty(),
        student.phone.as_deref().is_some_and(|p| !p.trim().is_empty()),
        !student.level.trim().is_empty(),
        !student.specialty.trim().is_empty(),
    ];
    let filled = fields.iter().filter(|&&filled| filled).count() as u32;
    ((filled * 100) / fields.len() as u32) as u8
}

impl StudentService {
    pub async fn profile(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<StudentProfile, ServiceError> {
        auth.require(Role::Student)?;

        let student = students::Entity::find_by_id(auth.user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;

        let profile_completion = profile_completion(&student);
        Ok(StudentProfile {
            student,
            profile_completion,
        })
    }

    /// Mise à jour partielle: seuls les champs fournis sont modifiés
    pub async fn update_profile(
        db: &DatabaseConnection,
        auth: &AuthUser,
        request: UpdateStudentProfileRequest,
    ) -> Result<StudentProfile, ServiceError> {
        auth.require(Role::Student)?;

        let student = students::Entity::find_by_id(auth.user_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Student"))?;

        let mut active: students::ActiveModel = student.into();
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(level) = request.level {
            active.level = Set(level);
        }
        if let Some(specialty) = request.specialty {
            active.specialty = Set(specialty);
        }

        let student = active.update(db).await?;
        let profile_completion = profile_completion(&student);
        Ok(StudentProfile {
            student,
            profile_completion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn student(phone: Option<&str>, specialty: &str) -> students::Model {
        students::Model {
            id: 7,
            matricule: "ETU-2024-0007".to_string(),
            first_name: "Amina".to_string(),
            last_name: "Benali".to_string(),
            email: "a.benali@univ.dz".to_string(),
            phone: phone.map(str::to_string),
            level: "quatre_ans".to_string(),
            specialty: specialty.to_string(),
            password_hash: None,
            is_active: true,
            registration_date: Utc::now(),
        }
    }

    #[test]
    fn test_full_profile_is_complete() {
        assert_eq!(
            profile_completion(&student(Some("+213 55 123 4567"), "Cardiologie")),
            100
        );
    }

    #[test]
    fn test_missing_fields_lower_completion() {
        assert_eq!(profile_completion(&student(None, "Cardiologie")), 75);
        assert_eq!(profile_completion(&student(None, "")), 50);
        // Un champ rempli d'espaces ne compte pas
        assert_eq!(profile_completion(&student(Some("  "), "Cardiologie")), 75);
    }
}
