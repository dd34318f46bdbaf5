use sea_orm::*;
use chrono::Utc;

use crate::middleware::AuthUser;
use crate::models::departments;
use crate::models::dto::CreateInternshipRequest;
use crate::models::internships::{self, InternshipStatus};
use crate::models::personnel::{self, Role};
use crate::services::error::ServiceError;

pub struct InternshipService;

impl InternshipService {
    /// Publication d'une offre de stage par un chef de service.
    /// L'établissement est déduit du service, jamais fourni par le client.
    pub async fn create(
        db: &DatabaseConnection,
        auth: &AuthUser,
        request: CreateInternshipRequest,
    ) -> Result<internships::Model, ServiceError> {
        auth.require(Role::Chief)?;

        let department = departments::Entity::find_by_id(request.department_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Department"))?;

        // Le médecin encadrant doit exister et être un médecin: c'est lui
        // qui portera les évaluations créées à l'acceptation
        let supervisor = personnel::Entity::find_by_id(request.supervisor_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Supervisor"))?;

        if supervisor.role != Role::Doctor {
            return Err(ServiceError::Unauthorized(
                "supervisor must be a doctor".to_string(),
            ));
        }

        let new_internship = internships::ActiveModel {
            department_id: Set(department.id),
            establishment_id: Set(department.establishment_id),
            title: Set(request.title),
            description: Set(request.description),
            total_places: Set(request.total_places),
            filled_places: Set(0),
            start_date: Set(request.start_date),
            end_date: Set(request.end_date),
            required_level: Set(request.required_level),
            requirements: Set(request.requirements),
            status: Set(InternshipStatus::Actif),
            created_by: Set(auth.user_id),
            supervisor_id: Set(request.supervisor_id),
            created_at: Set(Utc::now()),
            ..Default::default()
        };

        Ok(new_internship.insert(db).await?)
    }

    /// Clôture explicite par le chef de service (fin de période).
    /// Les candidatures déjà tranchées ne sont pas touchées.
    pub async fn close(
        db: &DatabaseConnection,
        auth: &AuthUser,
        internship_id: i32,
    ) -> Result<internships::Model, ServiceError> {
        auth.require(Role::Chief)?;

        let internship = internships::Entity::find_by_id(internship_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        if internship.created_by != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "only the chief who published this internship can close it".to_string(),
            ));
        }

        if !internship.status.can_close() {
            return Err(ServiceError::InvalidTransition {
                entity: "internship",
                from: internship.status.to_value(),
                action: "close",
            });
        }

        let mut active: internships::ActiveModel = internship.into();
        active.status = Set(InternshipStatus::Cloture);

        Ok(active.update(db).await?)
    }
}
