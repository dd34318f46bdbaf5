use sea_orm::*;
use chrono::Utc;

use crate::middleware::AuthUser;
use crate::models::applications::{self, ApplicationStatus};
use crate::models::departments;
use crate::models::dto::{
    CreateEstablishmentRequest, CreatePersonnelRequest, CreateStudentRequest, DashboardStats,
    EstablishmentWithCounts, UpdateEstablishmentRequest, UpdatePersonnelRequest,
};
use crate::models::establishments;
use crate::models::evaluations::{self, EvaluationStatus};
use crate::models::internships::{self, InternshipStatus};
use crate::models::personnel::{self, Role};
use crate::models::students;
use crate::services::error::ServiceError;
use crate::utils::password;

/// Administration des données de référence (établissements, comptes).
/// Les compteurs d'un établissement sont dérivés des tables enfants en
/// lecture: la base ne stocke jamais un agrégat à côté de sa source.
pub struct AdminService;

impl AdminService {
    // -----------------------------------------------------------------------
    // Établissements
    // -----------------------------------------------------------------------

    pub async fn create_establishment(
        db: &DatabaseConnection,
        auth: &AuthUser,
        request: CreateEstablishmentRequest,
    ) -> Result<establishments::Model, ServiceError> {
        auth.require(Role::Admin)?;

        let new_establishment = establishments::ActiveModel {
            name: Set(request.name),
            city: Set(request.city),
            address: Set(request.address),
            phone: Set(request.phone),
            email: Set(request.email),
            website: Set(request.website),
            establishment_type: Set(request.establishment_type),
            is_active: Set(true),
            ..Default::default()
        };

        Ok(new_establishment.insert(db).await?)
    }

    pub async fn update_establishment(
        db: &DatabaseConnection,
        auth: &AuthUser,
        establishment_id: i32,
        request: UpdateEstablishmentRequest,
    ) -> Result<establishments::Model, ServiceError> {
        auth.require(Role::Admin)?;

        let establishment = establishments::Entity::find_by_id(establishment_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Establishment"))?;

        let mut active: establishments::ActiveModel = establishment.into();
        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(city) = request.city {
            active.city = Set(city);
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(website) = request.website {
            active.website = Set(Some(website));
        }
        if let Some(kind) = request.establishment_type {
            active.establishment_type = Set(kind);
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        Ok(active.update(db).await?)
    }

    pub async fn delete_establishment(
        db: &DatabaseConnection,
        auth: &AuthUser,
        establishment_id: i32,
    ) -> Result<(), ServiceError> {
        auth.require(Role::Admin)?;

        let result = establishments::Entity::delete_by_id(establishment_id)
            .exec(db)
            .await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Establishment"));
        }

        Ok(())
    }

    /// Détail d'un établissement avec ses compteurs dérivés:
    /// nombre de services rattachés, nombre d'étudiants acceptés sur ses
    /// stages. Recalculés à chaque lecture depuis les tables enfants.
    pub async fn establishment_with_counts(
        db: &DatabaseConnection,
        auth: &AuthUser,
        establishment_id: i32,
    ) -> Result<EstablishmentWithCounts, ServiceError> {
        auth.require(Role::Admin)?;

        let establishment = establishments::Entity::find_by_id(establishment_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Establishment"))?;

        let departments_count = departments::Entity::find()
            .filter(departments::Column::EstablishmentId.eq(establishment_id))
            .count(db)
            .await?;

        let students_count = applications::Entity::find()
            .join(JoinType::InnerJoin, applications::Relation::Internship.def())
            .filter(internships::Column::EstablishmentId.eq(establishment_id))
            .filter(applications::Column::Status.eq(ApplicationStatus::Accepted))
            .count(db)
            .await?;

        Ok(EstablishmentWithCounts {
            establishment,
            departments_count,
            students_count,
        })
    }

    // -----------------------------------------------------------------------
    // Comptes personnel
    // -----------------------------------------------------------------------

    pub async fn create_personnel(
        db: &DatabaseConnection,
        auth: &AuthUser,
        request: CreatePersonnelRequest,
    ) -> Result<personnel::Model, ServiceError> {
        auth.require(Role::Admin)?;

        let password_hash = password::hash_password(&request.password)
            .map_err(|e| ServiceError::Database(DbErr::Custom(e)))?;

        let new_personnel = personnel::ActiveModel {
            email: Set(request.email),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            role: Set(request.role),
            phone: Set(request.phone),
            establishment_id: Set(request.establishment_id),
            department_id: Set(request.department_id),
            password_hash: Set(Some(password_hash)),
            is_active: Set(true),
            ..Default::default()
        };

        Ok(new_personnel.insert(db).await?)
    }

    pub async fn update_personnel(
        db: &DatabaseConnection,
        auth: &AuthUser,
        personnel_id: i32,
        request: UpdatePersonnelRequest,
    ) -> Result<personnel::Model, ServiceError> {
        auth.require(Role::Admin)?;

        let member = personnel::Entity::find_by_id(personnel_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Personnel"))?;

        let mut active: personnel::ActiveModel = member.into();
        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(establishment_id) = request.establishment_id {
            active.establishment_id = Set(Some(establishment_id));
        }
        if let Some(department_id) = request.department_id {
            active.department_id = Set(Some(department_id));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        Ok(active.update(db).await?)
    }

    pub async fn delete_personnel(
        db: &DatabaseConnection,
        auth: &AuthUser,
        personnel_id: i32,
    ) -> Result<(), ServiceError> {
        auth.require(Role::Admin)?;

        let result = personnel::Entity::delete_by_id(personnel_id).exec(db).await?;

        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound("Personnel"));
        }

        Ok(())
    }

    // -----------------------------------------------------------------------
    // Comptes étudiants
    // -----------------------------------------------------------------------

    pub async fn create_student(
        db: &DatabaseConnection,
        auth: &AuthUser,
        request: CreateStudentRequest,
    ) -> Result<students::Model, ServiceError> {
        auth.require(Role::Admin)?;

        let password_hash = password::hash_password(&request.password)
            .map_err(|e| ServiceError::Database(DbErr::Custom(e)))?;

        let new_student = students::ActiveModel {
            matricule: Set(request.matricule),
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            email: Set(request.email),
            phone: Set(request.phone),
            level: Set(request.level),
            specialty: Set(request.specialty),
            password_hash: Set(Some(password_hash)),
            is_active: Set(true),
            registration_date: Set(Utc::now()),
            ..Default::default()
        };

        Ok(new_student.insert(db).await?)
    }

    // -----------------------------------------------------------------------
    // Tableau de bord
    // -----------------------------------------------------------------------

    pub async fn dashboard_stats(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<DashboardStats, ServiceError> {
        auth.require(Role::Admin)?;

        let total_students = students::Entity::find().count(db).await?;
        let total_personnel = personnel::Entity::find().count(db).await?;
        let total_establishments = establishments::Entity::find().count(db).await?;
        let active_internships = internships::Entity::find()
            .filter(internships::Column::Status.eq(InternshipStatus::Actif))
            .count(db)
            .await?;
        let pending_applications = applications::Entity::find()
            .filter(applications::Column::Status.eq(ApplicationStatus::Pending))
            .count(db)
            .await?;
        let validated_evaluations = evaluations::Entity::find()
            .filter(evaluations::Column::Status.eq(EvaluationStatus::Validated))
            .count(db)
            .await?;

        Ok(DashboardStats {
            total_students,
            total_personnel,
            total_establishments,
            active_internships,
            pending_applications,
            validated_evaluations,
        })
    }
}
