use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::Utc;

use crate::middleware::AuthUser;
use crate::models::applications::{self, ApplicationStatus};
use crate::models::dto::SubmitApplicationRequest;
use crate::models::evaluations::{self, EvaluationStatus};
use crate::models::internships::{self, InternshipStatus};
use crate::models::notifications::NotificationType;
use crate::models::personnel::Role;
use crate::services::capacity;
use crate::services::error::ServiceError;
use crate::services::notification_service::NotificationService;

/// Machine à états des candidatures:
/// PENDING → ACCEPTED | REJECTED | WITHDRAWN, ACCEPTED → WITHDRAWN.
///
/// Chaque transition mutante (accept/reject/withdraw) est une transaction
/// unique: changement de statut + mise à jour des places + notification
/// s'appliquent tous ou aucun.
pub struct ApplicationService;

impl ApplicationService {
    /// Dépôt d'une candidature par un étudiant.
    /// Ne touche PAS aux places: filled_places n'est incrémenté qu'à
    /// l'acceptation par le chef.
    pub async fn submit(
        db: &DatabaseConnection,
        auth: &AuthUser,
        request: SubmitApplicationRequest,
    ) -> Result<applications::Model, ServiceError> {
        auth.require(Role::Student)?;

        // 1. Le stage doit exister, être Actif et avoir une place libre
        let internship = internships::Entity::find_by_id(request.internship_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        if !internship.status.accepts_applications()
            || !capacity::has_open_seat(internship.total_places, internship.filled_places)
        {
            return Err(ServiceError::CapacityExceeded);
        }

        // 2. Anti-doublon: une candidature encore vivante (PENDING/ACCEPTED)
        //    du même étudiant sur le même stage bloque un nouveau dépôt
        let has_blocking = applications::Entity::find()
            .filter(applications::Column::StudentId.eq(auth.user_id))
            .filter(applications::Column::InternshipId.eq(request.internship_id))
            .all(db)
            .await?
            .iter()
            .any(|application| application.status.blocks_duplicate());

        if has_blocking {
            return Err(ServiceError::DuplicateApplication);
        }

        // 3. Créer la candidature en PENDING
        let new_application = applications::ActiveModel {
            student_id: Set(auth.user_id),
            internship_id: Set(request.internship_id),
            status: Set(ApplicationStatus::Pending),
            motivation_letter: Set(request.motivation_letter),
            rejection_reason: Set(None),
            applied_at: Set(Utc::now()),
            reviewed_at: Set(None),
            ..Default::default()
        };

        Ok(new_application.insert(db).await?)
    }

    /// Acceptation par le chef de service qui a publié l'offre.
    /// La capacité est revérifiée ICI par un incrément conditionnel
    /// (rows_affected == 0 ⇒ CapacityExceeded): plusieurs candidatures
    /// PENDING peuvent viser la dernière place, une seule doit passer.
    pub async fn accept(
        db: &DatabaseConnection,
        auth: &AuthUser,
        application_id: i32,
    ) -> Result<applications::Model, ServiceError> {
        auth.require(Role::Chief)?;

        let txn = db.begin().await?;
        match Self::accept_in_txn(&txn, auth, application_id).await {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn accept_in_txn(
        txn: &DatabaseTransaction,
        auth: &AuthUser,
        application_id: i32,
    ) -> Result<applications::Model, ServiceError> {
        // 1. Charger la candidature et son stage
        let application = applications::Entity::find_by_id(application_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Application"))?;

        let internship = internships::Entity::find_by_id(application.internship_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        // 2. Scope: seul le chef qui a publié l'offre tranche ses candidatures
        if internship.created_by != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "only the chief who published this internship can review its applications"
                    .to_string(),
            ));
        }

        // 3. Transition valide uniquement depuis PENDING (pré-vérification,
        //    la garantie réelle est la bascule conditionnelle ci-dessous)
        if !application.status.can_review() {
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: application.status.to_value(),
                action: "accept",
            });
        }

        // 4. Bascule conditionnelle PENDING → ACCEPTED: le statut lu à
        //    l'étape 1 peut être périmé (double-clic, deux onglets), seule
        //    la ligne encore PENDING au moment de l'écriture est prise
        let claim = applications::Entity::update_many()
            .col_expr(
                applications::Column::Status,
                Expr::value(ApplicationStatus::Accepted),
            )
            .col_expr(applications::Column::ReviewedAt, Expr::value(Utc::now()))
            .filter(applications::Column::Id.eq(application.id))
            .filter(applications::Column::Status.eq(ApplicationStatus::Pending))
            .exec(txn)
            .await?;

        if claim.rows_affected == 0 {
            let current = applications::Entity::find_by_id(application.id)
                .one(txn)
                .await?
                .ok_or(ServiceError::NotFound("Application"))?;
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: current.status.to_value(),
                action: "accept",
            });
        }

        // 5. Incrément conditionnel des places (le check-then-increment doit
        //    être une seule écriture atomique, jamais un read-then-write)
        let update = internships::Entity::update_many()
            .col_expr(
                internships::Column::FilledPlaces,
                Expr::col(internships::Column::FilledPlaces).add(1),
            )
            .filter(internships::Column::Id.eq(internship.id))
            .filter(
                Expr::col(internships::Column::FilledPlaces)
                    .lt(Expr::col(internships::Column::TotalPlaces)),
            )
            .exec(txn)
            .await?;

        if update.rows_affected == 0 {
            return Err(ServiceError::CapacityExceeded);
        }

        // 6. Auto-statut: 'Complet' si la dernière place vient d'être prise
        let refreshed = internships::Entity::find_by_id(internship.id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        if refreshed.status == InternshipStatus::Actif {
            let auto_status =
                capacity::status_after_fill(refreshed.total_places, refreshed.filled_places);
            if auto_status != refreshed.status {
                let mut active: internships::ActiveModel = refreshed.into();
                active.status = Set(auto_status);
                active.update(txn).await?;
            }
        }

        // 7. Relire la candidature acceptée
        let student_id = application.student_id;
        let accepted = applications::Entity::find_by_id(application.id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Application"))?;

        // 8. Créer l'évaluation PENDING pour le médecin encadrant du stage
        let new_evaluation = evaluations::ActiveModel {
            application_id: Set(accepted.id),
            student_id: Set(student_id),
            internship_id: Set(internship.id),
            doctor_id: Set(internship.supervisor_id),
            status: Set(EvaluationStatus::Pending),
            score: Set(None),
            comments: Set(None),
            created_at: Set(Utc::now()),
            submission_date: Set(None),
            validated_at: Set(None),
            ..Default::default()
        };
        new_evaluation.insert(txn).await?;

        // 9. Notifier l'étudiant
        NotificationService::emit(
            txn,
            Role::Student,
            student_id,
            NotificationType::Success,
            "Candidature acceptée",
            &format!("Votre candidature au stage « {} » a été acceptée.", internship.title),
            Some(("application", accepted.id)),
        )
        .await?;

        Ok(accepted)
    }

    /// Refus par le chef de service. Aucun effet sur les places.
    pub async fn reject(
        db: &DatabaseConnection,
        auth: &AuthUser,
        application_id: i32,
        reason: Option<String>,
    ) -> Result<applications::Model, ServiceError> {
        auth.require(Role::Chief)?;

        let txn = db.begin().await?;
        match Self::reject_in_txn(&txn, auth, application_id, reason).await {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn reject_in_txn(
        txn: &DatabaseTransaction,
        auth: &AuthUser,
        application_id: i32,
        reason: Option<String>,
    ) -> Result<applications::Model, ServiceError> {
        let application = applications::Entity::find_by_id(application_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Application"))?;

        let internship = internships::Entity::find_by_id(application.internship_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        if internship.created_by != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "only the chief who published this internship can review its applications"
                    .to_string(),
            ));
        }

        if !application.status.can_review() {
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: application.status.to_value(),
                action: "reject",
            });
        }

        // Bascule conditionnelle PENDING → REJECTED: ne touche que la ligne
        // encore PENDING au moment de l'écriture
        let claim = applications::Entity::update_many()
            .col_expr(
                applications::Column::Status,
                Expr::value(ApplicationStatus::Rejected),
            )
            .col_expr(applications::Column::RejectionReason, Expr::value(reason))
            .col_expr(applications::Column::ReviewedAt, Expr::value(Utc::now()))
            .filter(applications::Column::Id.eq(application.id))
            .filter(applications::Column::Status.eq(ApplicationStatus::Pending))
            .exec(txn)
            .await?;

        if claim.rows_affected == 0 {
            let current = applications::Entity::find_by_id(application.id)
                .one(txn)
                .await?
                .ok_or(ServiceError::NotFound("Application"))?;
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: current.status.to_value(),
                action: "reject",
            });
        }

        let student_id = application.student_id;
        let rejected = applications::Entity::find_by_id(application.id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Application"))?;

        NotificationService::emit(
            txn,
            Role::Student,
            student_id,
            NotificationType::Warning,
            "Candidature refusée",
            &format!("Votre candidature au stage « {} » a été refusée.", internship.title),
            Some(("application", rejected.id)),
        )
        .await?;

        Ok(rejected)
    }

    /// Désistement par l'étudiant, depuis PENDING ou ACCEPTED.
    /// Depuis ACCEPTED la place est libérée et un stage 'Complet' redevient
    /// 'Actif'. Le chef est notifié dans les deux cas.
    pub async fn withdraw(
        db: &DatabaseConnection,
        auth: &AuthUser,
        application_id: i32,
    ) -> Result<applications::Model, ServiceError> {
        auth.require(Role::Student)?;

        let txn = db.begin().await?;
        match Self::withdraw_in_txn(&txn, auth, application_id).await {
            Ok(model) => {
                txn.commit().await?;
                Ok(model)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn withdraw_in_txn(
        txn: &DatabaseTransaction,
        auth: &AuthUser,
        application_id: i32,
    ) -> Result<applications::Model, ServiceError> {
        let application = applications::Entity::find_by_id(application_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Application"))?;

        if application.student_id != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "application belongs to another student".to_string(),
            ));
        }

        let internship = internships::Entity::find_by_id(application.internship_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        if !application.status.can_withdraw() {
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: application.status.to_value(),
                action: "withdraw",
            });
        }

        let releases_seat = application.status == ApplicationStatus::Accepted;

        // Bascule conditionnelle vers WITHDRAWN, filtrée sur le statut lu:
        // si un second désistement (ou une décision du chef) est passé entre
        // temps, rows_affected vaut 0 et rien n'est libéré deux fois
        let claim = applications::Entity::update_many()
            .col_expr(
                applications::Column::Status,
                Expr::value(ApplicationStatus::Withdrawn),
            )
            .filter(applications::Column::Id.eq(application.id))
            .filter(applications::Column::Status.eq(application.status.clone()))
            .exec(txn)
            .await?;

        if claim.rows_affected == 0 {
            let current = applications::Entity::find_by_id(application.id)
                .one(txn)
                .await?
                .ok_or(ServiceError::NotFound("Application"))?;
            return Err(ServiceError::InvalidTransition {
                entity: "application",
                from: current.status.to_value(),
                action: "withdraw",
            });
        }

        let withdrawn = applications::Entity::find_by_id(application.id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Application"))?;

        if releases_seat {
            // Décrément conditionnel: ne passe jamais sous zéro
            let update = internships::Entity::update_many()
                .col_expr(
                    internships::Column::FilledPlaces,
                    Expr::col(internships::Column::FilledPlaces).sub(1),
                )
                .filter(internships::Column::Id.eq(internship.id))
                .filter(Expr::col(internships::Column::FilledPlaces).gt(0))
                .exec(txn)
                .await?;

            if update.rows_affected == 0 {
                return Err(ServiceError::Database(DbErr::Custom(format!(
                    "filled_places underflow prevented on internship {}",
                    internship.id
                ))));
            }

            // Auto-statut: 'Complet' redevient 'Actif'
            let refreshed = internships::Entity::find_by_id(internship.id)
                .one(txn)
                .await?
                .ok_or(ServiceError::NotFound("Internship"))?;

            let auto_status = capacity::status_after_release(
                refreshed.status.clone(),
                refreshed.total_places,
                refreshed.filled_places,
            );
            if auto_status != refreshed.status {
                let mut active: internships::ActiveModel = refreshed.into();
                active.status = Set(auto_status);
                active.update(txn).await?;
            }
        }

        NotificationService::emit(
            txn,
            Role::Chief,
            internship.created_by,
            NotificationType::Info,
            "Désistement d'un étudiant",
            &format!(
                "{} s'est désisté(e) du stage « {} ».",
                auth.display_name, internship.title
            ),
            Some(("application", withdrawn.id)),
        )
        .await?;

        Ok(withdrawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn chief() -> AuthUser {
        AuthUser {
            user_id: 11,
            role: Role::Chief,
            display_name: "Karim Meziane".to_string(),
        }
    }

    fn student() -> AuthUser {
        AuthUser {
            user_id: 7,
            role: Role::Student,
            display_name: "Amina Benali".to_string(),
        }
    }

    fn application(status: ApplicationStatus) -> applications::Model {
        applications::Model {
            id: 42,
            student_id: 7,
            internship_id: 5,
            status,
            motivation_letter: None,
            rejection_reason: None,
            applied_at: Utc::now(),
            reviewed_at: None,
        }
    }

    fn internship(filled_places: i32, total_places: i32) -> internships::Model {
        internships::Model {
            id: 5,
            department_id: 1,
            establishment_id: 1,
            title: "Stage de cardiologie".to_string(),
            description: "Six semaines en service de cardiologie".to_string(),
            total_places,
            filled_places,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            required_level: None,
            requirements: None,
            status: InternshipStatus::Actif,
            created_by: 11,
            supervisor_id: 21,
            created_at: Utc::now(),
        }
    }

    // Deux acceptations de la même candidature (double-clic): la lecture
    // initiale voit encore PENDING mais la bascule conditionnelle ne touche
    // aucune ligne. La transaction échoue au lieu d'incrémenter les places
    // une deuxième fois et de créer une évaluation en double.
    #[tokio::test]
    async fn test_accept_already_decided_application_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![application(ApplicationStatus::Pending)]])
            .append_query_results([vec![internship(1, 3)]])
            .append_query_results([vec![application(ApplicationStatus::Accepted)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = ApplicationService::accept(&db, &chief(), 42)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                entity: "application",
                action: "accept",
                ..
            }
        ));
    }

    // La bascule de statut passe mais le stage est plein: l'incrément
    // conditionnel ne touche aucune ligne et toute la transaction (statut
    // compris) est annulée.
    #[tokio::test]
    async fn test_accept_full_internship_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![application(ApplicationStatus::Pending)]])
            .append_query_results([vec![internship(3, 3)]])
            .append_exec_results([
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                },
                MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                },
            ])
            .into_connection();

        let err = ApplicationService::accept(&db, &chief(), 42)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::CapacityExceeded));
    }

    // Deux désistements de la même candidature ACCEPTED: le second ne
    // libère pas de place une deuxième fois.
    #[tokio::test]
    async fn test_withdraw_already_withdrawn_is_refused() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![application(ApplicationStatus::Accepted)]])
            .append_query_results([vec![internship(1, 3)]])
            .append_query_results([vec![application(ApplicationStatus::Withdrawn)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let err = ApplicationService::withdraw(&db, &student(), 42)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                entity: "application",
                action: "withdraw",
                ..
            }
        ));
    }

    // Une candidature PENDING existante sur le même stage bloque le dépôt
    #[tokio::test]
    async fn test_submit_with_live_application_is_a_duplicate() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![internship(1, 3)]])
            .append_query_results([vec![application(ApplicationStatus::Pending)]])
            .into_connection();

        let request = SubmitApplicationRequest {
            internship_id: 5,
            motivation_letter: None,
        };
        let err = ApplicationService::submit(&db, &student(), request)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateApplication));
    }

    // Une candidature REJECTED dans l'historique ne bloque pas un nouveau
    // dépôt sur le même stage
    #[tokio::test]
    async fn test_resubmit_after_rejection_is_allowed() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![internship(1, 3)]])
            .append_query_results([vec![application(ApplicationStatus::Rejected)]])
            .append_query_results([vec![application(ApplicationStatus::Pending)]])
            .into_connection();

        let request = SubmitApplicationRequest {
            internship_id: 5,
            motivation_letter: None,
        };
        let created = ApplicationService::submit(&db, &student(), request)
            .await
            .unwrap();
        assert_eq!(created.status, ApplicationStatus::Pending);
    }
}
