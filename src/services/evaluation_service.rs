use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::middleware::AuthUser;
use crate::models::dto::{AttestationRequest, SubmitEvaluationRequest};
use crate::models::evaluations::{self, EvaluationStatus};
use crate::models::internships;
use crate::models::notifications::NotificationType;
use crate::models::personnel::{self, Role};
use crate::services::error::ServiceError;
use crate::services::notification_service::NotificationService;

/// Machine à états des évaluations: PENDING → SUBMITTED → VALIDATED.
/// Le médecin encadrant soumet (et peut resoumettre tant que le chef n'a
/// pas validé), le chef de service valide, la validation déclenche la
/// demande d'attestation.
pub struct EvaluationService;

/// Note sur 20: bornes [0, 20], les demi-points sont permis (ex: 16.5)
pub fn validate_score(score: Decimal) -> Result<(), ServiceError> {
    if score < Decimal::ZERO || score > Decimal::from(20) {
        return Err(ServiceError::InvalidScore(score));
    }
    Ok(())
}

impl EvaluationService {
    /// Soumission de la note et du commentaire par le médecin encadrant
    pub async fn submit(
        db: &DatabaseConnection,
        auth: &AuthUser,
        evaluation_id: i32,
        request: SubmitEvaluationRequest,
    ) -> Result<evaluations::Model, ServiceError> {
        auth.require(Role::Doctor)?;
        validate_score(request.score)?;

        let txn = db.begin().await?;
        match Self::submit_in_txn(&txn, auth, evaluation_id, request).await {
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

    async fn submit_in_txn(
        txn: &DatabaseTransaction,
        auth: &AuthUser,
        evaluation_id: i32,
        request: SubmitEvaluationRequest,
    ) -> Result<evaluations::Model, ServiceError> {
        let evaluation = evaluations::Entity::find_by_id(evaluation_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Evaluation"))?;

        // Seul le médecin désigné à l'acceptation peut évaluer ce stagiaire
        if evaluation.doctor_id != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "evaluation is assigned to another doctor".to_string(),
            ));
        }

        if !evaluation.status.can_submit() {
            return Err(ServiceError::InvalidTransition {
                entity: "evaluation",
                from: evaluation.status.to_value(),
                action: "submit",
            });
        }

        let internship = internships::Entity::find_by_id(evaluation.internship_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        // Écriture conditionnelle: seule une ligne encore PENDING/SUBMITTED
        // au moment de l'écriture est soumise, une validation passée entre
        // temps ne peut pas être écrasée
        let claim = evaluations::Entity::update_many()
            .col_expr(
                evaluations::Column::Status,
                Expr::value(EvaluationStatus::Submitted),
            )
            .col_expr(evaluations::Column::Score, Expr::value(Some(request.score)))
            .col_expr(evaluations::Column::Comments, Expr::value(request.comments))
            .col_expr(evaluations::Column::SubmissionDate, Expr::value(Utc::now()))
            .filter(evaluations::Column::Id.eq(evaluation.id))
            .filter(evaluations::Column::Status.is_in([
                EvaluationStatus::Pending,
                EvaluationStatus::Submitted,
            ]))
            .exec(txn)
            .await?;

        if claim.rows_affected == 0 {
            let current = evaluations::Entity::find_by_id(evaluation.id)
                .one(txn)
                .await?
                .ok_or(ServiceError::NotFound("Evaluation"))?;
            return Err(ServiceError::InvalidTransition {
                entity: "evaluation",
                from: current.status.to_value(),
                action: "submit",
            });
        }

        let submitted = evaluations::Entity::find_by_id(evaluation.id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Evaluation"))?;

        // Le chef qui a publié le stage est chargé de la validation
        NotificationService::emit(
            txn,
            Role::Chief,
            internship.created_by,
            NotificationType::Info,
            "Évaluation soumise",
            &format!(
                "{} a soumis une évaluation pour le stage « {} ».",
                auth.display_name, internship.title
            ),
            Some(("evaluation", submitted.id)),
        )
        .await?;

        Ok(submitted)
    }

    /// Validation par le chef de service. Déclenche la demande d'attestation
    /// vers le service de rendu de documents (collaborateur externe) et
    /// notifie l'étudiant.
    pub async fn validate(
        db: &DatabaseConnection,
        auth: &AuthUser,
        evaluation_id: i32,
    ) -> Result<(evaluations::Model, AttestationRequest), ServiceError> {
        auth.require(Role::Chief)?;

        let txn = db.begin().await?;
        match Self::validate_in_txn(&txn, auth, evaluation_id).await {
            Ok(result) => {
                txn.commit().await?;
                Ok(result)
            }
            Err(e) => {
                txn.rollback().await?;
                Err(e)
            }
        }
    }

    async fn validate_in_txn(
        txn: &DatabaseTransaction,
        auth: &AuthUser,
        evaluation_id: i32,
    ) -> Result<(evaluations::Model, AttestationRequest), ServiceError> {
        let evaluation = evaluations::Entity::find_by_id(evaluation_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Evaluation"))?;

        let internship = internships::Entity::find_by_id(evaluation.internship_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        if internship.created_by != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "only the chief who published this internship can validate its evaluations"
                    .to_string(),
            ));
        }

        if !evaluation.status.can_validate() {
            return Err(ServiceError::InvalidTransition {
                entity: "evaluation",
                from: evaluation.status.to_value(),
                action: "validate",
            });
        }

        let supervisor = personnel::Entity::find_by_id(evaluation.doctor_id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Supervisor"))?;

        // Écriture conditionnelle SUBMITTED → VALIDATED: deux validations
        // simultanées ne peuvent pas émettre deux demandes d'attestation
        let claim = evaluations::Entity::update_many()
            .col_expr(
                evaluations::Column::Status,
                Expr::value(EvaluationStatus::Validated),
            )
            .col_expr(evaluations::Column::ValidatedAt, Expr::value(Utc::now()))
            .filter(evaluations::Column::Id.eq(evaluation.id))
            .filter(evaluations::Column::Status.eq(EvaluationStatus::Submitted))
            .exec(txn)
            .await?;

        if claim.rows_affected == 0 {
            let current = evaluations::Entity::find_by_id(evaluation.id)
                .one(txn)
                .await?
                .ok_or(ServiceError::NotFound("Evaluation"))?;
            return Err(ServiceError::InvalidTransition {
                entity: "evaluation",
                from: current.status.to_value(),
                action: "validate",
            });
        }

        let validated = evaluations::Entity::find_by_id(evaluation.id)
            .one(txn)
            .await?
            .ok_or(ServiceError::NotFound("Evaluation"))?;

        // Demande d'attestation: la référence d'artefact est générée ici,
        // le rendu PDF est fait par le service externe
        let attestation = AttestationRequest {
            artifact_ref: Uuid::new_v4(),
            student_id: validated.student_id,
            internship_id: validated.internship_id,
            score: validated.score.unwrap_or(Decimal::ZERO),
            comments: validated.comments.clone(),
            supervisor_name: supervisor.display_name(),
        };

        NotificationService::emit(
            txn,
            Role::Student,
            validated.student_id,
            NotificationType::Success,
            "Attestation disponible",
            &format!(
                "Votre évaluation du stage « {} » a été validée. Votre attestation est en cours de génération.",
                internship.title
            ),
            Some(("evaluation", validated.id)),
        )
        .await?;

        Ok((validated, attestation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::str::FromStr;

    #[test]
    fn test_half_point_scores_are_valid() {
        assert!(validate_score(Decimal::from_str("16.5").unwrap()).is_ok());
        assert!(validate_score(Decimal::ZERO).is_ok());
        assert!(validate_score(Decimal::from(20)).is_ok());
    }

    #[test]
    fn test_out_of_bounds_scores_rejected() {
        assert!(matches!(
            validate_score(Decimal::from(21)),
            Err(ServiceError::InvalidScore(_))
        ));
        assert!(matches!(
            validate_score(Decimal::from_str("-0.5").unwrap()),
            Err(ServiceError::InvalidScore(_))
        ));
        assert!(matches!(
            validate_score(Decimal::from_str("20.01").unwrap()),
            Err(ServiceError::InvalidScore(_))
        ));
    }

    fn evaluation(status: EvaluationStatus) -> evaluations::Model {
        evaluations::Model {
            id: 9,
            application_id: 42,
            student_id: 7,
            internship_id: 5,
            doctor_id: 21,
            status,
            score: Some(Decimal::from(16)),
            comments: None,
            created_at: Utc::now(),
            submission_date: Some(Utc::now()),
            validated_at: None,
        }
    }

    // Deux validations de la même évaluation: la lecture initiale voit
    // encore SUBMITTED mais l'écriture conditionnelle ne touche aucune
    // ligne. Aucune seconde demande d'attestation n'est émise.
    #[tokio::test]
    async fn test_validate_already_validated_evaluation_is_refused() {
        let internship = internships::Model {
            id: 5,
            department_id: 1,
            establishment_id: 1,
            title: "Stage de cardiologie".to_string(),
            description: "Six semaines en service de cardiologie".to_string(),
            total_places: 3,
            filled_places: 1,
            start_date: NaiveDate::from_ymd_opt(2026, 9, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            required_level: None,
            requirements: None,
            status: crate::models::internships::InternshipStatus::Actif,
            created_by: 11,
            supervisor_id: 21,
            created_at: Utc::now(),
        };
        let supervisor = personnel::Model {
            id: 21,
            email: "s.hamidi@chu.dz".to_string(),
            first_name: "Samir".to_string(),
            last_name: "Hamidi".to_string(),
            role: Role::Doctor,
            phone: None,
            establishment_id: Some(1),
            department_id: Some(1),
            password_hash: None,
            is_active: true,
        };

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![evaluation(EvaluationStatus::Submitted)]])
            .append_query_results([vec![internship]])
            .append_query_results([vec![supervisor]])
            .append_query_results([vec![evaluation(EvaluationStatus::Validated)]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let chief = AuthUser {
            user_id: 11,
            role: Role::Chief,
            display_name: "Karim Meziane".to_string(),
        };
        let err = EvaluationService::validate(&db, &chief, 9).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::InvalidTransition {
                entity: "evaluation",
                action: "validate",
                ..
            }
        ));
    }
}
