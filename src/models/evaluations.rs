use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Cycle de vie d'une évaluation: PENDING → SUBMITTED → VALIDATED.
/// Aucun saut d'état, aucun retour en arrière. Une note erronée se corrige
/// en resoumettant AVANT la validation du chef, jamais après.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum EvaluationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "SUBMITTED")]
    Submitted,
    #[sea_orm(string_value = "VALIDATED")]
    Validated,
}

impl EvaluationStatus {
    /// Soumission (et resoumission corrective) possible tant que le chef
    /// n'a pas validé
    pub fn can_submit(&self) -> bool {
        matches!(self, EvaluationStatus::Pending | EvaluationStatus::Submitted)
    }

    /// Validation uniquement depuis SUBMITTED
    pub fn can_validate(&self) -> bool {
        matches!(self, EvaluationStatus::Submitted)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evaluations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub application_id: i32,
    pub student_id: i32,
    pub internship_id: i32,
    pub doctor_id: i32, // Médecin encadrant désigné à l'acceptation
    pub status: EvaluationStatus,
    pub score: Option<Decimal>, // Note sur 20, renseignée à la soumission
    pub comments: Option<String>,
    pub created_at: DateTimeUtc,
    pub submission_date: Option<DateTimeUtc>,
    pub validated_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::applications::Entity",
        from = "Column::ApplicationId",
        to = "super::applications::Column::Id"
    )]
    Application,

    #[sea_orm(
        belongs_to = "super::students::Entity",
        from = "Column::StudentId",
        to = "super::students::Column::Id"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::internships::Entity",
        from = "Column::InternshipId",
        to = "super::internships::Column::Id"
    )]
    Internship,

    #[sea_orm(
        belongs_to = "super::personnel::Entity",
        from = "Column::DoctorId",
        to = "super::personnel::Column::Id"
    )]
    Doctor,
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Application.def()
    }
}

impl Related<super::students::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::internships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Internship.def()
    }
}

impl Related<super::personnel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Doctor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_allowed_before_validation() {
        assert!(EvaluationStatus::Pending.can_submit());
        assert!(EvaluationStatus::Submitted.can_submit());
        assert!(!EvaluationStatus::Validated.can_submit());
    }

    #[test]
    fn test_validate_only_from_submitted() {
        assert!(!EvaluationStatus::Pending.can_validate());
        assert!(EvaluationStatus::Submitted.can_validate());
        assert!(!EvaluationStatus::Validated.can_validate());
    }
}
