use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Cycle de vie d'une candidature:
/// PENDING → ACCEPTED | REJECTED | WITHDRAWN, et ACCEPTED → WITHDRAWN
/// (l'étudiant peut se désister d'un stage déjà accepté, la place est
/// alors libérée). Aucune réouverture possible.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    #[sea_orm(string_value = "PENDING")]
    Pending,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "WITHDRAWN")]
    Withdrawn,
}

impl ApplicationStatus {
    /// accept() et reject() ne sont valides que depuis PENDING
    pub fn can_review(&self) -> bool {
        matches!(self, ApplicationStatus::Pending)
    }

    /// withdraw() est valide depuis PENDING ou ACCEPTED
    pub fn can_withdraw(&self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Accepted)
    }

    /// Une candidature PENDING ou ACCEPTED bloque une nouvelle candidature
    /// du même étudiant sur le même stage (contrainte anti-doublon)
    pub fn blocks_duplicate(&self) -> bool {
        matches!(self, ApplicationStatus::Pending | ApplicationStatus::Accepted)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "applications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub student_id: i32,
    pub internship_id: i32,
    pub status: ApplicationStatus,
    pub motivation_letter: Option<String>,
    pub rejection_reason: Option<String>,
    pub applied_at: DateTimeUtc,
    pub reviewed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
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

    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
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

impl Related<super::evaluations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Evaluations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_pending_can_be_reviewed() {
        assert!(ApplicationStatus::Pending.can_review());
        assert!(!ApplicationStatus::Accepted.can_review());
        assert!(!ApplicationStatus::Rejected.can_review());
        assert!(!ApplicationStatus::Withdrawn.can_review());
    }

    #[test]
    fn test_withdraw_from_pending_or_accepted() {
        assert!(ApplicationStatus::Pending.can_withdraw());
        assert!(ApplicationStatus::Accepted.can_withdraw());
        assert!(!ApplicationStatus::Rejected.can_withdraw());
        assert!(!ApplicationStatus::Withdrawn.can_withdraw());
    }

    #[test]
    fn test_duplicate_blocking_states() {
        assert!(ApplicationStatus::Pending.blocks_duplicate());
        assert!(ApplicationStatus::Accepted.blocks_duplicate());
        assert!(!ApplicationStatus::Rejected.blocks_duplicate());
        assert!(!ApplicationStatus::Withdrawn.blocks_duplicate());
    }
}
