use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

/// Statut d'une offre de stage.
/// 'Complet' est automatique : posé quand filled_places atteint total_places,
/// retiré quand une place se libère (désistement). 'Archivé' et 'Clôturé'
/// sont posés par le chef de service et sont définitifs.
#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum InternshipStatus {
    #[sea_orm(string_value = "Actif")]
    Actif,
    #[sea_orm(string_value = "Complet")]
    Complet,
    #[sea_orm(string_value = "Archivé")]
    #[serde(rename = "Archivé")]
    Archive,
    #[sea_orm(string_value = "Clôturé")]
    #[serde(rename = "Clôturé")]
    Cloture,
}

impl InternshipStatus {
    /// Seul un stage Actif accepte de nouvelles candidatures
    pub fn accepts_applications(&self) -> bool {
        matches!(self, InternshipStatus::Actif)
    }

    /// Le chef peut clôturer un stage Actif ou Complet, pas un stage archivé
    pub fn can_close(&self) -> bool {
        matches!(self, InternshipStatus::Actif | InternshipStatus::Complet)
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "internships")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub department_id: i32,
    pub establishment_id: i32,
    pub title: String,
    pub description: String,
    pub total_places: i32,
    // Invariant: 0 <= filled_places <= total_places, et filled_places est
    // toujours égal au nombre de candidatures ACCEPTED. Modifié uniquement
    // par les transitions accept/withdraw (jamais d'écriture directe).
    pub filled_places: i32,
    pub start_date: Date,
    pub end_date: Date,
    pub required_level: Option<String>, // Niveau minimal exigé, NULL = tous niveaux
    pub requirements: Option<String>,
    pub status: InternshipStatus,
    pub created_by: i32,    // Chef de service qui a publié l'offre
    pub supervisor_id: i32, // Médecin encadrant qui évaluera les stagiaires
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::departments::Entity",
        from = "Column::DepartmentId",
        to = "super::departments::Column::Id"
    )]
    Department,

    #[sea_orm(
        belongs_to = "super::establishments::Entity",
        from = "Column::EstablishmentId",
        to = "super::establishments::Column::Id"
    )]
    Establishment,

    #[sea_orm(has_many = "super::applications::Entity")]
    Applications,

    #[sea_orm(has_many = "super::evaluations::Entity")]
    Evaluations,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl Related<super::establishments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Establishment.def()
    }
}

impl Related<super::applications::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
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
    fn test_only_actif_accepts_applications() {
        assert!(InternshipStatus::Actif.accepts_applications());
        assert!(!InternshipStatus::Complet.accepts_applications());
        assert!(!InternshipStatus::Archive.accepts_applications());
        assert!(!InternshipStatus::Cloture.accepts_applications());
    }

    #[test]
    fn test_can_close() {
        assert!(InternshipStatus::Actif.can_close());
        assert!(InternshipStatus::Complet.can_close());
        assert!(!InternshipStatus::Archive.can_close());
        assert!(!InternshipStatus::Cloture.can_close());
    }
}
