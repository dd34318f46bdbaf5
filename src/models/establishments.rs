use serde::{Serialize, Deserialize};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EstablishmentType {
    #[sea_orm(string_value = "CHU")]
    #[serde(rename = "CHU")]
    Chu,
    #[sea_orm(string_value = "Hôpital")]
    #[serde(rename = "Hôpital")]
    Hopital,
    #[sea_orm(string_value = "Clinique")]
    Clinique,
    #[sea_orm(string_value = "Polyclinique")]
    Polyclinique,
}

// Les compteurs (nb de services, nb d'étudiants) ne sont pas des colonnes :
// ils sont dérivés des tables departments/applications en lecture.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "establishments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub city: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[sea_orm(column_name = "type")]
    #[serde(rename = "type")]
    pub establishment_type: EstablishmentType,
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::departments::Entity")]
    Departments,

    #[sea_orm(has_many = "super::internships::Entity")]
    Internships,

    #[sea_orm(has_many = "super::personnel::Entity")]
    Personnel,
}

impl Related<super::departments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Departments.def()
    }
}

impl Related<super::internships::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Internships.def()
    }
}

impl Related<super::personnel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Personnel.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
