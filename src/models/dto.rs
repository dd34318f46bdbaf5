// Data Transfer Objects : requêtes entrantes (validées avec validator)
// et réponses structurées de l'API.
use serde::{Serialize, Deserialize};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use uuid::Uuid;
use validator::Validate;

use super::applications::ApplicationStatus;
use super::establishments::EstablishmentType;
use super::evaluations::EvaluationStatus;
use super::personnel::Role;

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateInternshipRequest {
    pub department_id: i32,
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(range(min = 1, max = 500))]
    pub total_places: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub required_level: Option<String>,
    pub requirements: Option<String>,
    pub supervisor_id: i32,
}

/// Filtres conjonctifs de recherche de stage côté étudiant.
/// Un filtre absent est un no-op.
#[derive(Debug, Default, Deserialize)]
pub struct InternshipFilters {
    pub department_id: Option<i32>,
    pub city: Option<String>,
    pub level: Option<String>,
}

/// Recherche texte libre (?q=...) sur les stages ouverts
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Fiche détaillée d'un stage: le nombre de places restantes est dérivé
/// en lecture, jamais stocké
#[derive(Debug, Serialize)]
pub struct InternshipDetail {
    #[serde(flatten)]
    pub internship: super::internships::Model,
    pub places_remaining: i32,
}

// ---------------------------------------------------------------------------
// Candidatures
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitApplicationRequest {
    pub internship_id: i32,
    pub motivation_letter: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplicationStatusFilter {
    pub status: Option<ApplicationStatus>,
}

// ---------------------------------------------------------------------------
// Évaluations
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct SubmitEvaluationRequest {
    pub score: Decimal, // Sur 20, bornes vérifiées par le service (InvalidScore)
    pub comments: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluationStatusFilter {
    pub status: Option<EvaluationStatus>,
}

/// Demande d'attestation envoyée au service de génération de documents
/// (collaborateur externe). La référence d'artefact est générée ici et
/// renvoyée au client pour le téléchargement ultérieur.
#[derive(Debug, Clone, Serialize)]
pub struct AttestationRequest {
    pub artifact_ref: Uuid,
    pub student_id: i32,
    pub internship_id: i32,
    pub score: Decimal,
    pub comments: Option<String>,
    pub supervisor_name: String,
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterDocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub file_url: String,
    #[validate(range(min = 1))]
    pub file_size: i64,
    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,
}

// ---------------------------------------------------------------------------
// Administration
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct CreateEstablishmentRequest {
    #[validate(length(min = 2, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub city: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    #[validate(email)]
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub establishment_type: EstablishmentType,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEstablishmentRequest {
    pub name: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub website: Option<String>,
    #[serde(rename = "type")]
    pub establishment_type: Option<EstablishmentType>,
    pub is_active: Option<bool>,
}

/// Établissement enrichi de ses compteurs dérivés, recalculés en lecture
/// depuis les tables enfants (jamais stockés).
#[derive(Debug, Serialize)]
pub struct EstablishmentWithCounts {
    #[serde(flatten)]
    pub establishment: super::establishments::Model,
    pub departments_count: u64,
    pub students_count: u64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreatePersonnelRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    pub role: Role,
    pub phone: Option<String>,
    pub establishment_id: Option<i32>,
    pub department_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePersonnelRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub establishment_id: Option<i32>,
    pub department_id: Option<i32>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 4, max = 30))]
    pub matricule: String,
    #[validate(length(min = 8))]
    pub password: String,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    pub phone: Option<String>,
    pub level: String,
    pub specialty: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleFilter {
    pub role: Option<Role>,
}

// ---------------------------------------------------------------------------
// Profil étudiant
// ---------------------------------------------------------------------------

/// Mise à jour partielle du profil par l'étudiant lui-même. Le matricule
/// et le nom sont gérés par l'administration, pas ici.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateStudentProfileRequest {
    #[validate(email)]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub level: Option<String>,
    pub specialty: Option<String>,
}

/// Profil étudiant enrichi du taux de complétion, dérivé en lecture des
/// champs renseignés
#[derive(Debug, Serialize)]
pub struct StudentProfile {
    #[serde(flatten)]
    pub student: super::students::Model,
    pub profile_completion: u8,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_students: u64,
    pub total_personnel: u64,
    pub total_establishments: u64,
    pub active_internships: u64,
    pub pending_applications: u64,
    pub validated_evaluations: u64,
}

// ---------------------------------------------------------------------------
// Pagination (listes admin)
// ---------------------------------------------------------------------------

fn default_page() -> u64 {
    1
}

fn default_per_page() -> u64 {
    20
}

#[derive(Debug, Deserialize)]
pub struct PageParams {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_per_page")]
    pub per_page: u64,
}

impl PageParams {
    /// Index de page SeaORM (base 0), page 1 par défaut si valeur absurde
    pub fn zero_based(&self) -> u64 {
        self.page.saturating_sub(1)
    }

    pub fn clamped_per_page(&self) -> u64 {
        self.per_page.clamp(1, 100)
    }
}

#[derive(Debug, Serialize)]
pub struct PagedResponse<T> {
    pub items: Vec<T>,
    pub page: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub total_pages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_params_defaults() {
        let params: PageParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.page, 1);
        assert_eq!(params.per_page, 20);
    }

    #[test]
    fn test_page_params_clamping() {
        let params = PageParams { page: 0, per_page: 9999 };
        assert_eq!(params.zero_based(), 0);
        assert_eq!(params.clamped_per_page(), 100);
    }
}
