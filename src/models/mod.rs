// ============================================================================
// MODELS - MODULE PRINCIPAL
// ============================================================================
//
// Description:
//   Point d'entrée pour tous les modèles de données.
//   Chaque modèle correspond à une table PostgreSQL avec SeaORM.
//
// Liste des modules:
//   - health : Health check API
//   - students : Étudiants (login par matricule)
//   - personnel : Personnel hospitalier (médecin, chef de service, admin)
//   - establishments : Établissements partenaires (CHU, hôpital, clinique...)
//   - departments : Services rattachés à un établissement
//   - internships : Offres de stage (places totales / occupées)
//   - applications : Candidatures étudiant → stage (PENDING/ACCEPTED/...)
//   - evaluations : Évaluations de stage (note sur 20, validation par le chef)
//   - notifications : Notifications émises par les transitions d'état
//   - documents : Métadonnées des documents étudiants (CV, lettres...)
//   - dto : Data Transfer Objects pour les requêtes/réponses API
//
// Points d'attention:
//   - Tous les modèles utilisent SeaORM (pas de SQL brut)
//   - Les statuts sont des enums SeaORM (valeurs string en base)
//   - Les compteurs dérivés (nb de services, nb d'étudiants d'un
//     établissement) ne sont JAMAIS stockés : ils sont recalculés en lecture
//   - filled_places n'est modifié QUE par les transitions de candidature
//
// ============================================================================

pub mod health;
pub mod students;
pub mod personnel;
pub mod establishments;
pub mod departments;
pub mod internships;
pub mod applications;
pub mod evaluations;
pub mod notifications;
pub mod documents;
pub mod dto;
