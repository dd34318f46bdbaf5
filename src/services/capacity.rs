// Arithmétique des places de stage.
//
// L'invariant protégé: 0 <= filled_places <= total_places, et filled_places
// égale toujours le nombre de candidatures ACCEPTED. Les écritures réelles
// passent par des update_many conditionnels (voir application_service), ces
// helpers ne portent que la logique de calcul et d'auto-statut.

use crate::models::internships::InternshipStatus;

pub fn seats_remaining(total_places: i32, filled_places: i32) -> i32 {
    (total_places - filled_places).max(0)
}

pub fn has_open_seat(total_places: i32, filled_places: i32) -> bool {
    filled_places < total_places
}

/// Statut automatique après une acceptation: 'Complet' dès que la dernière
/// place est prise, sinon le stage reste 'Actif'
pub fn status_after_fill(total_places: i32, filled_places: i32) -> InternshipStatus {
    if filled_places >= total_places {
        InternshipStatus::Complet
    } else {
        InternshipStatus::Actif
    }
}

/// Statut automatique après un désistement: un stage 'Complet' redevient
/// 'Actif' quand une place se libère. Les statuts posés par le chef
/// (Archivé, Clôturé) ne sont jamais réouverts automatiquement.
pub fn status_after_release(
    current: InternshipStatus,
    total_places: i32,
    filled_places: i32,
) -> InternshipStatus {
    match current {
        InternshipStatus::Complet if filled_places < total_places => InternshipStatus::Actif,
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seats_remaining() {
        assert_eq!(seats_remaining(5, 2), 3);
        assert_eq!(seats_remaining(5, 5), 0);
        // Un compteur corrompu ne produit jamais de reste négatif
        assert_eq!(seats_remaining(5, 7), 0);
    }

    #[test]
    fn test_has_open_seat() {
        assert!(has_open_seat(1, 0));
        assert!(!has_open_seat(1, 1));
    }

    #[test]
    fn test_last_seat_flips_status_to_complet() {
        assert_eq!(status_after_fill(1, 1), InternshipStatus::Complet);
        assert_eq!(status_after_fill(3, 2), InternshipStatus::Actif);
    }

    #[test]
    fn test_release_reopens_complet_only() {
        assert_eq!(
            status_after_release(InternshipStatus::Complet, 1, 0),
            InternshipStatus::Actif
        );
        assert_eq!(
            status_after_release(InternshipStatus::Cloture, 1, 0),
            InternshipStatus::Cloture
        );
        assert_eq!(
            status_after_release(InternshipStatus::Archive, 2, 1),
            InternshipStatus::Archive
        );
        // Toujours complet si aucune place ne s'est réellement libérée
        assert_eq!(
            status_after_release(InternshipStatus::Complet, 2, 2),
            InternshipStatus::Complet
        );
    }
}
