use sea_orm::*;
use sea_orm::sea_query::Expr;
use chrono::Utc;

use crate::middleware::AuthUser;
use crate::models::notifications::{self, NotificationType};
use crate::models::personnel::Role;
use crate::services::error::ServiceError;

pub struct NotificationService;

impl NotificationService {
    /// Insère une notification non lue pour un destinataire.
    /// Générique sur ConnectionTrait pour être appelable DANS la transaction
    /// d'une transition d'état : la notification est commitée (ou annulée)
    /// avec la transition, jamais séparément.
    pub async fn emit<C: ConnectionTrait>(
        db: &C,
        recipient_role: Role,
        recipient_id: i32,
        kind: NotificationType,
        title: &str,
        message: &str,
        related: Option<(&str, i32)>,
    ) -> Result<notifications::Model, DbErr> {
        let new_notification = notifications::ActiveModel {
            user_role: Set(recipient_role),
            user_id: Set(recipient_id),
            notification_type: Set(kind),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            related_entity_type: Set(related.map(|(kind, _)| kind.to_string())),
            related_entity_id: Set(related.map(|(_, id)| id)),
            is_read: Set(false),
            created_at: Set(Utc::now()),
            read_at: Set(None),
            ..Default::default()
        };

        new_notification.insert(db).await
    }

    /// Notifications de l'appelant, les plus récentes en premier
    pub async fn list(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<Vec<notifications::Model>, ServiceError> {
        let notifications = notifications::Entity::find()
            .filter(notifications::Column::UserRole.eq(auth.role))
            .filter(notifications::Column::UserId.eq(auth.user_id))
            .order_by_desc(notifications::Column::CreatedAt)
            .order_by_desc(notifications::Column::Id)
            .all(db)
            .await?;

        Ok(notifications)
    }

    /// Marque une notification comme lue. Idempotent: re-marquer une
    /// notification déjà lue est un no-op, pas une erreur.
    pub async fn mark_as_read(
        db: &DatabaseConnection,
        auth: &AuthUser,
        notification_id: i32,
    ) -> Result<notifications::Model, ServiceError> {
        let notification = notifications::Entity::find_by_id(notification_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Notification"))?;

        if notification.user_role != auth.role || notification.user_id != auth.user_id {
            return Err(ServiceError::Unauthorized(
                "notification belongs to another user".to_string(),
            ));
        }

        if notification.is_read {
            return Ok(notification);
        }

        let mut active: notifications::ActiveModel = notification.into();
        active.is_read = Set(true);
        active.read_at = Set(Some(Utc::now()));

        Ok(active.update(db).await?)
    }

    /// Marque toutes les notifications non lues de l'appelant comme lues.
    /// Idempotent: un second appel ne touche aucune ligne.
    pub async fn mark_all_as_read(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<u64, ServiceError> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .col_expr(notifications::Column::ReadAt, Expr::value(Utc::now()))
            .filter(notifications::Column::UserRole.eq(auth.role))
            .filter(notifications::Column::UserId.eq(auth.user_id))
            .filter(notifications::Column::IsRead.eq(false))
            .exec(db)
            .await?;

        Ok(result.rows_affected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn student() -> AuthUser {
        AuthUser {
            user_id: 7,
            role: Role::Student,
            display_name: "Amina Benali".to_string(),
        }
    }

    fn notification(recipient_id: i32, is_read: bool) -> notifications::Model {
        notifications::Model {
            id: 3,
            user_role: Role::Student,
            user_id: recipient_id,
            notification_type: NotificationType::Info,
            title: "Candidature acceptée".to_string(),
            message: "Votre candidature a été acceptée.".to_string(),
            related_entity_type: Some("application".to_string()),
            related_entity_id: Some(42),
            is_read,
            created_at: Utc::now(),
            read_at: if is_read { Some(Utc::now()) } else { None },
        }
    }

    // Re-marquer une notification déjà lue est un no-op: la ligne est
    // renvoyée telle quelle. Aucun exec n'est enregistré dans le mock,
    // un UPDATE parasite ferait échouer le test.
    #[tokio::test]
    async fn test_mark_as_read_twice_is_a_noop() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![notification(7, true)]])
            .into_connection();

        let result = NotificationService::mark_as_read(&db, &student(), 3)
            .await
            .unwrap();
        assert!(result.is_read);
        assert!(result.read_at.is_some());
    }

    // Un second mark_all_as_read ne touche aucune ligne (le filtre
    // is_read = false ne matche plus rien)
    #[tokio::test]
    async fn test_mark_all_as_read_repeat_touches_no_rows() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .into_connection();

        let touched = NotificationService::mark_all_as_read(&db, &student())
            .await
            .unwrap();
        assert_eq!(touched, 0);
    }

    // La notification d'un autre destinataire n'est pas marquable
    #[tokio::test]
    async fn test_mark_as_read_scoped_to_recipient() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![notification(99, false)]])
            .into_connection();

        let err = NotificationService::mark_as_read(&db, &student(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
    }
}
