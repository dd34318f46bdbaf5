use sea_orm::*;
use sea_orm::sea_query::Expr;
use sea_orm::sea_query::extension::postgres::PgExpr;

use crate::middleware::AuthUser;
use crate::models::applications::{self, ApplicationStatus};
use crate::models::dto::{InternshipDetail, InternshipFilters, PagedResponse, PageParams};
use crate::models::establishments;
use crate::models::evaluations::{self, EvaluationStatus};
use crate::models::internships::{self, InternshipStatus};
use crate::models::personnel::{self, Role};
use crate::models::students;
use crate::services::capacity;
use crate::services::error::ServiceError;

/// Couche de lecture à scope de rôle. L'identité de l'appelant est un
/// paramètre explicite de chaque requête; un rôle hors scope répond
/// Unauthorized. Les filtres sont conjonctifs, un filtre absent est un
/// no-op, une liste vide est un résultat valide.
pub struct QueryService;

impl QueryService {
    /// Étudiant: stages ouverts (Actif ET au moins une place libre),
    /// triés par date de début croissante
    pub async fn list_available_internships(
        db: &DatabaseConnection,
        auth: &AuthUser,
        filters: &InternshipFilters,
    ) -> Result<Vec<internships::Model>, ServiceError> {
        auth.require(Role::Student)?;

        let mut query = internships::Entity::find()
            .filter(internships::Column::Status.eq(InternshipStatus::Actif))
            .filter(
                Expr::col((internships::Entity, internships::Column::FilledPlaces))
                    .lt(Expr::col((internships::Entity, internships::Column::TotalPlaces))),
            );

        if let Some(department_id) = filters.department_id {
            query = query.filter(internships::Column::DepartmentId.eq(department_id));
        }

        if let Some(level) = &filters.level {
            query = query.filter(internships::Column::RequiredLevel.eq(level.clone()));
        }

        if let Some(city) = &filters.city {
            query = query
                .join(JoinType::InnerJoin, internships::Relation::Establishment.def())
                .filter(establishments::Column::City.eq(city.clone()));
        }

        Ok(query
            .order_by_asc(internships::Column::StartDate)
            .all(db)
            .await?)
    }

    /// Étudiant: recherche texte libre (titre ou description) parmi les
    /// stages ouverts, mêmes contraintes que list_available_internships.
    /// Une requête vide renvoie tous les stages ouverts.
    pub async fn search_available_internships(
        db: &DatabaseConnection,
        auth: &AuthUser,
        q: &str,
    ) -> Result<Vec<internships::Model>, ServiceError> {
        auth.require(Role::Student)?;

        let mut query = internships::Entity::find()
            .filter(internships::Column::Status.eq(InternshipStatus::Actif))
            .filter(
                Expr::col((internships::Entity, internships::Column::FilledPlaces))
                    .lt(Expr::col((internships::Entity, internships::Column::TotalPlaces))),
            );

        let q = q.trim();
        if !q.is_empty() {
            let pattern = format!("%{}%", q);
            query = query.filter(
                Condition::any()
                    .add(
                        Expr::col((internships::Entity, internships::Column::Title))
                            .ilike(pattern.clone()),
                    )
                    .add(
                        Expr::col((internships::Entity, internships::Column::Description))
                            .ilike(pattern),
                    ),
            );
        }

        Ok(query
            .order_by_asc(internships::Column::StartDate)
            .all(db)
            .await?)
    }

    /// Fiche détaillée d'un stage, consultable par tout rôle authentifié.
    /// Les places restantes sont dérivées en lecture.
    pub async fn internship_detail(
        db: &DatabaseConnection,
        auth: &AuthUser,
        internship_id: i32,
    ) -> Result<InternshipDetail, ServiceError> {
        auth.require_any(&[Role::Student, Role::Doctor, Role::Chief, Role::Admin])?;

        let internship = internships::Entity::find_by_id(internship_id)
            .one(db)
            .await?
            .ok_or(ServiceError::NotFound("Internship"))?;

        let places_remaining =
            capacity::seats_remaining(internship.total_places, internship.filled_places);
        Ok(InternshipDetail {
            internship,
            places_remaining,
        })
    }

    /// Étudiant: ses propres candidatures, les plus récentes en premier
    pub async fn list_my_applications(
        db: &DatabaseConnection,
        auth: &AuthUser,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<applications::Model>, ServiceError> {
        auth.require(Role::Student)?;

        let mut query = applications::Entity::find()
            .filter(applications::Column::StudentId.eq(auth.user_id));

        if let Some(status) = status {
            query = query.filter(applications::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(applications::Column::AppliedAt)
            .all(db)
            .await?)
    }

    /// Chef: les offres qu'il a publiées
    pub async fn list_my_internships(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<Vec<internships::Model>, ServiceError> {
        auth.require(Role::Chief)?;

        Ok(internships::Entity::find()
            .filter(internships::Column::CreatedBy.eq(auth.user_id))
            .order_by_desc(internships::Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// Chef: les candidatures reçues sur ses offres, les plus anciennes en
    /// premier (file de revue)
    pub async fn list_applications_for_my_internships(
        db: &DatabaseConnection,
        auth: &AuthUser,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<applications::Model>, ServiceError> {
        auth.require(Role::Chief)?;

        let mut query = applications::Entity::find()
            .join(JoinType::InnerJoin, applications::Relation::Internship.def())
            .filter(internships::Column::CreatedBy.eq(auth.user_id));

        if let Some(status) = status {
            query = query.filter(applications::Column::Status.eq(status));
        }

        Ok(query
            .order_by_asc(applications::Column::AppliedAt)
            .all(db)
            .await?)
    }

    /// Médecin: les évaluations qui lui sont assignées
    pub async fn list_assigned_evaluations(
        db: &DatabaseConnection,
        auth: &AuthUser,
        status: Option<EvaluationStatus>,
    ) -> Result<Vec<evaluations::Model>, ServiceError> {
        auth.require(Role::Doctor)?;

        let mut query = evaluations::Entity::find()
            .filter(evaluations::Column::DoctorId.eq(auth.user_id));

        if let Some(status) = status {
            query = query.filter(evaluations::Column::Status.eq(status));
        }

        Ok(query
            .order_by_desc(evaluations::Column::CreatedAt)
            .all(db)
            .await?)
    }

    /// Étudiant: ses propres évaluations (lecture seule)
    pub async fn list_student_evaluations(
        db: &DatabaseConnection,
        auth: &AuthUser,
    ) -> Result<Vec<evaluations::Model>, ServiceError> {
        auth.require(Role::Student)?;

        Ok(evaluations::Entity::find()
            .filter(evaluations::Column::StudentId.eq(auth.user_id))
            .order_by_desc(evaluations::Column::CreatedAt)
            .all(db)
            .await?)
    }

    // -----------------------------------------------------------------------
    // Listes admin paginées ({page, per_page})
    // -----------------------------------------------------------------------

    pub async fn list_establishments_paged(
        db: &DatabaseConnection,
        auth: &AuthUser,
        params: &PageParams,
    ) -> Result<PagedResponse<establishments::Model>, ServiceError> {
        auth.require(Role::Admin)?;

        let per_page = params.clamped_per_page();
        let paginator = establishments::Entity::find()
            .order_by_asc(establishments::Column::Name)
            .paginate(db, per_page);

        let totals = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(params.zero_based()).await?;

        Ok(PagedResponse {
            items,
            page: params.page.max(1),
            per_page,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn list_personnel_paged(
        db: &DatabaseConnection,
        auth: &AuthUser,
        role: Option<Role>,
        params: &PageParams,
    ) -> Result<PagedResponse<personnel::Model>, ServiceError> {
        auth.require(Role::Admin)?;

        let mut query = personnel::Entity::find();
        if let Some(role) = role {
            query = query.filter(personnel::Column::Role.eq(role));
        }

        let per_page = params.clamped_per_page();
        let paginator = query
            .order_by_asc(personnel::Column::LastName)
            .paginate(db, per_page);

        let totals = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(params.zero_based()).await?;

        Ok(PagedResponse {
            items,
            page: params.page.max(1),
            per_page,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn list_students_paged(
        db: &DatabaseConnection,
        auth: &AuthUser,
        params: &PageParams,
    ) -> Result<PagedResponse<students::Model>, ServiceError> {
        auth.require(Role::Admin)?;

        let per_page = params.clamped_per_page();
        let paginator = students::Entity::find()
            .order_by_asc(students::Column::LastName)
            .paginate(db, per_page);

        let totals = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(params.zero_based()).await?;

        Ok(PagedResponse {
            items,
            page: params.page.max(1),
            per_page,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }

    pub async fn list_internships_paged(
        db: &DatabaseConnection,
        auth: &AuthUser,
        params: &PageParams,
    ) -> Result<PagedResponse<internships::Model>, ServiceError> {
        auth.require(Role::Admin)?;

        let per_page = params.clamped_per_page();
        let paginator = internships::Entity::find()
            .order_by_desc(internships::Column::CreatedAt)
            .paginate(db, per_page);

        let totals = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(params.zero_based()).await?;

        Ok(PagedResponse {
            items,
            page: params.page.max(1),
            per_page,
            total_items: totals.number_of_items,
            total_pages: totals.number_of_pages,
        })
    }
}
