use crate::{
    db::{is_unique_violation, with_transaction},
    entities::{cafe, employee},
    errors::ServiceError,
    identifiers::{cafe_id_generator, IdGenerator},
    services::ServiceSettings,
    validation::is_valid_cafe_id,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::Utc;
use sea_orm::{
    sea_query::{Expr, SimpleExpr},
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

pub const CAFE_NOT_FOUND: &str = "Cafe not found";
pub const MISSING_REQUIRED_FIELDS: &str = "Missing required fields";

/// Cafe as returned over the API, with its live employee count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CafeResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub location: String,
    /// Base64 encoded image bytes
    pub logo: Option<String>,
    pub employees_count: u64,
}

impl CafeResponse {
    fn from_model(model: cafe::Model, employees_count: u64) -> Self {
        Self {
            id: model.id,
            name: model.name,
            description: model.description,
            location: model.location,
            logo: model.logo.as_deref().map(|bytes| STANDARD.encode(bytes)),
            employees_count,
        }
    }
}

fn employee_count() -> SimpleExpr {
    Expr::col((employee::Entity, employee::Column::Id)).count()
}

#[derive(Debug, FromQueryResult)]
struct CafeWithCount {
    id: String,
    name: String,
    description: String,
    location: String,
    logo: Option<Vec<u8>>,
    employees_count: i64,
}

impl From<CafeWithCount> for CafeResponse {
    fn from(row: CafeWithCount) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            location: row.location,
            logo: row.logo.as_deref().map(|bytes| STANDARD.encode(bytes)),
            employees_count: u64::try_from(row.employees_count).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateCafeInput {
    #[validate(length(max = 100))]
    pub name: String,
    #[validate(length(max = 255))]
    pub description: String,
    #[validate(length(max = 100))]
    pub location: String,
    pub logo: Option<Vec<u8>>,
}

/// Partial cafe update. `None` leaves a field untouched; for `logo`,
/// `Some(None)` clears the stored image.
#[derive(Debug, Clone, Default)]
pub struct UpdateCafeInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub logo: Option<Option<Vec<u8>>>,
}

#[derive(Clone)]
pub struct CafeService {
    db: Arc<DatabaseConnection>,
    settings: ServiceSettings,
    id_generator: IdGenerator,
}

impl CafeService {
    pub fn new(db: Arc<DatabaseConnection>, settings: ServiceSettings) -> Self {
        Self {
            db,
            settings,
            id_generator: cafe_id_generator(),
        }
    }

    /// Replaces the identifier source, mainly to force collisions in tests.
    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// Every cafe joined with the number of employees that reference it.
    fn with_employee_counts() -> Select<cafe::Entity> {
        cafe::Entity::find()
            .select_only()
            .columns([
                cafe::Column::Id,
                cafe::Column::Name,
                cafe::Column::Description,
                cafe::Column::Location,
                cafe::Column::Logo,
            ])
            .column_as(employee_count(), "employees_count")
            .left_join(employee::Entity)
            .group_by(cafe::Column::Id)
    }

    fn check_logo(&self, logo: &[u8]) -> Result<(), ServiceError> {
        if logo.len() > self.settings.max_logo_bytes {
            return Err(ServiceError::validation(format!(
                "Logo exceeds the maximum size of {} bytes",
                self.settings.max_logo_bytes
            )));
        }
        Ok(())
    }

    #[instrument(skip(self, input), fields(name = %input.name, location = %input.location))]
    pub async fn create(&self, input: CreateCafeInput) -> Result<CafeResponse, ServiceError> {
        if [&input.name, &input.description, &input.location]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ServiceError::validation(MISSING_REQUIRED_FIELDS));
        }
        input.validate()?;
        if let Some(logo) = &input.logo {
            self.check_logo(logo)?;
        }

        for attempt in 1..=self.settings.id_generation_attempts {
            let id = (self.id_generator)();
            let now = Utc::now();
            let cafe = cafe::ActiveModel {
                id: Set(id.clone()),
                name: Set(input.name.clone()),
                description: Set(input.description.clone()),
                location: Set(input.location.clone()),
                logo: Set(input.logo.clone()),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match cafe.insert(&*self.db).await {
                Ok(created) => {
                    info!(cafe_id = %created.id, "Cafe created");
                    return Ok(CafeResponse::from_model(created, 0));
                }
                Err(err) if is_unique_violation(&err) => {
                    warn!(attempt, cafe_id = %id, "Cafe id collision, regenerating");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(ServiceError::db_error(format!(
            "could not allocate a unique cafe id after {} attempts",
            self.settings.id_generation_attempts
        )))
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<CafeResponse, ServiceError> {
        if !is_valid_cafe_id(id) {
            return Err(ServiceError::not_found(CAFE_NOT_FOUND));
        }

        Self::with_employee_counts()
            .filter(cafe::Column::Id.eq(id))
            .into_model::<CafeWithCount>()
            .one(&*self.db)
            .await?
            .map(CafeResponse::from)
            .ok_or_else(|| ServiceError::not_found(CAFE_NOT_FOUND))
    }

    /// Lists cafes, most staffed first. Equal counts fall back to creation
    /// order and then id so the listing is stable.
    #[instrument(skip(self))]
    pub async fn list(&self, location: Option<&str>) -> Result<Vec<CafeResponse>, ServiceError> {
        let mut query = Self::with_employee_counts();
        if let Some(location) = location.filter(|l| !l.is_empty()) {
            query = query.filter(cafe::Column::Location.eq(location));
        }

        let rows = query
            .order_by_desc(employee_count())
            .order_by_asc(cafe::Column::CreatedAt)
            .order_by_asc(cafe::Column::Id)
            .into_model::<CafeWithCount>()
            .all(&*self.db)
            .await?;

        Ok(rows.into_iter().map(CafeResponse::from).collect())
    }

    /// Applies the supplied fields only. Values are not re-validated beyond
    /// the logo size limit.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: &str,
        input: UpdateCafeInput,
    ) -> Result<CafeResponse, ServiceError> {
        if let Some(Some(logo)) = &input.logo {
            self.check_logo(logo)?;
        }
        if !is_valid_cafe_id(id) {
            return Err(ServiceError::not_found(CAFE_NOT_FOUND));
        }

        let id = id.to_owned();
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = cafe::Entity::find_by_id(id.as_str())
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(CAFE_NOT_FOUND))?;

                let mut cafe: cafe::ActiveModel = existing.into();
                if let Some(name) = input.name {
                    cafe.name = Set(name);
                }
                if let Some(description) = input.description {
                    cafe.description = Set(description);
                }
                if let Some(location) = input.location {
                    cafe.location = Set(location);
                }
                if let Some(logo) = input.logo {
                    cafe.logo = Set(logo);
                }
                cafe.updated_at = Set(Utc::now());
                let cafe = cafe.update(txn).await?;

                let employees_count = employee::Entity::find()
                    .filter(employee::Column::CafeId.eq(id.as_str()))
                    .count(txn)
                    .await?;

                Ok(CafeResponse::from_model(cafe, employees_count))
            })
        })
        .await?;

        info!(cafe_id = %updated.id, "Cafe updated");
        Ok(updated)
    }

    /// Deletes the cafe together with all of its employees, as one unit.
    /// Returns how many employees were removed.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<u64, ServiceError> {
        if !is_valid_cafe_id(id) {
            return Err(ServiceError::not_found(CAFE_NOT_FOUND));
        }

        let cafe_id = id.to_owned();
        let removed = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                cafe::Entity::find_by_id(cafe_id.as_str())
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(CAFE_NOT_FOUND))?;

                let employees = employee::Entity::delete_many()
                    .filter(employee::Column::CafeId.eq(cafe_id.as_str()))
                    .exec(txn)
                    .await?;

                cafe::Entity::delete_by_id(cafe_id.as_str())
                    .exec(txn)
                    .await?;

                Ok(employees.rows_affected)
            })
        })
        .await?;

        info!(cafe_id = %id, employees_removed = removed, "Cafe deleted");
        Ok(removed)
    }

    /// Raw logo bytes for a cafe.
    #[instrument(skip(self))]
    pub async fn logo(&self, id: &str) -> Result<Vec<u8>, ServiceError> {
        if !is_valid_cafe_id(id) {
            return Err(ServiceError::not_found(CAFE_NOT_FOUND));
        }

        let cafe = cafe::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(CAFE_NOT_FOUND))?;

        cafe.logo
            .ok_or_else(|| ServiceError::not_found("Logo not found"))
    }

    /// Replaces the logo; an empty payload clears it.
    pub async fn set_logo(&self, id: &str, logo: Vec<u8>) -> Result<CafeResponse, ServiceError> {
        let logo = if logo.is_empty() { None } else { Some(logo) };
        self.update(
            id,
            UpdateCafeInput {
                logo: Some(logo),
                ..Default::default()
            },
        )
        .await
    }
}
