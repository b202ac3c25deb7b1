use crate::{
    db::{is_unique_violation, with_transaction},
    entities::{cafe, employee},
    errors::ServiceError,
    identifiers::{employee_id_generator, IdGenerator},
    services::{cafes::CAFE_NOT_FOUND, cafes::MISSING_REQUIRED_FIELDS, ServiceSettings},
    validation::{
        is_valid_cafe_id, is_valid_email, is_valid_employee_id, is_valid_phone, validate_email,
        validate_phone,
    },
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

pub const EMPLOYEE_NOT_FOUND: &str = "Employee not found";
pub const EMAIL_IN_USE: &str = "Email address already in use";

/// Employee as returned over the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeResponse {
    pub id: String,
    pub name: String,
    pub email_address: String,
    pub phone_number: String,
    pub gender: String,
    pub start_date: NaiveDate,
    /// Whole days since `start_date`
    pub days_worked: i64,
    pub cafe_id: String,
    /// Name of the cafe the employee works at
    pub cafe: Option<String>,
}

impl EmployeeResponse {
    fn build(model: employee::Model, cafe_name: Option<String>, today: NaiveDate) -> Self {
        let days_worked = model.days_worked_on(today);
        Self {
            id: model.id,
            name: model.name,
            email_address: model.email_address,
            phone_number: model.phone_number,
            gender: model.gender,
            start_date: model.start_date,
            days_worked,
            cafe_id: model.cafe_id,
            cafe: cafe_name,
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CreateEmployeeInput {
    #[validate(length(max = 100, message = "Name must be at most 100 characters"))]
    pub name: String,
    #[validate(length(max = 100, message = "Email address must be at most 100 characters"))]
    pub email_address: String,
    pub phone_number: String,
    #[validate(length(max = 10, message = "Gender must be at most 10 characters"))]
    pub gender: String,
    pub cafe_id: String,
    /// Defaults to today (UTC)
    pub start_date: Option<NaiveDate>,
}

/// Partial employee update; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateEmployeeInput {
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub cafe_id: Option<String>,
}

#[derive(Clone)]
pub struct EmployeeService {
    db: Arc<DatabaseConnection>,
    settings: ServiceSettings,
    id_generator: IdGenerator,
}

async fn find_cafe(
    txn: &DatabaseTransaction,
    cafe_id: &str,
) -> Result<Option<cafe::Model>, ServiceError> {
    if !is_valid_cafe_id(cafe_id) {
        return Ok(None);
    }
    Ok(cafe::Entity::find_by_id(cafe_id).one(txn).await?)
}

impl EmployeeService {
    pub fn new(db: Arc<DatabaseConnection>, settings: ServiceSettings) -> Self {
        Self {
            db,
            settings,
            id_generator: employee_id_generator(),
        }
    }

    /// Replaces the identifier source, mainly to force collisions in tests.
    pub fn with_id_generator(mut self, id_generator: IdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }

    /// Creates an employee after checking email, phone and cafe, in that order.
    ///
    /// A primary key collision is retried with a fresh id; a clash on the
    /// email column is reported as a validation error.
    #[instrument(skip(self, input), fields(cafe_id = %input.cafe_id))]
    pub async fn create(&self, input: CreateEmployeeInput) -> Result<EmployeeResponse, ServiceError> {
        if [&input.name, &input.gender, &input.cafe_id]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err(ServiceError::validation(MISSING_REQUIRED_FIELDS));
        }
        validate_email(&input.email_address)?;
        validate_phone(&input.phone_number)?;
        input.validate()?;

        let start_date = input
            .start_date
            .unwrap_or_else(|| Utc::now().date_naive());

        for attempt in 1..=self.settings.id_generation_attempts {
            let id = (self.id_generator)();
            match self.insert(id.clone(), input.clone(), start_date).await {
                Ok(created) => {
                    info!(employee_id = %created.id, "Employee created");
                    return Ok(created);
                }
                Err(ServiceError::DatabaseError(err)) if is_unique_violation(&err) => {
                    let id_taken = employee::Entity::find_by_id(id.as_str())
                        .one(&*self.db)
                        .await?
                        .is_some();
                    if !id_taken {
                        return Err(ServiceError::validation(EMAIL_IN_USE));
                    }
                    warn!(attempt, employee_id = %id, "Employee id collision, regenerating");
                }
                Err(err) => return Err(err),
            }
        }

        Err(ServiceError::db_error(format!(
            "could not allocate a unique employee id after {} attempts",
            self.settings.id_generation_attempts
        )))
    }

    async fn insert(
        &self,
        id: String,
        input: CreateEmployeeInput,
        start_date: NaiveDate,
    ) -> Result<EmployeeResponse, ServiceError> {
        with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let cafe = find_cafe(txn, &input.cafe_id)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(CAFE_NOT_FOUND))?;

                let email_taken = employee::Entity::find()
                    .filter(employee::Column::EmailAddress.eq(input.email_address.as_str()))
                    .count(txn)
                    .await?
                    > 0;
                if email_taken {
                    return Err(ServiceError::validation(EMAIL_IN_USE));
                }

                let now = Utc::now();
                let created = employee::ActiveModel {
                    id: Set(id),
                    name: Set(input.name),
                    email_address: Set(input.email_address),
                    phone_number: Set(input.phone_number),
                    gender: Set(input.gender),
                    start_date: Set(start_date),
                    cafe_id: Set(cafe.id),
                    created_at: Set(now),
                    updated_at: Set(now),
                }
                .insert(txn)
                .await?;

                Ok(EmployeeResponse::build(
                    created,
                    Some(cafe.name),
                    now.date_naive(),
                ))
            })
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: &str) -> Result<EmployeeResponse, ServiceError> {
        if !is_valid_employee_id(id) {
            return Err(ServiceError::not_found(EMPLOYEE_NOT_FOUND));
        }

        let (employee, cafe) = employee::Entity::find_by_id(id)
            .find_also_related(cafe::Entity)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found(EMPLOYEE_NOT_FOUND))?;

        Ok(EmployeeResponse::build(
            employee,
            cafe.map(|c| c.name),
            Utc::now().date_naive(),
        ))
    }

    /// Employees ordered by start date, longest serving first.
    ///
    /// With `cafe_name`, only that cafe's staff are returned; the first cafe
    /// carrying the name wins. `None` means no cafe has that name.
    #[instrument(skip(self))]
    pub async fn list(
        &self,
        cafe_name: Option<&str>,
    ) -> Result<Option<Vec<EmployeeResponse>>, ServiceError> {
        let mut query = employee::Entity::find().find_also_related(cafe::Entity);

        if let Some(name) = cafe_name.filter(|n| !n.is_empty()) {
            let cafe = cafe::Entity::find()
                .filter(cafe::Column::Name.eq(name))
                .order_by_asc(cafe::Column::CreatedAt)
                .order_by_asc(cafe::Column::Id)
                .one(&*self.db)
                .await?;
            let Some(cafe) = cafe else {
                debug!(cafe_name = %name, "No cafe with that name");
                return Ok(None);
            };
            query = query.filter(employee::Column::CafeId.eq(cafe.id));
        }

        let today = Utc::now().date_naive();
        let rows = query
            .order_by_asc(employee::Column::StartDate)
            .order_by_asc(employee::Column::CreatedAt)
            .order_by_asc(employee::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(Some(
            rows.into_iter()
                .map(|(employee, cafe)| {
                    EmployeeResponse::build(employee, cafe.map(|c| c.name), today)
                })
                .collect(),
        ))
    }

    /// Applies a partial update as one unit.
    ///
    /// Invalid emails or phone numbers and unknown cafes are dropped and the
    /// previous value kept. A storage failure rolls every field back.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: &str,
        input: UpdateEmployeeInput,
    ) -> Result<EmployeeResponse, ServiceError> {
        if !is_valid_employee_id(id) {
            return Err(ServiceError::not_found(EMPLOYEE_NOT_FOUND));
        }

        let id = id.to_owned();
        let updated = with_transaction(&self.db, move |txn| {
            Box::pin(async move {
                let existing = employee::Entity::find_by_id(id.as_str())
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found(EMPLOYEE_NOT_FOUND))?;

                let mut employee: employee::ActiveModel = existing.into();
                if let Some(name) = input.name {
                    employee.name = Set(name);
                }
                if let Some(gender) = input.gender {
                    employee.gender = Set(gender);
                }
                match input.email_address {
                    Some(email) if is_valid_email(&email) => employee.email_address = Set(email),
                    Some(email) => debug!(%email, "Ignoring invalid email on update"),
                    None => {}
                }
                match input.phone_number {
                    Some(phone) if is_valid_phone(&phone) => employee.phone_number = Set(phone),
                    Some(phone) => debug!(%phone, "Ignoring invalid phone number on update"),
                    None => {}
                }
                if let Some(cafe_id) = input.cafe_id {
                    match find_cafe(txn, &cafe_id).await? {
                        Some(cafe) => employee.cafe_id = Set(cafe.id),
                        None => debug!(%cafe_id, "Ignoring unknown cafe on update"),
                    }
                }
                employee.updated_at = Set(Utc::now());
                let employee = employee.update(txn).await?;

                let cafe = cafe::Entity::find_by_id(employee.cafe_id.as_str())
                    .one(txn)
                    .await?;

                Ok(EmployeeResponse::build(
                    employee,
                    cafe.map(|c| c.name),
                    Utc::now().date_naive(),
                ))
            })
        })
        .await?;

        info!(employee_id = %updated.id, "Employee updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        if !is_valid_employee_id(id) {
            return Err(ServiceError::not_found(EMPLOYEE_NOT_FOUND));
        }

        let result = employee::Entity::delete_by_id(id).exec(&*self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found(EMPLOYEE_NOT_FOUND));
        }

        info!(employee_id = %id, "Employee deleted");
        Ok(())
    }
}
