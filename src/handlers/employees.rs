use super::common::{created_response, message_response, success_response, AppJson};
use crate::{
    errors::{ApiError, ErrorResponse},
    services::{
        cafes::MISSING_REQUIRED_FIELDS, CreateEmployeeInput, EmployeeResponse,
        UpdateEmployeeInput,
    },
    AppState,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateEmployeeRequest {
    pub name: Option<String>,
    pub email_address: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    pub cafe_id: Option<String>,
    /// `YYYY-MM-DD`; defaults to today
    pub start_date: Option<NaiveDate>,
}

impl TryFrom<CreateEmployeeRequest> for CreateEmployeeInput {
    type Error = ApiError;

    fn try_from(req: CreateEmployeeRequest) -> Result<Self, Self::Error> {
        let (Some(name), Some(email_address), Some(phone_number), Some(gender), Some(cafe_id)) = (
            req.name,
            req.email_address,
            req.phone_number,
            req.gender,
            req.cafe_id,
        ) else {
            return Err(ApiError::ValidationError(MISSING_REQUIRED_FIELDS.to_string()));
        };

        Ok(Self {
            name,
            email_address,
            phone_number,
            gender,
            cafe_id,
            start_date: req.start_date,
        })
    }
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateEmployeeRequest {
    pub name: Option<String>,
    /// Ignored when not a valid address
    pub email_address: Option<String>,
    /// Ignored unless eight digits starting with 8 or 9
    pub phone_number: Option<String>,
    pub gender: Option<String>,
    /// Ignored unless the cafe exists
    pub cafe_id: Option<String>,
}

impl From<UpdateEmployeeRequest> for UpdateEmployeeInput {
    fn from(req: UpdateEmployeeRequest) -> Self {
        Self {
            name: req.name,
            email_address: req.email_address,
            phone_number: req.phone_number,
            gender: req.gender,
            cafe_id: req.cafe_id,
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeListQuery {
    /// Cafe name to filter by
    pub cafe: Option<String>,
}

#[utoipa::path(
    get,
    path = "/employees",
    params(EmployeeListQuery),
    responses(
        (status = 200, description = "Employees ordered by start date, earliest first", body = [EmployeeResponse]),
        (status = 404, description = "No cafe with that name; body is an empty list", body = [EmployeeResponse]),
    ),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(query): Query<EmployeeListQuery>,
) -> Result<Response, ApiError> {
    let listing = state
        .services
        .employees
        .list(query.cafe.as_deref())
        .await?;

    Ok(match listing {
        Some(employees) => success_response(employees),
        None => (StatusCode::NOT_FOUND, Json(Vec::<EmployeeResponse>::new())).into_response(),
    })
}

#[utoipa::path(
    get,
    path = "/employee/{id}",
    params(("id" = String, Path, description = "Employee id, e.g. UI1234567")),
    responses(
        (status = 200, description = "Employee", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse),
    ),
    tag = "employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = state.services.employees.get(&id).await?;
    Ok(success_response(employee))
}

#[utoipa::path(
    post,
    path = "/employee",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created", body = EmployeeResponse),
        (status = 400, description = "Missing fields, invalid email or phone, or email in use", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse),
    ),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let input = CreateEmployeeInput::try_from(payload)?;
    let employee = state.services.employees.create(input).await?;
    Ok(created_response(employee))
}

#[utoipa::path(
    put,
    path = "/employee/{id}",
    params(("id" = String, Path, description = "Employee id")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee after the accepted changes", body = EmployeeResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse),
        (status = 500, description = "Update rolled back", body = ErrorResponse),
    ),
    tag = "employees"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let employee = state
        .services
        .employees
        .update(&id, payload.into())
        .await?;
    Ok(success_response(employee))
}

#[utoipa::path(
    delete,
    path = "/employee/{id}",
    params(("id" = String, Path, description = "Employee id")),
    responses(
        (status = 200, description = "Employee deleted", body = crate::handlers::common::MessageResponse),
        (status = 404, description = "Employee not found", body = ErrorResponse),
    ),
    tag = "employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.employees.delete(&id).await?;
    Ok(message_response("Employee deleted"))
}

/// Employee routes, mounted at the root
pub fn employee_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employee", axum::routing::post(create_employee))
        .route(
            "/employee/:id",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
}
