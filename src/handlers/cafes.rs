use super::common::{created_response, deserialize_some, message_response, success_response};
use crate::{
    errors::{ApiError, ErrorResponse},
    services::{
        cafes::MISSING_REQUIRED_FIELDS, CafeResponse, CreateCafeInput, UpdateCafeInput,
    },
    AppState,
};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRequest, Multipart, Path, Query, Request, State},
    http::{header, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Deserialize;
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

/// JSON body accepted by `POST /cafe` and `PUT /cafe`
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CafeRequest {
    /// Required for updates, ignored on create
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// Base64 image (a `data:` URL prefix is tolerated); `null` clears the logo on update
    #[serde(default, deserialize_with = "deserialize_some")]
    #[schema(value_type = Option<String>)]
    pub logo: Option<Option<String>>,
}

/// Cafe fields decoded from either a JSON or a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct CafePayload {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    /// `None` when the request did not mention a logo
    pub logo: Option<Option<Vec<u8>>>,
}

fn decode_logo(encoded: &str) -> Result<Vec<u8>, ApiError> {
    let data = match encoded.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map(|(_, data)| data).unwrap_or(rest),
        None => encoded,
    };
    STANDARD
        .decode(data.trim())
        .map_err(|e| ApiError::bad_request("Logo must be base64 encoded", e))
}

impl TryFrom<CafeRequest> for CafePayload {
    type Error = ApiError;

    fn try_from(body: CafeRequest) -> Result<Self, Self::Error> {
        let logo = match body.logo {
            Some(Some(encoded)) if !encoded.is_empty() => Some(Some(decode_logo(&encoded)?)),
            Some(_) => Some(None),
            None => None,
        };
        Ok(Self {
            id: body.id,
            name: body.name,
            description: body.description,
            location: body.location,
            logo,
        })
    }
}

impl CafePayload {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut payload = CafePayload::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request("Invalid multipart body", e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            if name == "logo" {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request("Invalid logo upload", e.body_text()))?;
                // Browsers send an empty part when no file was chosen.
                if !bytes.is_empty() {
                    payload.logo = Some(Some(bytes.to_vec()));
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request("Invalid multipart body", e.body_text()))?;
            match name.as_str() {
                "id" => payload.id = Some(value),
                "name" => payload.name = Some(value),
                "description" => payload.description = Some(value),
                "location" => payload.location = Some(value),
                other => debug!(field = other, "Ignoring unknown multipart field"),
            }
        }
        Ok(payload)
    }
}

#[async_trait]
impl<S> FromRequest<S> for CafePayload
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("multipart/form-data"))
            .unwrap_or(false);

        if is_multipart {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| ApiError::bad_request("Invalid multipart body", e.body_text()))?;
            return CafePayload::from_multipart(multipart).await;
        }

        let Json(body) = Json::<CafeRequest>::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request("Invalid JSON body", e.body_text()))?;
        CafePayload::try_from(body)
    }
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CafeListQuery {
    /// Exact location match
    pub location: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/cafes",
    params(CafeListQuery),
    responses(
        (status = 200, description = "Cafes ordered by employee count, highest first", body = [CafeResponse]),
        (status = 500, description = "Internal server error", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn list_cafes(
    State(state): State<AppState>,
    Query(query): Query<CafeListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let cafes = state
        .services
        .cafes
        .list(query.location.as_deref())
        .await?;
    Ok(success_response(cafes))
}

#[utoipa::path(
    get,
    path = "/cafe/{id}",
    params(("id" = String, Path, description = "Cafe UUID")),
    responses(
        (status = 200, description = "Cafe with its employee count", body = CafeResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn get_cafe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cafe = state.services.cafes.get(&id).await?;
    Ok(success_response(cafe))
}

#[utoipa::path(
    post,
    path = "/cafe",
    request_body(content = CafeRequest, description = "JSON, or multipart/form-data with a `logo` file part"),
    responses(
        (status = 201, description = "Cafe created", body = CafeResponse),
        (status = 400, description = "Missing required fields", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn create_cafe(
    State(state): State<AppState>,
    payload: CafePayload,
) -> Result<impl IntoResponse, ApiError> {
    let (Some(name), Some(description), Some(location)) = (
        present(payload.name),
        present(payload.description),
        present(payload.location),
    ) else {
        return Err(ApiError::ValidationError(MISSING_REQUIRED_FIELDS.to_string()));
    };

    let cafe = state
        .services
        .cafes
        .create(CreateCafeInput {
            name,
            description,
            location,
            logo: payload.logo.flatten(),
        })
        .await?;
    Ok(created_response(cafe))
}

#[utoipa::path(
    put,
    path = "/cafe",
    request_body(content = CafeRequest, description = "`id` plus any fields to change"),
    responses(
        (status = 200, description = "Cafe updated", body = CafeResponse),
        (status = 400, description = "Cafe ID is required", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn update_cafe(
    State(state): State<AppState>,
    payload: CafePayload,
) -> Result<impl IntoResponse, ApiError> {
    let Some(id) = present(payload.id) else {
        return Err(ApiError::ValidationError("Cafe ID is required".to_string()));
    };

    let cafe = state
        .services
        .cafes
        .update(
            &id,
            UpdateCafeInput {
                name: payload.name,
                description: payload.description,
                location: payload.location,
                logo: payload.logo,
            },
        )
        .await?;
    Ok(success_response(cafe))
}

#[utoipa::path(
    delete,
    path = "/cafe/{id}",
    params(("id" = String, Path, description = "Cafe UUID")),
    responses(
        (status = 200, description = "Cafe and its employees deleted", body = crate::handlers::common::MessageResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn delete_cafe(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.services.cafes.delete(&id).await?;
    Ok(message_response("Cafe and all associated employees deleted"))
}

#[utoipa::path(
    get,
    path = "/cafe/{id}/logo",
    params(("id" = String, Path, description = "Cafe UUID")),
    responses(
        (status = 200, description = "Raw logo bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 404, description = "Cafe or logo not found", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn get_cafe_logo(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let logo = state.services.cafes.logo(&id).await?;
    Ok((
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        )],
        logo,
    )
        .into_response())
}

#[utoipa::path(
    put,
    path = "/cafe/{id}/logo",
    params(("id" = String, Path, description = "Cafe UUID")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream", description = "Raw image bytes; empty clears the logo"),
    responses(
        (status = 200, description = "Logo replaced", body = CafeResponse),
        (status = 400, description = "Logo too large", body = ErrorResponse),
        (status = 404, description = "Cafe not found", body = ErrorResponse),
    ),
    tag = "cafes"
)]
pub async fn put_cafe_logo(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let cafe = state.services.cafes.set_logo(&id, body.to_vec()).await?;
    Ok(success_response(cafe))
}

/// Cafe routes, mounted at the root
pub fn cafe_routes() -> Router<AppState> {
    Router::new()
        .route("/cafes", get(list_cafes))
        .route("/cafe", axum::routing::post(create_cafe).put(update_cafe))
        .route("/cafe/:id", get(get_cafe).delete(delete_cafe))
        .route("/cafe/:id/logo", get(get_cafe_logo).put(put_cafe_logo))
}
