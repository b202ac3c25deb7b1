use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Cafe API",
        version = "1.0.0",
        description = r#"
# Cafe & Employee Management API

CRUD backend for cafes and the employees assigned to them.

- Cafes are listed with a live `employees_count`, busiest first, optionally filtered by `location`.
- Employees are listed by start date, optionally filtered by cafe name, and carry a computed `days_worked`.
- Deleting a cafe removes its employees in the same transaction.
- Logos are stored as raw bytes and returned base64 encoded in JSON.
"#
    ),
    paths(
        crate::handlers::cafes::list_cafes,
        crate::handlers::cafes::get_cafe,
        crate::handlers::cafes::create_cafe,
        crate::handlers::cafes::update_cafe,
        crate::handlers::cafes::delete_cafe,
        crate::handlers::cafes::get_cafe_logo,
        crate::handlers::cafes::put_cafe_logo,
        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,
    ),
    components(
        schemas(
            crate::services::CafeResponse,
            crate::services::EmployeeResponse,
            crate::handlers::cafes::CafeRequest,
            crate::handlers::employees::CreateEmployeeRequest,
            crate::handlers::employees::UpdateEmployeeRequest,
            crate::handlers::common::MessageResponse,
            crate::errors::ErrorResponse
        )
    ),
    tags(
        (name = "cafes", description = "Cafe management"),
        (name = "employees", description = "Employee management")
    )
)]
pub struct ApiDoc;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_cafe_and_employee_paths() {
        let openapi = ApiDoc::openapi();
        let json = serde_json::to_string_pretty(&openapi).unwrap();
        assert!(json.contains("Cafe API"));
        assert!(json.contains("/cafes"));
        assert!(json.contains("/cafe/{id}/logo"));
        assert!(json.contains("/employee/{id}"));
        assert!(json.contains("EmployeeResponse"));
    }
}
