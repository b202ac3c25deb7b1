//! Business logic over the `cafes` and `employees` tables.

pub mod cafes;
pub mod employees;

use crate::config::AppConfig;

pub use cafes::{CafeResponse, CafeService, CreateCafeInput, UpdateCafeInput};
pub use employees::{CreateEmployeeInput, EmployeeResponse, EmployeeService, UpdateEmployeeInput};

/// Tunables shared by the services.
#[derive(Debug, Clone, Copy)]
pub struct ServiceSettings {
    /// Fresh identifiers tried before an insert is abandoned
    pub id_generation_attempts: u32,
    /// Largest logo accepted for a cafe
    pub max_logo_bytes: usize,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            id_generation_attempts: 5,
            max_logo_bytes: 5 * 1024 * 1024,
        }
    }
}

impl From<&AppConfig> for ServiceSettings {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            id_generation_attempts: cfg.id_generation_attempts.max(1),
            max_logo_bytes: cfg.max_logo_bytes,
        }
    }
}
