pub mod cafes;
pub mod common;
pub mod employees;

use crate::{
    db::DbPool,
    services::{CafeService, EmployeeService, ServiceSettings},
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub cafes: Arc<CafeService>,
    pub employees: Arc<EmployeeService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, settings: ServiceSettings) -> Self {
        Self {
            cafes: Arc::new(CafeService::new(db_pool.clone(), settings)),
            employees: Arc::new(EmployeeService::new(db_pool, settings)),
        }
    }
}
