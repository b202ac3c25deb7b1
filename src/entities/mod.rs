pub mod cafe;
pub mod employee;
