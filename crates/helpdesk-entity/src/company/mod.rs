//! Company entities.

pub mod model;

pub use model::{Company, CompanySummary, CreateCompany, UpdateCompany};
