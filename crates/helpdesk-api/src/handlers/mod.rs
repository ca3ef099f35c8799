//! Route handlers organized by domain.

pub mod attachment;
pub mod auth;
pub mod company;
pub mod dashboard;
pub mod health;
pub mod reference;
pub mod ticket;
pub mod user;
