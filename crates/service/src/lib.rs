//! Service layer providing the business operations of the lost-pet platform on top of models.
//! - Separates business logic from data access and from HTTP.
//! - Reuses entity definitions and validation in the `models` crate.
//! - Every operation returns `ServiceError`, a closed set mapped to HTTP statuses by the server.

pub mod errors;
pub mod validation;
pub mod pagination;
pub mod views;
pub mod auth;
pub mod listing;
pub mod comment_service;
pub mod user_service;
pub mod seed;
mod txn;
#[cfg(test)]
pub mod test_support;
#[cfg(test)]
mod tests;
