//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Registration, login and bearer-token verification live here; password hashing
//! and JWT handling are split into `password` and `token`.

pub mod domain;
pub mod errors;
pub mod password;
pub mod repository;
pub mod repo;
pub mod service;
pub mod token;

pub use service::{AuthConfig, AuthService};
