//! SeaORM entities for users, listings, comments and favorites, plus
//! connection setup shared by the service layer and the server.

pub mod errors;
pub mod db;
pub mod user;
pub mod listing;
pub mod comment;
pub mod favorite;
