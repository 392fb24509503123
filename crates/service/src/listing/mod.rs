//! Listings: creation, lookup, owner-only mutation, filtered search and favorites.

pub mod domain;
mod favorites;
pub mod filter;
pub mod service;

pub use domain::{CreateListingInput, FilterOptions, ListingPayload, UpdateListingInput};
pub use service::ListingService;
