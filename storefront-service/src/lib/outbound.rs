pub mod cache;
pub mod payments;
pub mod repositories;
