pub mod cookies;
pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod router;
