pub mod errors;
pub mod handlers;
pub mod jobs;
pub mod middleware;
pub mod routes;
pub mod solve;

pub use errors::ErrorResponse;
pub use routes::create_router;
