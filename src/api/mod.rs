pub mod image;
pub mod routes;

pub use routes::{router, ApiState};
