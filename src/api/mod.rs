mod error;
pub mod ingest;
pub mod models;
mod server;
pub mod state;
pub mod validate;

pub use error::ApiError;
pub use server::{router, run};
