pub mod api;

pub use api::{ApiError, ErrorBody};
