mod environment;
mod error;
mod extractors;
mod responses;

pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use extractors::ApiQuery;
pub use responses::{Created, NoContent};
