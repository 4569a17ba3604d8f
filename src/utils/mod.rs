pub mod error;
pub mod log_parser;

pub use error::{ApiError, ApiJson, ApiResult};
pub use log_parser::{parse_line, parse_lines};
