pub mod api_response;
pub mod datetime;

pub use api_response::{ApiFailure, ApiResponse, SUCCESS_CODE};
