pub mod extractor;
pub mod parameter_error_handler;

pub use extractor::{CallerId, SafeClassIdI64, SafeIDI64, USER_ID_HEADER};
pub use parameter_error_handler::json_error_handler;
pub use parameter_error_handler::query_error_handler;
