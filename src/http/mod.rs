pub mod client;
pub mod error;
pub mod method;
pub mod request;
pub mod response;

pub use client::{parse_base_url, send_request};
pub use error::ClientError;
pub use method::HttpMethod;
pub use request::{FilePart, RequestBody, RequestInput};
pub use response::{ApiResponse, ResponseBody};
