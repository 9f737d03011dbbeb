//! Handler-facing HTTP types.
//!
//! # Data Flow
//! ```text
//! axum request
//!     → request.rs (HttpRequest: transport request + matched Route)
//!     → handler(&HttpRequest, &mut HttpResponse) → Box<dyn ActionResult>
//!     → result.rs (serve: headers → status → body)
//!     → response.rs (HttpResponse buffers, forwards writes)
//!     → writer.rs (ResponseWriter sink → axum Response)
//! ```

pub mod request;
pub mod response;
pub mod result;
pub mod status;
pub mod writer;

pub use request::{HttpRequest, X_REQUEST_ID};
pub use response::HttpResponse;
pub use result::{
    json_result, raw_result, ActionResult, BufferedResult, RawResult, RedirectResult,
    StatusResult, JSON_CONTENT_TYPE,
};
pub use status::{http_status, HttpStatus};
pub use writer::ResponseWriter;
