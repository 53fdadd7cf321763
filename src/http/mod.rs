//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (request ID, payload parsing)
//!     → FlowDispatcher (dispatch / release / monitor)
//!     → response.rs (JSON bodies, error → status code)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{BalanceRequest, ReleaseRequest, X_REQUEST_ID};
pub use response::{BalanceResponse, ErrorResponse, StatusResponse};
pub use server::{AppState, HttpServer};
