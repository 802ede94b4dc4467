//! HTTP server for linkhash.
//!
//! A thin adapter over [`linkhash_store::LinkStore`]:
//!
//! - `POST /` with `{"link": "..."}` stores the link and answers
//!   `201 Created` with `{"link": "<base_url>/<key>", "key": "<key>"}`
//! - `GET /:key` answers `303 See Other` to the stored link, or `404`
//! - `GET /v1/health` and `GET /v1/info`

pub mod config;
pub mod error;
pub mod handler;
pub mod message;
pub mod router;
pub mod server;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use message::{CreateLinkRequest, CreateLinkResponse, HealthResponse};
pub use router::{build_router, AppState};
pub use server::LinkServer;
