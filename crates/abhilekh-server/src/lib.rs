//! Abhilekh Server - HTTP search API for the video archive
//!
//! Exposes the search router over four GET endpoints:
//!
//! - `/search`: classify the query and return `{results, metadata}`
//! - `/search/keyword`: raw lexical ranked list
//! - `/search/semantic`: raw vector-similarity ranked list
//! - `/search/combined`: raw hybrid ranked list

pub mod error;
pub mod routes;
pub mod state;

pub use routes::app;
pub use state::AppState;
