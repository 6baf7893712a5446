//! HTTP API in front of the school backend.

pub mod audit;
pub mod error;
pub mod grades;
pub mod middleware;
pub mod monitoring;
pub mod results;
pub mod routes;
pub mod semesters;
pub mod status;

pub use routes::*;
