//! Infrastructure adapters: persistence, HTTP and telemetry.

pub mod db;
pub mod error;
pub mod http;
pub mod telemetry;
