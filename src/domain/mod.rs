//! Domain records for the tourism catalog.

pub mod entities;
