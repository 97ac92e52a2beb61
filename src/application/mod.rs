//! Application services layer.

pub mod catalog;
pub mod codec;
pub mod error;
pub mod invalidation;
pub mod pagination;
pub mod principal;
pub mod reads;
pub mod tickets;
pub mod writes;
