//! Element model consumed by the resolvers

pub mod config;
pub mod element;

pub use config::*;
pub use element::*;
