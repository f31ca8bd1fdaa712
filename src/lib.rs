//! Client core of the course review application: backend traits, repositories and the logic of
//! every screen, plus the configuration shared with the dev backend binary.

pub mod backend;
pub mod config;
pub mod connectivity;
pub mod error;
pub mod repositories;
pub mod utils;
pub mod validation;
pub mod viewmodels;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};
