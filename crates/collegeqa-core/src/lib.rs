#![deny(unused_variables)]

//! Domain types, traits, configuration and the corpus builder shared by every
//! collegeqa crate.

pub mod config;
pub mod corpus;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
