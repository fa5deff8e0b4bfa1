//! Auth-domain data models: the identity profile and provider-issued token material.

pub mod profile;
pub mod token;

pub use profile::*;
pub use token::*;
