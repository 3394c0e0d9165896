//! Types shared between the bill client core, its store adapters and front ends.

pub mod domain;
pub mod error;
pub mod protocol;
