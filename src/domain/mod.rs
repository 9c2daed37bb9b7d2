//! Domain types and the ports through which the run loop reaches its
//! collaborators.

pub mod config;
pub mod failure;
pub mod phase;
pub mod ports;
pub mod transaction;
