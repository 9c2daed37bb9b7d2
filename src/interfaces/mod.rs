//! Adapters between the run loop and tabular files.

pub mod csv;
