//! Concrete collaborators for the run loop.

pub mod in_memory;
pub mod process;
pub mod validation;
