//! Building blocks shared by the engine and its collaborators.

/// Address decomposition into tag, index and offset fields.
pub mod addr;

/// Error taxonomy for configuration, trace input and engine invariants.
pub mod error;
