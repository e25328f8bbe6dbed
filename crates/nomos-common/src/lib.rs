//! Nomos Common - Shared types for the compliance engine
//!
//! This crate provides the primitives every Nomos crate agrees on:
//! - Entity identifiers
//! - Repository error type
//! - Engine error taxonomy
//!
//! # Error taxonomy
//!
//! | Variant        | Meaning                                  | Retried |
//! |----------------|------------------------------------------|---------|
//! | `NotFound`     | referenced entity does not exist         | never   |
//! | `InvalidInput` | precondition violated by the caller      | never   |
//! | `InvalidState` | operation not allowed in current state   | never   |
//! | `Storage`      | persistence failure, passed through as-is | never   |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod id;

pub use error::*;
pub use id::EntityId;
