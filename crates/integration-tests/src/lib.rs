//! Shared helpers for the cross-crate tests.
//!
//! - [`fixtures::LinearAlgebra`]: a small catalog with hidden, orphan and
//!   foreign records mixed in.
//! - [`scripted::ScriptedStore`]: a catalog whose calls can be held back or
//!   made to fail, to replay races and outages deterministically.

pub mod fixtures;
pub mod scripted;
