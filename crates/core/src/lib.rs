//! Core types for the dockforge build matrix.
//!
//! This crate defines the two build axes and their cross product
//! ([`matrix`]), the identity of every target in the pipeline
//! ([`identity`]), the immutable build-metadata context ([`context`]) and
//! the validated configuration document ([`config`]).
//!
//! Everything here is pure data: no network, no processes, no graph. The
//! generation strategies live in `dockforge-generate` and plan assembly in
//! `dockforge-plan`.

pub mod config;
pub mod context;
pub mod errors;
pub mod identity;
pub mod matrix;

pub use config::{ImageCoordinates, MatrixConfig};
pub use context::BuildContext;
pub use errors::{Error, Result};
pub use identity::{Flavor, TargetIdentity, TargetKind};
pub use matrix::{OsVariant, RuntimeVersion, VariantKey, VariantMatrix};
