//! # Ranklane CLI
//!
//! Operator tooling for file-backed partitions.
//!
//! - [`rebuild`]: drift repair for a stored partition
//! - [`seeder`]: builds a demo organization through the permission engine
//! - [`tree`]: renders an organization's delegation tree
//!
//! ```ignore
//! use ranklane_cli::seeder::{seed_organization, SeedConfig};
//!
//! let summary = seed_organization(&engine, admin, SeedConfig::default())?;
//! ```

pub mod rebuild;
pub mod seeder;
pub mod tree;
