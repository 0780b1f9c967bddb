//! # Ranklane Core
//!
//! Foundational types shared by every HTTP-facing Ranklane crate.
//!
//! - [`errors`]: the application error type and its HTTP response conversion
//!
//! # Example
//!
//! ```ignore
//! use ranklane_core::errors::AppError;
//!
//! let error = AppError::not_found(anyhow::anyhow!("Class not found"));
//! ```

pub mod errors;

pub use errors::AppError;
