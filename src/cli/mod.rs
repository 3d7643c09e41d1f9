//! # CLI Module
//!
//! User-facing commands of spafcli. Each command loads [`crate::config::Settings`],
//! delegates to the management and Spotify layers, and handles progress
//! feedback and error presentation.
//!
//! ## Commands
//!
//! - [`auth`] - Verifies the configured client credentials
//! - [`analyze`] - Fetches an artist's catalog and prints per-track feature means
//!
//! ## Architecture Design
//!
//! ```text
//! CLI Layer (User Interface)
//!     ↓
//! Management Layer (Token Manager, Catalog Pipeline)
//!     ↓
//! API Layer (Spotify Integration)
//!     ↓
//! Network Layer (HTTP Requests)
//! ```
//!
//! ## Usage Patterns
//!
//! ```bash
//! spafcli auth                                   # Check credentials
//! spafcli analyze 4NHQUGzhtTLFvgF5SZesLK         # Table sorted by name
//! spafcli analyze 4NHQUGzhtTLFvgF5SZesLK --sort danceability
//! spafcli analyze 4NHQUGzhtTLFvgF5SZesLK --json  # Machine-readable output
//! ```
//!
//! Fatal errors are printed with [`crate::error!`], which exits the process;
//! soft failures during a run are printed with [`crate::warning!`].

mod analyze;
mod auth;

pub use analyze::SortKey;
pub use analyze::analyze;
pub use auth::auth;
