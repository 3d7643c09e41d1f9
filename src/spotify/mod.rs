//! # Spotify Integration Module
//!
//! This module is the integration layer between spafcli and the Spotify Web
//! API. It handles authentication, HTTP communication, retries, rate limiting
//! and pagination for the three resources an artist analysis needs.
//!
//! ## Architecture
//!
//! ```text
//! Catalog Pipeline (management)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (client credentials)
//!     ├── Request executor (retry, 401 re-auth, pagination)
//!     └── Resources (albums, tracks, audio features)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Core Modules
//!
//! - [`auth`] - Client-credentials exchange against the token endpoint
//! - [`client`] - [`SpotifyClient`], the retrying GET executor and page walker
//! - [`retry`] - Backoff policy and `Retry-After` parsing
//! - `albums`, `tracks`, `features` - Resource endpoints on top of the client
//!
//! ## Error Handling
//!
//! ### Rate Limiting
//! - **Retry-After Headers**: Respects Spotify's recommended retry timing
//! - **Exponential Backoff**: Used when no hint is given, with jitter
//! - **Abnormal Hints**: Delays above two minutes fail fast with a warning
//!
//! ### Network Resilience
//! - **Service Errors**: 5xx responses and transport failures are retried
//! - **Client Errors**: Other 4xx responses are never retried
//!
//! ### Authentication Errors
//! - **Token Expiration**: Credentials are renewed four minutes before expiry
//! - **Revoked Tokens**: A 401 triggers one re-authentication and retry
//!
//! ## API Coverage
//!
//! - `POST /api/token` - Client-credentials grant
//! - `GET /artists/{id}/albums` - Artist's albums
//! - `GET /albums/{id}/tracks` - Album track listing
//! - `GET /audio-features/{id}` - Per-track audio analysis
//!
//! ## Thread Safety
//!
//! [`SpotifyClient`] is `Clone + Send + Sync`; clones share the connection
//! pool and the [`crate::management::TokenManager`].

mod albums;
pub mod auth;
pub mod client;
mod features;
pub mod retry;
mod tracks;

pub use client::SpotifyClient;
