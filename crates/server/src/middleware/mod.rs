//! HTTP middleware stack for the FitHero API.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (capture errors, trace requests)
//! 2. `TraceLayer` (request tracing)
//! 3. CORS (browser frontend origins from config)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)

pub mod auth;
pub mod cors;
pub mod session;

pub use auth::{OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use cors::create_cors_layer;
pub use session::create_session_layer;
