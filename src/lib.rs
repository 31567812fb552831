//! CheckMedi: patient records and account registration.
//!
//! The server half lives in [`routes`] on top of a [`store`]; the client
//! half that drives a signup against it lives in [`signup`].

pub mod config;
pub mod error;
pub mod model;
pub mod routes;
pub mod signup;
pub mod store;
pub mod token;

/// Installs the fmt subscriber, filtered by `RUST_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
