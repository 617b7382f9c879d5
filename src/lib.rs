//! HTTP facade that resolves feature flags for a frontend through a
//! flag-evaluation backend (flagd).

pub mod client;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod provider;
pub mod routes;
pub mod state;

pub use client::FlagClient;
pub use config::Config;
pub use evaluation::{build_context, EvaluationContext, EvaluationDetails};
pub use provider::{FlagProvider, FlagdProvider, InMemoryProvider};
pub use state::AppState;
