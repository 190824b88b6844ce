//! API implementation submodules.
//!
//! Each submodule contains `impl SearchApi` blocks that extend the public API
//! with domain-specific methods. The struct definition remains in `lib.rs`.

mod connection;
mod index;
mod search;
mod state;

pub(crate) use state::ApiState;
