//! Trailmap client: mirrors a bundle/path/place REST store into local state
//! and keeps map visuals in step with it.
//!
//! SYSTEM CONTEXT
//! ==============
//! `net` talks to the server, `state` holds the local mirror, the session and
//! the notice slot, `map` draws through an abstract surface, and `view` wires
//! them into the public and admin controllers.

pub mod config;
pub mod error;
pub mod map;
pub mod net;
pub mod state;
pub mod view;

#[cfg(test)]
pub(crate) mod test_helpers;
