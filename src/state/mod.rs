//! Client-side state.
//!
//! DESIGN
//! ======
//! State is split by concern: `bundles` is the entity tree, `session` the
//! authentication flag, `notice` the single user-visible message slot.

pub mod bundles;
pub mod notice;
pub mod session;
