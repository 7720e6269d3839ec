//! Map surface port and the adapter that keeps it in step with the store.
//!
//! SYSTEM CONTEXT
//! ==============
//! `surface` is the boundary to the external widget, `memory` a headless
//! implementation of it. `adapter` draws store contents through the port,
//! tracking live handles in `cache`; `bounds` computes viewport fits.

pub mod adapter;
pub mod bounds;
pub mod cache;
pub mod memory;
pub mod surface;
