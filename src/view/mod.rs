//! Screen controllers.
//!
//! SYSTEM CONTEXT
//! ==============
//! `public` and `admin` each own a bundle store and a map adapter for their
//! surface; `nav` owns the login flow and decides which of the two is shown.

pub mod admin;
pub mod mode;
pub mod nav;
pub mod public;
