//! View-mode state machine shared by the controllers.

use crate::net::types::{Bundle, Path, Place};

/// Which admin screen is active. Every operation ends in `ListBundles`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ViewMode {
    #[default]
    ListBundles,
    AddBundle,
    EditBundle,
    AddPath,
    EditPath,
    AddPlace,
    EditPlace,
}

/// The single draft slot. At most one entity is under construction at a time.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Draft {
    #[default]
    None,
    Bundle(Bundle),
    Path(Path),
    Place(Place),
}

impl Draft {
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Screen the controllers want shown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Route {
    /// Anonymous map.
    #[default]
    Public,
    Admin,
}
