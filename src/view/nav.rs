//! Navigation bar controller: login/logout and the route that follows.

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;

use std::sync::Arc;

use crate::error::ApiError;
use crate::net::payload::LoginForm;
use crate::state::session::SessionGate;

use super::mode::Route;

pub struct Nav {
    session: Arc<SessionGate>,
    route: Route,
}

impl Nav {
    /// Start on the admin screen when a persisted session exists.
    pub fn new(session: Arc<SessionGate>) -> Self {
        let route = if session.is_authenticated() { Route::Admin } else { Route::Public };
        Self { session, route }
    }

    #[must_use]
    pub fn route(&self) -> Route {
        self.route
    }

    #[must_use]
    pub fn logged_in(&self) -> bool {
        self.session.is_authenticated()
    }

    /// Submit the form; it is cleared whatever the outcome.
    ///
    /// # Errors
    ///
    /// Returns the API error; the notice has already been shown.
    pub async fn login(&mut self, form: &mut LoginForm) -> Result<(), ApiError> {
        let result = self.session.login(form).await;
        form.clear();
        if result.is_ok() {
            self.route = Route::Admin;
        }
        result
    }

    /// # Errors
    ///
    /// Returns the API error; the route is left unchanged.
    pub async fn logout(&mut self) -> Result<(), ApiError> {
        self.session.logout().await?;
        self.route = Route::Public;
        Ok(())
    }
}
