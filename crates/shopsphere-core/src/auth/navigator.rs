use std::sync::{Arc, Mutex};

use tracing::info;

/// Route the console treats as its login screen.
pub const LOGIN_PATH: &str = "/login";

/// Host-side navigation hooks.
///
/// The session store calls [`Navigator::redirect_to_login`] after it has
/// cleared every credential; the host is expected to drop any in-memory state
/// tied to the old session. The API client asks for the current path to avoid
/// tearing the session down again while the user is already on the login
/// screen.
pub trait Navigator: Send + Sync {
    fn current_path(&self) -> String;
    fn redirect_to_login(&self);
}

/// Navigator for hosts without a UI: tracks a path and logs redirects.
#[derive(Debug, Clone)]
pub struct HeadlessNavigator {
    path: Arc<Mutex<String>>,
}

impl HeadlessNavigator {
    pub fn new(initial_path: &str) -> Self {
        Self {
            path: Arc::new(Mutex::new(initial_path.to_string())),
        }
    }

    pub fn navigate(&self, path: &str) {
        let mut current = self.path.lock().unwrap_or_else(|p| p.into_inner());
        *current = path.to_string();
    }
}

impl Default for HeadlessNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for HeadlessNavigator {
    fn current_path(&self) -> String {
        self.path.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    fn redirect_to_login(&self) {
        info!("Session ended, returning to login");
        self.navigate(LOGIN_PATH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_navigator_redirect() {
        let nav = HeadlessNavigator::new("/vendors");
        assert_eq!(nav.current_path(), "/vendors");

        nav.redirect_to_login();
        assert_eq!(nav.current_path(), LOGIN_PATH);

        // Clones share the same location
        let other = nav.clone();
        other.navigate("/orders");
        assert_eq!(nav.current_path(), "/orders");
    }
}
