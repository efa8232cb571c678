use crate::storage::LocalStorage;
use crate::Result;

/// Storage key of the login flag
pub const AUTH_KEY: &str = "isAuthenticated";

/// Placeholder login state: a flag in local storage, no credentials checked.
pub struct Session<S: LocalStorage> {
    storage: S,
}

impl<S: LocalStorage> Session<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn is_authenticated(&self) -> Result<bool> {
        Ok(self.storage.get_item(AUTH_KEY)?.as_deref() == Some("true"))
    }

    /// Mark the session as logged in. `email` is only logged.
    pub fn login(&mut self, email: &str) -> Result<()> {
        self.storage.set_item(AUTH_KEY, "true")?;
        tracing::info!(email, "logged in");
        Ok(())
    }

    pub fn logout(&mut self) -> Result<()> {
        self.storage.remove_item(AUTH_KEY)?;
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_login_logout() {
        let mut session = Session::new(MemoryStorage::new());
        assert!(!session.is_authenticated().unwrap());

        session.login("usuario@gmail.com").unwrap();
        assert!(session.is_authenticated().unwrap());

        session.logout().unwrap();
        assert!(!session.is_authenticated().unwrap());
    }

    #[test]
    fn test_only_literal_true_counts() {
        let session = Session::new(MemoryStorage::new().with_item(AUTH_KEY, "yes"));
        assert!(!session.is_authenticated().unwrap());
    }
}
