use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use strive_core::{Credentials, PasswordChange, Registration, User, UserData};

use crate::ports::{PersistError, UserGateway};

/// Current-user state cell.
///
/// Holds the latest known user for late subscribers and broadcasts every
/// change. Constructed explicitly and passed where needed; there is no
/// ambient singleton.
pub struct Session {
    gateway: Arc<dyn UserGateway>,
    user_tx: watch::Sender<Option<User>>,
}

impl Session {
    pub fn new(gateway: Arc<dyn UserGateway>) -> Self {
        let (user_tx, _) = watch::channel(None);
        Self { gateway, user_tx }
    }

    pub fn user(&self) -> watch::Receiver<Option<User>> {
        self.user_tx.subscribe()
    }

    pub fn current_user(&self) -> Option<User> {
        self.user_tx.borrow().clone()
    }

    /// Resolve the server-side session into a user. A failed lookup means
    /// signed out, not an error.
    pub async fn load(&self) {
        match self.gateway.profile().await {
            Ok(user) => {
                let _ = self.user_tx.send(Some(user));
            }
            Err(err) => {
                debug!(%err, "profile lookup failed; treating as signed out");
                let _ = self.user_tx.send(None);
            }
        }
    }

    pub async fn login(&self, creds: &Credentials) -> Result<(), PersistError> {
        let user = self.gateway.login(creds).await?;
        let _ = self.user_tx.send(Some(user));
        Ok(())
    }

    pub async fn sign_up(&self, reg: &Registration) -> Result<(), PersistError> {
        let user = self.gateway.sign_up(reg).await?;
        let _ = self.user_tx.send(Some(user));
        Ok(())
    }

    pub async fn update_profile(&self, data: &UserData) -> Result<(), PersistError> {
        let user = self.gateway.update_profile(data).await?;
        let _ = self.user_tx.send(Some(user));
        Ok(())
    }

    pub async fn update_password(&self, change: &PasswordChange) -> Result<(), PersistError> {
        self.gateway.update_password(change).await
    }

    pub fn logout(&self) {
        let _ = self.user_tx.send(None);
    }
}
