// Session store - Observable identity state fed by the identity provider
use crate::application::identity_provider::IdentityProvider;
use crate::domain::session::{SessionIdentity, User};
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;

/// Injected rather than global so tests can drive it with a fake provider.
/// Cloning shares the same underlying state.
#[derive(Clone)]
pub struct SessionStore {
    state: Arc<watch::Sender<SessionIdentity>>,
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionIdentity::initial());
        Self {
            state: Arc::new(state),
        }
    }

    pub fn snapshot(&self) -> SessionIdentity {
        self.state.borrow().clone()
    }

    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user.clone()
    }

    /// Provider callback: any report, signed in or not, ends the loading phase
    pub fn set_user(&self, user: Option<User>) {
        self.state.send_if_modified(|identity| {
            let next = SessionIdentity::resolved(user);
            if *identity == next {
                return false;
            }
            *identity = next;
            true
        });
    }

    /// Current identity first, then each change
    pub fn subscribe(&self) -> WatchStream<SessionIdentity> {
        WatchStream::new(self.state.subscribe())
    }

    /// Resolves once the provider has reported for the first time
    pub async fn resolved(&self) -> SessionIdentity {
        let mut identities = self.subscribe();
        while let Some(identity) = identities.next().await {
            if !identity.loading {
                return identity;
            }
        }
        // Sender lives in self, so the stream can't end while we wait
        self.snapshot()
    }

    /// Forward the provider's auth-state stream into this store until either
    /// side goes away.
    pub fn attach(&self, provider: Arc<dyn IdentityProvider>) -> JoinHandle<()> {
        let store = self.clone();
        let mut changes = provider.auth_state();
        tokio::spawn(async move {
            while let Some(user) = changes.next().await {
                match &user {
                    Some(u) => tracing::info!("Signed in as {}", u.email),
                    None => tracing::info!("No active session"),
                }
                store.set_user(user);
            }
            tracing::debug!("Auth state stream ended");
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}
