//! A broadcast bus for changes to a user's sign in state.

use futures_core::Stream;
use serde::Serialize;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_stream::{StreamExt, wrappers::BroadcastStream};

use crate::{
    profile::Profile,
    user::{User, UserId},
};

/// The sign in state of a user after a change.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AuthState {
    /// The user is signed in. `profile` is `None` until the profile setup is done.
    SignedIn {
        user: User,
        profile: Option<Profile>,
    },
    /// The user signed out.
    SignedOut,
}

/// A change to the sign in state of one user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthEvent {
    /// The user whose state changed.
    pub user_id: UserId,
    /// The new state.
    pub state: AuthState,
}

/// Fans out [AuthEvent]s to any number of subscribers.
///
/// Publishing never blocks. Subscribers that fall more than the channel
/// capacity behind skip the events they missed.
#[derive(Debug, Clone)]
pub struct AuthEvents {
    sender: broadcast::Sender<AuthEvent>,
}

impl AuthEvents {
    /// Create a bus that buffers up to `capacity` events per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Send `event` to every current subscriber.
    pub fn publish(&self, event: AuthEvent) {
        // No subscribers is not an error.
        if let Ok(receiver_count) = self.sender.send(event) {
            tracing::debug!("Published auth event to {receiver_count} subscribers");
        }
    }

    /// Subscribe to the events of every user.
    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
            user_id: None,
        }
    }

    /// Subscribe to the events of one user.
    pub fn subscribe_user(&self, user_id: UserId) -> AuthSubscription {
        AuthSubscription {
            receiver: self.sender.subscribe(),
            user_id: Some(user_id),
        }
    }
}

/// The receiving end of [AuthEvents].
///
/// Dropping the subscription or calling [AuthSubscription::unsubscribe] stops delivery.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthEvent>,
    user_id: Option<UserId>,
}

impl AuthSubscription {
    /// Wait for the next event for this subscription.
    ///
    /// Returns `None` once the bus has been dropped.
    pub async fn next(&mut self) -> Option<AuthEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.accepts(&event) => return Some(event),
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Auth event subscriber fell behind, skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Stop receiving events.
    pub fn unsubscribe(self) {
        drop(self);
    }

    /// Turn the subscription into a stream of events, skipping any that were missed.
    pub fn into_stream(self) -> impl Stream<Item = AuthEvent> + Send + 'static {
        let user_id = self.user_id;

        BroadcastStream::new(self.receiver).filter_map(move |result| match result {
            Ok(event) if user_id.is_none_or(|id| id == event.user_id) => Some(event),
            Ok(_) => None,
            Err(error) => {
                tracing::warn!("Auth event stream fell behind: {error}");
                None
            }
        })
    }

    fn accepts(&self, event: &AuthEvent) -> bool {
        self.user_id.is_none_or(|id| id == event.user_id)
    }
}
