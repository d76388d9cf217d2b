//! Sessions and sign in state.
//!
//! Users sign in through an identity proxy in front of the app. The proxy
//! forwards the user's identity in a request header, which
//! [session_middleware] turns into a [Session]. Changes to a user's sign in
//! state are published on [AuthEvents].

mod events;
mod log_out;
mod session;
mod stream;

pub use events::{AuthEvent, AuthEvents, AuthState, AuthSubscription};
pub use log_out::get_log_out;
pub use session::{Session, session_middleware};
pub use stream::get_auth_events;

/// The header the identity proxy puts the user's identity in by default.
pub const DEFAULT_AUTH_HEADER: &str = "x-authenticated-user";

/// Where to find the signed in user and where to send them to sign out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthConfig {
    /// The request header that holds the user's external ID.
    pub header: String,
    /// The identity proxy URL that ends the proxy session.
    pub sign_out_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            header: DEFAULT_AUTH_HEADER.to_owned(),
            sign_out_url: "/".to_owned(),
        }
    }
}
