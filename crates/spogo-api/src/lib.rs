// spogo-api: Async clients for Spotify's web-player protocol and the documented Web API

pub mod connect;
pub mod cookies;
pub mod dealer;
pub mod error;
pub mod hash;
pub mod local;
pub mod pathfinder;
pub mod session;
pub mod token;
pub mod totp;
pub mod transport;
pub mod web;

pub use connect::{ConnectClient, ConnectState};
pub use cookies::{Cookie, CookieSource, FileCookieSource, StaticCookieSource};
pub use error::Error;
pub use hash::HashResolver;
pub use local::{LocalPlayer, LocalStatus};
pub use pathfinder::Pathfinder;
pub use session::{Credentials, Session};
pub use totp::{SecretCache, TotpEngine};
pub use transport::{Endpoints, TransportConfig};
pub use web::{WebClient, WebOptions};
