//! Black-box checks for the PetFriends pet catalog REST API.
//!
//! [`api::PetFriends`] wraps the service's endpoints; [`testing`] holds the
//! scenarios that exercise them and the runner that reports on a run.

pub mod api;
pub mod auth;
pub mod cli;
pub mod environment;
pub mod history;
pub mod http;
pub mod pets;
pub mod storage;
pub mod testing;

pub use api::PetFriends;
pub use auth::{AuthKey, Credentials};
pub use environment::Settings;
pub use http::{ApiResponse, ClientError};
pub use pets::{Pet, PetFilter, PetForm, PetList};
