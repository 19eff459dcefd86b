//! Simulated PetFriends service for offline tests.
//!
//! Each test binary uses a different subset of these helpers.
#![allow(dead_code)]

use std::path::PathBuf;
use std::time::Duration;

use mockito::{Matcher, Mock, Server, ServerGuard};
use petcheck::environment::Settings;
use petcheck::Credentials;
use serde_json::{json, Value};

pub const EMAIL: &str = "owner@petcheck.test";
pub const PASSWORD: &str = "correct-horse";
pub const INVALID_EMAIL: &str = "ghost@petcheck.test";
pub const INVALID_PASSWORD: &str = "wrong-password";
pub const AUTH_KEY: &str = "0f1e2d3c4b5a69788796a5b4c3d2e1f0";

pub fn images_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("images")
}

pub fn pet(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "animal_type": "kitty",
        "age": "3",
        "pet_photo": "",
        "created_at": "1700000000.0",
        "user_id": "u1"
    })
}

pub fn pet_list(ids: &[&str]) -> String {
    let pets: Vec<Value> = ids.iter().map(|id| pet(id, "Extra")).collect();
    json!({ "pets": pets }).to_string()
}

/// Mock server plus the mocks registered on it; mocks live as long as this.
pub struct MockService {
    pub server: ServerGuard,
    mocks: Vec<Mock>,
}

impl MockService {
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
            mocks: Vec::new(),
        }
    }

    pub fn url(&self) -> String {
        self.server.url()
    }

    pub fn settings(&self) -> Settings {
        Settings {
            base_url: self.url(),
            credentials: Credentials::new(EMAIL, PASSWORD),
            invalid_email: INVALID_EMAIL.to_string(),
            invalid_password: INVALID_PASSWORD.to_string(),
            images_dir: images_dir(),
            timeout: Some(Duration::from_secs(10)),
            environment: None,
        }
    }

    pub fn keep(&mut self, mock: Mock) {
        self.mocks.push(mock);
    }

    /// Valid credentials get a key; the configured invalid ones get 403.
    pub async fn with_login(&mut self) {
        let ok = self
            .server
            .mock("GET", "/api/key")
            .match_header("email", EMAIL)
            .match_header("password", PASSWORD)
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(json!({ "key": AUTH_KEY }).to_string())
            .create_async()
            .await;
        let bad_email = self
            .server
            .mock("GET", "/api/key")
            .match_header("email", INVALID_EMAIL)
            .with_status(403)
            .with_body("This user wasn't found in database")
            .create_async()
            .await;
        let bad_password = self
            .server
            .mock("GET", "/api/key")
            .match_header("email", EMAIL)
            .match_header("password", INVALID_PASSWORD)
            .with_status(403)
            .with_body("This user wasn't found in database")
            .create_async()
            .await;
        self.mocks.extend([ok, bad_email, bad_password]);
    }

    /// Static listing for `filter`.
    pub async fn with_pets(&mut self, filter: &str, ids: &[&str]) {
        let mock = self
            .server
            .mock("GET", "/api/pets")
            .match_header("auth_key", AUTH_KEY)
            .match_query(Matcher::UrlEncoded("filter".into(), filter.into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(pet_list(ids))
            .create_async()
            .await;
        self.keep(mock);
    }

    /// Any request with an unknown key is refused.
    pub async fn with_key_check(&mut self) {
        let mock = self
            .server
            .mock("GET", "/api/pets")
            .match_header("auth_key", "invalid_key")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("<title>403 Forbidden</title> Please provide 'auth_key' Header")
            .create_async()
            .await;
        self.keep(mock);
    }

    pub async fn with_response(&mut self, method: &str, path: &str, status: usize, body: &str) {
        let mock = self
            .server
            .mock(method, path)
            .match_header("auth_key", AUTH_KEY)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;
        self.keep(mock);
    }
}
