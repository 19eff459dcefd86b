//! # PetFriends client
//!
//! One method per remote operation. Every method returns the response as
//! received, whatever its status; only local and transport failures are
//! errors.

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::Url;
use tracing::{debug, warn};

use crate::auth::{AUTH_KEY_HEADER, AuthKey, Credentials};
use crate::history::{History, HistoryEntry, unix_timestamp};
use crate::http::{
    ApiResponse, ClientError, FilePart, HttpMethod, RequestInput, parse_base_url, send_request,
};
use crate::pets::{PetFilter, PetForm};

pub const DEFAULT_BASE_URL: &str = "https://petfriends.skillfactory.ru/";

const PHOTO_FIELD: &str = "pet_photo";

pub struct PetFriends {
    http: reqwest::Client,
    base_url: Url,
    history: Mutex<History>,
}

impl PetFriends {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_timeout(base_url, None)
    }

    /// Build a client; `None` keeps reqwest's default (no) timeout.
    pub fn with_timeout(base_url: &str, timeout: Option<Duration>) -> Result<Self, ClientError> {
        let base_url = parse_base_url(base_url)?;
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(ClientError::Build)?;

        Ok(Self {
            http,
            base_url,
            history: Mutex::new(History::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `GET api/key` with the credentials in the `email` and `password` headers.
    pub async fn get_api_key(&self, credentials: &Credentials) -> Result<ApiResponse, ClientError> {
        let request = RequestInput::new(HttpMethod::Get, "api/key")
            .header("email", credentials.email.as_str())
            .header("password", credentials.password.as_str());
        self.execute(request).await
    }

    pub async fn get_list_of_pets(
        &self,
        key: Option<&AuthKey>,
        filter: PetFilter,
    ) -> Result<ApiResponse, ClientError> {
        let request = with_key(RequestInput::new(HttpMethod::Get, "api/pets"), key)
            .query("filter", filter.as_query_value());
        self.execute(request).await
    }

    pub async fn add_new_pet(
        &self,
        key: Option<&AuthKey>,
        pet: &PetForm,
        photo: &Path,
    ) -> Result<ApiResponse, ClientError> {
        let request = with_key(RequestInput::new(HttpMethod::Post, "api/pets"), key)
            .multipart(pet.fields(), vec![photo_part(photo)]);
        self.execute(request).await
    }

    pub async fn add_pet_without_photo(
        &self,
        key: Option<&AuthKey>,
        pet: &PetForm,
    ) -> Result<ApiResponse, ClientError> {
        let request = with_key(RequestInput::new(HttpMethod::Post, "api/create_pet_simple"), key)
            .form(pet.fields());
        self.execute(request).await
    }

    pub async fn add_pet_photo(
        &self,
        key: Option<&AuthKey>,
        pet_id: &str,
        photo: &Path,
    ) -> Result<ApiResponse, ClientError> {
        let path = format!("api/pets/set_photo/{pet_id}");
        let request = with_key(RequestInput::new(HttpMethod::Post, path), key)
            .multipart(Vec::new(), vec![photo_part(photo)]);
        self.execute(request).await
    }

    pub async fn update_pet_info(
        &self,
        key: Option<&AuthKey>,
        pet_id: &str,
        pet: &PetForm,
    ) -> Result<ApiResponse, ClientError> {
        let path = format!("api/pets/{pet_id}");
        let request = with_key(RequestInput::new(HttpMethod::Put, path), key).form(pet.fields());
        self.execute(request).await
    }

    pub async fn delete_pet(
        &self,
        key: Option<&AuthKey>,
        pet_id: &str,
    ) -> Result<ApiResponse, ClientError> {
        let path = format!("api/pets/{pet_id}");
        let request = with_key(RequestInput::new(HttpMethod::Delete, path), key);
        self.execute(request).await
    }

    /// Remove and return recorded requests, oldest first.
    pub fn take_history(&self) -> Vec<HistoryEntry> {
        match self.history.lock() {
            Ok(mut history) => history.drain_chronological(),
            Err(_) => Vec::new(),
        }
    }

    pub fn clear_history(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }

    async fn execute(&self, request: RequestInput) -> Result<ApiResponse, ClientError> {
        let method = request.method;
        let url = format!("{}{}", self.base_url, request.path);
        debug!(%method, %url, "sending request");

        let result = send_request(&self.http, &self.base_url, request).await;
        match &result {
            Ok(response) => debug!(%method, %url, status = response.status, "request finished"),
            Err(err) => warn!(%method, %url, error = %err, "request failed"),
        }

        if let Ok(mut history) = self.history.lock() {
            history.push(HistoryEntry {
                timestamp: unix_timestamp(),
                method,
                url,
                status: result.as_ref().ok().map(|response| response.status),
                duration_ms: result.as_ref().ok().map(|response| response.duration_ms),
            });
        }

        result
    }
}

fn with_key(request: RequestInput, key: Option<&AuthKey>) -> RequestInput {
    match key {
        Some(key) => request.header(AUTH_KEY_HEADER, key.as_str()),
        None => request,
    }
}

fn photo_part(photo: &Path) -> FilePart {
    FilePart {
        field: PHOTO_FIELD.to_string(),
        path: photo.to_path_buf(),
    }
}
