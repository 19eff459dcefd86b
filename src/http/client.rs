use std::path::Path;
use std::time::Instant;

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::multipart::{Form, Part};
use reqwest::Url;
use tracing::debug;

use super::error::ClientError;
use super::request::{FilePart, RequestBody, RequestInput};
use super::response::{ApiResponse, ResponseBody};

pub async fn send_request(
    client: &reqwest::Client,
    base_url: &Url,
    request: RequestInput,
) -> Result<ApiResponse, ClientError> {
    let method: reqwest::Method = request.method.into();
    let mut url = base_url.join(&request.path).map_err(|e| ClientError::InvalidUrl {
        url: format!("{base_url}{}", request.path),
        reason: e.to_string(),
    })?;

    if !request.query.is_empty() {
        let mut query_pairs = url.query_pairs_mut();
        for (key, value) in &request.query {
            query_pairs.append_pair(key, value);
        }
    }

    let mut req_builder = client.request(method, url);
    req_builder = apply_headers(req_builder, &request.headers)?;

    req_builder = match request.body {
        RequestBody::Empty => req_builder,
        RequestBody::Form(fields) => req_builder.form(&fields),
        RequestBody::Multipart { fields, files } => {
            req_builder.multipart(build_multipart(fields, &files).await?)
        }
    };

    let started = Instant::now();
    let response = req_builder.send().await?;
    let elapsed = started.elapsed().as_millis();

    let status = response.status();
    let headers = format_headers(response.headers());
    let bytes = response.bytes().await?;
    let size_bytes = bytes.len();

    debug!(status = status.as_u16(), size_bytes, elapsed_ms = elapsed as u64, "response received");

    Ok(ApiResponse {
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or("Unknown").to_string(),
        duration_ms: elapsed,
        size_bytes,
        headers,
        body: ResponseBody::from_bytes(&bytes),
    })
}

/// Parse a base URL, making sure relative paths join beneath it.
pub fn parse_base_url(raw: &str) -> Result<Url, ClientError> {
    let raw = raw.trim();
    let normalized = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{raw}/")
    };

    Url::parse(&normalized).map_err(|e| ClientError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })
}

/// MIME type for an upload, chosen from the file extension.
pub fn photo_mime(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        _ => "application/octet-stream",
    }
}

async fn build_multipart(
    fields: Vec<(String, String)>,
    files: &[FilePart],
) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (key, value) in fields {
        form = form.text(key, value);
    }

    for file in files {
        // Read fully so the handle is closed before the request goes out.
        let bytes = tokio::fs::read(&file.path)
            .await
            .map_err(|source| ClientError::Photo {
                path: file.path.clone(),
                source,
            })?;
        let file_name = file
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.field.clone());
        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(photo_mime(&file.path))?;
        form = form.part(file.field.clone(), part);
    }

    Ok(form)
}

fn format_headers(headers: &reqwest::header::HeaderMap) -> String {
    let mut lines = Vec::new();
    for (name, value) in headers {
        let value = value.to_str().unwrap_or("<binary>");
        lines.push(format!("{name}: {value}"));
    }
    lines.join("\n")
}

fn apply_headers(
    mut req_builder: reqwest::RequestBuilder,
    headers: &[(String, String)],
) -> Result<reqwest::RequestBuilder, ClientError> {
    for (key, value) in headers {
        let header_name = HeaderName::from_bytes(key.as_bytes()).map_err(|e| ClientError::InvalidHeader {
            name: key.clone(),
            reason: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| ClientError::InvalidHeader {
            name: key.clone(),
            reason: e.to_string(),
        })?;
        req_builder = req_builder.header(header_name, header_value);
    }

    Ok(req_builder)
}
