//! Multipart upload to the receipt-parsing service.

use std::net::IpAddr;
use std::path::PathBuf;

use log::{debug, info};
use reqwest::Url;
use reqwest::blocking::Client;
use reqwest::blocking::multipart::Form;

use crate::domain::{ReceiptRecord, UploadResponse};
use crate::error::AppError;

/// Endpoint used when neither `--endpoint` nor `RECEIPTS_ENDPOINT` is set.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000/upload";

/// Environment variable (or `.env` key) overriding the endpoint.
pub const ENDPOINT_ENV: &str = "RECEIPTS_ENDPOINT";

/// Multipart field name, repeated once per file.
pub const FIELD_NAME: &str = "receipts";

/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct UploadClient {
    client: Client,
    endpoint: Url,
}

impl UploadClient {
    pub fn new(endpoint: &str) -> Result<Self, AppError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| AppError::usage(format!("Invalid upload endpoint '{endpoint}': {e}")))?;

        // One attempt, no deadline. Callers that must stay responsive run the
        // upload off their own thread.
        let mut builder = Client::builder().timeout(None);
        if is_loopback(&endpoint) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| AppError::transport(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, endpoint })
    }

    /// Resolve the endpoint from an explicit override, then the environment
    /// (`.env` included), then [`DEFAULT_ENDPOINT`].
    pub fn from_env(endpoint: Option<&str>) -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        match endpoint {
            Some(url) => Self::new(url),
            None => {
                let url = std::env::var(ENDPOINT_ENV).unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
                Self::new(&url)
            }
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Send every file in one multipart POST and return the parsed receipts in
    /// the order the service produced them.
    ///
    /// Files are not filtered by type or size; the service decides what it can
    /// parse.
    pub fn upload(&self, files: &[PathBuf]) -> Result<Vec<ReceiptRecord>, AppError> {
        let mut form = Form::new();
        for path in files {
            form = form.file(FIELD_NAME, path).map_err(|e| {
                AppError::io(format!("Failed to read receipt file '{}': {e}", path.display()))
            })?;
        }

        info!("uploading {} file(s) to {}", files.len(), self.endpoint);

        let resp = self
            .client
            .post(self.endpoint.clone())
            .multipart(form)
            .send()
            .map_err(|e| AppError::transport(format!("Upload to {} failed: {e}", self.endpoint)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::status(format!(
                "Upload to {} failed with status {status}.",
                self.endpoint
            )));
        }

        let body = resp
            .text()
            .map_err(|e| AppError::transport(format!("Failed to read upload response: {e}")))?;

        let parsed = parse_upload_response(&body)?;
        if let Some(message) = &parsed.message {
            debug!("service message: {message}");
        }
        debug!("received {} receipt record(s)", parsed.data.len());

        Ok(parsed.data)
    }
}

/// The parsing service normally runs on this machine; loopback traffic
/// never goes through `HTTP_PROXY`.
fn is_loopback(url: &Url) -> bool {
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .trim_matches(['[', ']'])
            .parse::<IpAddr>()
            .is_ok_and(|ip| ip.is_loopback()),
        None => false,
    }
}

/// Decode the service envelope, rejecting bodies that don't match the schema.
pub fn parse_upload_response(body: &str) -> Result<UploadResponse, AppError> {
    serde_json::from_str(body)
        .map_err(|e| AppError::decode(format!("Failed to parse upload response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::upload::test_server::{refused_endpoint, serve_once, temp_receipt};

    #[test]
    fn upload_sends_each_file_under_receipts_field() {
        let body = r#"{"message":"Receipts processed","data":[
            {"Date":"01/02/2024","Items":["Coffee"],"Prices":[3.5],"Total":3.5},
            {"Date":null,"Items":["Tea","Cake"],"Prices":[2.0],"Total":null}
        ]}"#;
        let (url, server) = serve_once("200 OK", body);

        let a = temp_receipt("a.jpg", b"first");
        let b = temp_receipt("b.png", b"second");
        let client = UploadClient::new(&url).unwrap();
        let records = client.upload(&[a.clone(), b.clone()]).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].date.as_deref(), Some("01/02/2024"));
        assert_eq!(records[1].items, vec!["Tea", "Cake"]);

        let request = server.join().unwrap();
        assert!(request.starts_with("POST /upload"));
        assert_eq!(request.matches("name=\"receipts\"").count(), 2);
        assert!(request.contains("first"));
        assert!(request.contains("second"));

        let _ = std::fs::remove_file(a);
        let _ = std::fs::remove_file(b);
    }

    #[test]
    fn non_success_status_is_a_status_error() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"boom"}"#);
        let file = temp_receipt("c.jpg", b"x");
        let client = UploadClient::new(&url).unwrap();

        let err = client.upload(&[file.clone()]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Status);
        assert!(err.to_string().contains("500"));

        server.join().unwrap();
        let _ = std::fs::remove_file(file);
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let (url, server) = serve_once("200 OK", r#"{"data":[{"Date":"x","Prices":[1]}]}"#);
        let client = UploadClient::new(&url).unwrap();

        let err = client.upload(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        server.join().unwrap();
    }

    #[test]
    fn refused_connection_is_a_transport_error() {
        let client = UploadClient::new(&refused_endpoint()).unwrap();
        let err = client.upload(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let client = UploadClient::new(DEFAULT_ENDPOINT).unwrap();
        let missing = std::env::temp_dir().join("receipts-upload-does-not-exist.jpg");
        let err = client.upload(&[missing]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Io);
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = UploadClient::new("not a url").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn loopback_hosts_are_detected() {
        assert!(is_loopback(&Url::parse("http://127.0.0.1:5000/upload").unwrap()));
        assert!(is_loopback(&Url::parse("http://localhost/upload").unwrap()));
        assert!(is_loopback(&Url::parse("http://[::1]:5000/upload").unwrap()));
        assert!(!is_loopback(&Url::parse("https://receipts.example.com/upload").unwrap()));
    }

    #[test]
    fn parse_requires_items() {
        let err = parse_upload_response(r#"{"data":[{"Prices":[1.0]}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode);

        let ok = parse_upload_response(r#"{"data":[]}"#).unwrap();
        assert!(ok.data.is_empty());
        assert!(ok.message.is_none());
    }
}
