use async_trait::async_trait;
use futures::TryStreamExt;
use percent_encoding::percent_decode_str;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use url::Url;

use consorciatech_application::{DownloadedFile, FileProxy};
use consorciatech_core::{AppError, AppResult};

use crate::http_upstream;

const FALLBACK_FILE_NAME: &str = "download";

/// Bearer-authenticated pass-through to the file storage backend.
pub struct HttpFileProxy {
    http_client: reqwest::Client,
    base_url: Url,
    bearer_token: String,
}

impl HttpFileProxy {
    /// Creates a proxy restricted to files under `base_url`.
    pub fn new(
        http_client: reqwest::Client,
        base_url: &str,
        bearer_token: impl Into<String>,
    ) -> AppResult<Self> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_owned()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(normalized.as_str()).map_err(|error| {
            AppError::Validation(format!("DOWNLOAD_BASE_URL is not a valid url: {error}"))
        })?;

        Ok(Self {
            http_client,
            base_url,
            bearer_token: bearer_token.into(),
        })
    }

    /// Resolves a storage path or absolute URL, refusing anything outside the base.
    fn resolve(&self, file: &str) -> AppResult<Url> {
        let file = file.trim();
        if file.split(['/', '\\']).any(|segment| segment == "..")
            || file.to_ascii_lowercase().contains("%2e%2e")
        {
            return Err(AppError::Validation(
                "file path must not contain '..' segments".to_owned(),
            ));
        }

        let resolved = match Url::parse(file) {
            Ok(absolute) => {
                if absolute.origin() != self.base_url.origin() {
                    return Err(AppError::Forbidden(
                        "file url is outside the storage origin".to_owned(),
                    ));
                }
                absolute
            }
            Err(url::ParseError::RelativeUrlWithoutBase) => self
                .base_url
                .join(file.trim_start_matches('/'))
                .map_err(|error| AppError::Validation(format!("invalid file path: {error}")))?,
            Err(error) => {
                return Err(AppError::Validation(format!("invalid file url: {error}")));
            }
        };

        if !resolved.as_str().starts_with(self.base_url.as_str()) {
            return Err(AppError::Forbidden(
                "file url is outside the storage base path".to_owned(),
            ));
        }

        Ok(resolved)
    }
}

/// Decoded last path segment of a storage URL, also splitting encoded object paths.
fn file_name(url: &Url) -> String {
    let segment = url
        .path_segments()
        .and_then(|mut segments| segments.rfind(|segment| !segment.is_empty()))
        .unwrap_or(FALLBACK_FILE_NAME);

    let lowered = segment.to_ascii_lowercase();
    let encoded = match lowered.rfind("%2f") {
        Some(index) => &segment[index + 3..],
        None => segment,
    };
    let decoded = percent_decode_str(encoded).decode_utf8_lossy();

    let sanitized: String = decoded
        .chars()
        .filter(|character| {
            !character.is_control() && !matches!(character, '"' | '\\' | '/')
        })
        .collect();
    let sanitized = sanitized.trim();

    if sanitized.is_empty() {
        FALLBACK_FILE_NAME.to_owned()
    } else {
        sanitized.to_owned()
    }
}

#[async_trait]
impl FileProxy for HttpFileProxy {
    async fn fetch(&self, file: &str) -> AppResult<DownloadedFile> {
        let url = self.resolve(file)?;
        let file_name = file_name(&url);

        let request = self
            .http_client
            .get(url)
            .bearer_auth(self.bearer_token.as_str());
        let response = http_upstream::send(request, "file download").await?;
        let response = http_upstream::ensure_success(response, "file download").await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned);
        let content_length = headers
            .get(CONTENT_LENGTH)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.parse::<u64>().ok());

        let body = response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(|error| AppError::Unavailable(format!("file download interrupted: {error}")));

        Ok(DownloadedFile {
            content_type,
            content_length,
            file_name,
            body: Box::pin(body),
        })
    }
}
