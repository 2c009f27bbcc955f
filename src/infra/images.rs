use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, header::CONTENT_TYPE};

use crate::application::repos::{FetchedImage, ImageFetchError, ImageFetcher};

/// Downloads inline image sources over HTTP.
#[derive(Clone, Debug)]
pub struct HttpImageFetcher {
    client: Client,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

pub(crate) fn user_agent() -> &'static str {
    concat!("docweave/", env!("CARGO_PKG_VERSION"))
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, uri: &str) -> Result<FetchedImage, ImageFetchError> {
        let response = self
            .client
            .get(uri)
            .send()
            .await
            .map_err(|err| ImageFetchError::Request(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImageFetchError::Status(status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let data = response
            .bytes()
            .await
            .map_err(|err| ImageFetchError::Request(err.to_string()))?;

        Ok(FetchedImage { data, content_type })
    }
}
