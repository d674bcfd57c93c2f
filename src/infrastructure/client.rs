use reqwest::StatusCode;
use reqwest::blocking::{Client, Response};
use tracing::debug;
use url::Url;

use crate::application::{ApiError, FormApi};
use crate::domain::{CheckResponse, ErrorBody, SubmitRequest};

/// [`FormApi`] over HTTP using a blocking `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpFormApi {
    client: Client,
    base: Url,
}

impl HttpFormApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let mut base =
            Url::parse(base_url).map_err(|e| ApiError::Transport(format!("{base_url}: {e}")))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        Ok(Self {
            client: Client::new(),
            base,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport(format!("{} cannot be a base URL", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn rejection(response: Response) -> ApiError {
    let status = response.status().as_u16();
    let message = response
        .json::<ErrorBody>()
        .map(|body| body.error)
        .unwrap_or_else(|_| "no error details".to_string());
    ApiError::Rejected { status, message }
}

impl FormApi for HttpFormApi {
    fn check(&self, token: &str) -> Result<CheckResponse, ApiError> {
        let url = self.endpoint(&["api", "check", token])?;
        debug!(%url, "checking token");

        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        if !response.status().is_success() {
            return Err(rejection(response));
        }
        response
            .json::<CheckResponse>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn submit(&self, request: &SubmitRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["api", "submit"])?;
        debug!(%url, "submitting answers");

        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT => Err(ApiError::Duplicate),
            _ => Err(rejection(response)),
        }
    }
}
