//! `fetch-weather`: proxies a city lookup to an external weather endpoint.
//!
//! The city is appended to the base URL as a raw path segment and the
//! upstream body is returned verbatim. Only transport-level failures are
//! errors; a non-success status is logged and its body still returned.

use std::fmt;

use serde::Deserialize;
use tracing::{debug, warn};
use url::Url;

use crate::tools::{ArgSchema, TypedTool};

/// Base URL used when none is configured.
pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.weather.com";

/// The outbound weather request could not be completed.
#[derive(Debug)]
pub struct UpstreamFetchFailed {
    pub url: String,
    source: reqwest::Error,
}

impl fmt::Display for UpstreamFetchFailed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Upstream fetch of {} failed: {}", self.url, self.source)
    }
}

impl std::error::Error for UpstreamFetchFailed {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

#[derive(Debug, Deserialize)]
pub struct FetchWeatherArgs {
    pub city: String,
}

pub struct FetchWeatherTool {
    http: reqwest::Client,
    base_url: String,
}

impl FetchWeatherTool {
    pub fn new(http: reqwest::Client, base_url: &Url) -> Self {
        Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint_for(&self, city: &str) -> String {
        format!("{}/{}", self.base_url, city)
    }
}

impl TypedTool for FetchWeatherTool {
    type Args = FetchWeatherArgs;

    fn name(&self) -> &str {
        "fetch-weather"
    }

    fn description(&self) -> &str {
        "Fetch current weather for a city from the weather service"
    }

    fn arg_schema(&self) -> ArgSchema {
        ArgSchema::new().string("city")
    }

    async fn run(&self, args: FetchWeatherArgs) -> anyhow::Result<String> {
        let url = self.endpoint_for(&args.city);
        debug!(%url, "fetching weather");

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|source| UpstreamFetchFailed {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%url, %status, "weather upstream returned non-success status");
        }

        let body = response
            .text()
            .await
            .map_err(|source| UpstreamFetchFailed { url, source })?;

        Ok(body)
    }
}
