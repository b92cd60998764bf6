//! Server configuration: command-line flags with environment fallbacks.

use std::fmt;

use clap::Args;
use url::Url;

use crate::tools::DEFAULT_WEATHER_BASE_URL;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Flags for `serve`. Every flag can also come from the environment (or a
/// `.env` file loaded at startup).
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, env = "HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Shared secret clients must send in the `x-api-key` header
    #[arg(long, env = "API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Put the API-key guard in front of the transport routes
    #[arg(long, env = "REQUIRE_API_KEY", default_value_t = false)]
    pub require_api_key: bool,

    /// Base URL of the weather service used by `fetch-weather`
    #[arg(long, env = "WEATHER_API_BASE_URL", default_value = DEFAULT_WEATHER_BASE_URL)]
    pub weather_base_url: Url,
}

/// Which HTTP surface the server exposes.
#[derive(Clone, PartialEq, Eq)]
pub enum ServerMode {
    /// Transport routes plus `/health`, no access control.
    Open,
    /// Transport routes behind the API-key guard, no `/health`.
    Guarded { api_key: Option<String> },
}

impl fmt::Debug for ServerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("Open"),
            Self::Guarded { api_key } => f
                .debug_struct("Guarded")
                .field("api_key", &api_key.as_ref().map(|_| "<redacted>"))
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub mode: ServerMode,
    pub weather_base_url: Url,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<ServeArgs> for ServerConfig {
    fn from(args: ServeArgs) -> Self {
        let mode = if args.require_api_key {
            ServerMode::Guarded {
                api_key: args.api_key.filter(|key| !key.is_empty()),
            }
        } else {
            ServerMode::Open
        };

        Self {
            host: args.host,
            port: args.port,
            mode,
            weather_base_url: args.weather_base_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServerConfig {
        let mut argv = vec!["sample-sse-server"];
        argv.extend_from_slice(args);
        TestCli::try_parse_from(argv).unwrap().serve.into()
    }

    #[test]
    fn explicit_flags_build_an_open_config() {
        let config = parse(&[
            "--port",
            "4000",
            "--host",
            "127.0.0.1",
            "--weather-base-url",
            "http://localhost:9000/weather",
        ]);
        assert_eq!(config.bind_addr(), "127.0.0.1:4000");
        assert_eq!(config.weather_base_url.as_str(), "http://localhost:9000/weather");
    }

    #[test]
    fn require_api_key_selects_guarded_mode() {
        let config = parse(&["--require-api-key", "--api-key", "s3cret"]);
        assert_eq!(
            config.mode,
            ServerMode::Guarded {
                api_key: Some("s3cret".into())
            }
        );
    }

    #[test]
    fn empty_api_key_counts_as_unset() {
        let config = parse(&["--require-api-key", "--api-key", ""]);
        assert_eq!(config.mode, ServerMode::Guarded { api_key: None });
    }

    #[test]
    fn debug_output_redacts_the_key() {
        let mode = ServerMode::Guarded {
            api_key: Some("s3cret".into()),
        };
        let rendered = format!("{:?}", mode);
        assert!(!rendered.contains("s3cret"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn invalid_weather_url_is_rejected() {
        let result =
            TestCli::try_parse_from(["sample-sse-server", "--weather-base-url", "not a url"]);
        assert!(result.is_err());
    }
}
