//! Tool registry and the built-in tools.
//!
//! Tools are registered once at startup and invoked by name with arguments
//! validated against each tool's declared schema.

mod error;
mod number;
mod registry;
mod schema;

pub use error::ToolError;
pub use number::render_number;
pub use registry::{ToolHandler, ToolRegistry, TypedTool};
pub use schema::{ArgKind, ArgSchema, ArgSpec, ArgViolation};

// Built-in tool implementations
mod add;
mod calculate_bmi;
mod echo;
mod fetch_weather;

pub use add::AddTool;
pub use calculate_bmi::CalculateBmiTool;
pub use echo::EchoTool;
pub use fetch_weather::{DEFAULT_WEATHER_BASE_URL, FetchWeatherTool, UpstreamFetchFailed};

impl ToolRegistry {
    /// Registry holding the four built-in tools in their advertised order.
    pub fn builtin(weather: FetchWeatherTool) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        registry.register(AddTool)?;
        registry.register(EchoTool)?;
        registry.register(CalculateBmiTool)?;
        registry.register(weather)?;
        Ok(registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::JsonObject;
    use serde_json::json;

    fn builtin() -> ToolRegistry {
        let base = url::Url::parse("http://127.0.0.1:1").unwrap();
        ToolRegistry::builtin(FetchWeatherTool::new(reqwest::Client::new(), &base))
            .expect("builtin names are unique")
    }

    async fn call_text(registry: &ToolRegistry, name: &str, args: serde_json::Value) -> String {
        let args: JsonObject = args.as_object().cloned().unwrap();
        let result = registry.invoke(name, args).await.expect("tool succeeds");
        let value = serde_json::to_value(&result).unwrap();
        value["content"][0]["text"].as_str().unwrap().to_string()
    }

    #[test]
    fn registers_builtin_tools_in_order() {
        assert_eq!(
            builtin().list_names(),
            vec!["add", "echo", "calculate-bmi", "fetch-weather"]
        );
    }

    #[tokio::test]
    async fn builtin_tools_answer_through_the_registry() {
        let registry = builtin();
        assert_eq!(call_text(&registry, "add", json!({ "a": 2, "b": 3 })).await, "5");
        assert_eq!(
            call_text(&registry, "echo", json!({ "message": "hi" })).await,
            "Tool echo: hi"
        );
        assert_eq!(
            call_text(&registry, "calculate-bmi", json!({ "weightKg": 70, "heightM": 1.75 }))
                .await,
            "22.857142857142858"
        );
        assert_eq!(
            call_text(&registry, "calculate-bmi", json!({ "weightKg": 70, "heightM": 0 })).await,
            "Infinity"
        );
    }

    #[tokio::test]
    async fn weather_transport_failure_surfaces_as_execution_failure() {
        let registry = builtin();
        let args = json!({ "city": "Oslo" }).as_object().cloned().unwrap();

        let err = registry.invoke("fetch-weather", args).await.unwrap_err();

        match err {
            ToolError::ToolExecutionFailed { ref tool, ref source } => {
                assert_eq!(tool, "fetch-weather");
                assert!(source.downcast_ref::<UpstreamFetchFailed>().is_some());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn every_builtin_rejects_empty_arguments() {
        let registry = builtin();
        for name in registry.list_names() {
            let err = registry.invoke(&name, JsonObject::new()).await.unwrap_err();
            assert!(
                matches!(err, ToolError::InvalidArguments { .. }),
                "{name} accepted empty arguments"
            );
        }
    }
}
