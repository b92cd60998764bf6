//! `echo`: returns the message with a fixed prefix.

use serde::Deserialize;

use crate::tools::{ArgSchema, TypedTool};

#[derive(Debug, Deserialize)]
pub struct EchoArgs {
    pub message: String,
}

pub struct EchoTool;

impl TypedTool for EchoTool {
    type Args = EchoArgs;

    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echo a message back"
    }

    fn arg_schema(&self) -> ArgSchema {
        ArgSchema::new().string("message")
    }

    async fn run(&self, args: EchoArgs) -> anyhow::Result<String> {
        Ok(format!("Tool echo: {}", args.message))
    }
}
