//! `add`: sum of two numbers.

use serde::Deserialize;

use crate::tools::{ArgSchema, TypedTool, render_number};

#[derive(Debug, Deserialize)]
pub struct AddArgs {
    pub a: f64,
    pub b: f64,
}

pub struct AddTool;

impl TypedTool for AddTool {
    type Args = AddArgs;

    fn name(&self) -> &str {
        "add"
    }

    fn description(&self) -> &str {
        "Add two numbers"
    }

    fn arg_schema(&self) -> ArgSchema {
        ArgSchema::new().number("a").number("b")
    }

    async fn run(&self, args: AddArgs) -> anyhow::Result<String> {
        Ok(render_number(args.a + args.b))
    }
}
