//! `calculate-bmi`: body mass index from weight and height.

use serde::Deserialize;

use crate::tools::{ArgSchema, TypedTool, render_number};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BmiArgs {
    pub weight_kg: f64,
    pub height_m: f64,
}

pub struct CalculateBmiTool;

impl TypedTool for CalculateBmiTool {
    type Args = BmiArgs;

    fn name(&self) -> &str {
        "calculate-bmi"
    }

    fn description(&self) -> &str {
        "Calculate body mass index from weight in kilograms and height in meters"
    }

    fn arg_schema(&self) -> ArgSchema {
        ArgSchema::new().number("weightKg").number("heightM")
    }

    // A zero height yields Infinity or NaN; that is returned as text, not an error.
    async fn run(&self, args: BmiArgs) -> anyhow::Result<String> {
        Ok(render_number(args.weight_kg / (args.height_m * args.height_m)))
    }
}
