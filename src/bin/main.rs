use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

use sample_sse_server::{ServeArgs, ServerConfig, create_tool_registry, start_sse_server};

#[derive(Parser)]
#[command(name = "sample-sse-server")]
#[command(about = "Demo MCP server over HTTP+SSE")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP+SSE MCP server
    Serve(ServeArgs),
    /// Print the registered tool definitions as JSON
    Tools(ServeArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("sample_sse_server=info".parse()?)
                .add_directive("rmcp=warn".parse()?),
        )
        .with_max_level(Level::INFO)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = ServerConfig::from(args);
            info!(bind = %config.bind_addr(), mode = ?config.mode, "starting MCP SSE server");
            start_sse_server(config).await?;
        }
        Commands::Tools(args) => {
            let config = ServerConfig::from(args);
            let registry = create_tool_registry(&config)?;
            println!("{}", serde_json::to_string_pretty(&registry.list_tools())?);
        }
    }

    Ok(())
}
