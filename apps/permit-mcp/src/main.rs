use clap::Parser;

use permit_mcp::Args;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;

	let args = Args::parse();

	permit_mcp::run(args).await
}
