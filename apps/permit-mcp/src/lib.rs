pub mod server;

use std::{net::SocketAddr, path::PathBuf, sync::Arc};

use clap::Parser;
use color_eyre::{Result, eyre};
use tracing_subscriber::EnvFilter;

use permit_config::Security;
use permit_service::{PermitService, PermitTools};

#[derive(Debug, Parser)]
#[command(
	version = permit_cli::VERSION,
	about = permit_cli::ABOUT,
	rename_all = "kebab",
	styles = permit_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum McpAuthState {
	Off,
	StaticToken { bearer_token: String },
}

pub async fn run(args: Args) -> Result<()> {
	let config = permit_config::load(&args.config)?;

	init_tracing(&config.service.log_level);

	let bind_addr = config.service.mcp_bind.clone();
	let auth_state = build_auth_state(&config.security, &bind_addr)?;
	let tools = Arc::new(PermitTools::new(PermitService::new(config)?));

	server::serve_mcp(&bind_addr, auth_state, tools).await
}

fn init_tracing(log_level: &str) {
	let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

	tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn build_auth_state(security: &Security, mcp_bind: &str) -> Result<McpAuthState> {
	match security.auth_mode.trim() {
		"off" => {
			enforce_loopback_for_off_mode(mcp_bind)?;

			Ok(McpAuthState::Off)
		},
		"static_token" => match security.auth_token.as_deref().map(str::trim) {
			Some(token) if !token.is_empty() =>
				Ok(McpAuthState::StaticToken { bearer_token: token.to_string() }),
			_ => Err(eyre::eyre!(
				"security.auth_token is required when security.auth_mode=static_token."
			)),
		},
		other => Err(eyre::eyre!(
			"security.auth_mode must be one of off or static_token for permit-mcp, got {other}."
		)),
	}
}

fn enforce_loopback_for_off_mode(mcp_bind: &str) -> Result<()> {
	let bind_addr: SocketAddr = mcp_bind.parse().map_err(|err| {
		eyre::eyre!(
			"service.mcp_bind must be a valid socket address when security.auth_mode=off: {err}"
		)
	})?;

	if !bind_addr.ip().is_loopback() {
		return Err(eyre::eyre!(
			"service.mcp_bind must be a loopback address when security.auth_mode=off."
		));
	}

	Ok(())
}

#[cfg(test)]
mod tests {
	use crate::{McpAuthState, build_auth_state};
	use permit_config::Security;

	fn security(auth_mode: &str, auth_token: Option<&str>) -> Security {
		Security { auth_mode: auth_mode.to_string(), auth_token: auth_token.map(str::to_string) }
	}

	#[test]
	fn off_mode_requires_loopback_mcp_bind() {
		let err = build_auth_state(&security("off", None), "0.0.0.0:9090")
			.expect_err("Expected a loopback error.");

		assert!(err.to_string().contains("security.auth_mode=off"), "Unexpected error: {err}");
		assert_eq!(
			build_auth_state(&security("off", None), "127.0.0.1:9090").expect("Auth state."),
			McpAuthState::Off
		);
	}

	#[test]
	fn static_token_mode_uses_configured_token() {
		let auth_state = build_auth_state(&security("static_token", Some(" token-1 ")), "0.0.0.0:9090")
			.expect("Auth state.");

		assert_eq!(auth_state, McpAuthState::StaticToken { bearer_token: "token-1".to_string() });
	}

	#[test]
	fn static_token_mode_rejects_blank_token() {
		let err = build_auth_state(&security("static_token", Some("  ")), "127.0.0.1:9090")
			.expect_err("Expected a missing token error.");

		assert!(err.to_string().contains("security.auth_token"), "Unexpected error: {err}");
	}

	#[test]
	fn unknown_mode_is_rejected() {
		assert!(build_auth_state(&security("static_keys", None), "127.0.0.1:9090").is_err());
	}
}
