use std::{net::SocketAddr, sync::Arc};

use axum::{
	Router,
	body::Body,
	extract::State,
	http::{HeaderMap, Request},
	middleware::{self, Next},
	response::IntoResponse,
};
use color_eyre::Result;
use rmcp::{
	ErrorData, ServerHandler,
	handler::server::router::tool::ToolRouter,
	model::{CallToolResult, Content, JsonObject, ServerCapabilities, ServerInfo},
	transport::streamable_http_server::{
		StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
	},
};
use serde_json::Value;
use tokio::net::TcpListener;

use crate::McpAuthState;
use permit_service::{
	PermitTools,
	tools::{self, expiration_permit_types},
};

const HEADER_AUTHORIZATION: &str = "Authorization";
const PERMIT_TYPE_VALUES: [&str; 3] = ["PLO", "KKPR/KKPRL", "Ijin Lingkungan"];
const YEAR_OPERATOR_VALUES: [&str; 3] = ["equal", "greater", "less"];
const ORDER_VALUES: [&str; 2] = ["latest", "earliest"];

#[derive(Clone)]
pub struct PermitMcp {
	tools: Arc<PermitTools>,
	tool_router: ToolRouter<Self>,
}
impl PermitMcp {
	pub fn new(tools: Arc<PermitTools>) -> Self {
		Self { tools, tool_router: Self::tool_router() }
	}

	/// Names of every registered tool.
	pub fn tool_names() -> Vec<String> {
		Self::tool_router().list_all().into_iter().map(|tool| tool.name.to_string()).collect()
	}

	async fn dispatch(&self, name: &str, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		let text = self.tools.call(name, Value::Object(params)).await;

		Ok(CallToolResult::success(vec![Content::text(text)]))
	}
}

#[rmcp::tool_router]
impl PermitMcp {
	#[rmcp::tool(
		name = "get_permit_document_content",
		description = "Search permit document content. Use this first for any question about what a permit says, such as lengths, depths, requirements, or locations. Returns the most relevant passages as [title]: content blocks.",
		input_schema = keyword_schema()
	)]
	async fn get_permit_document_content(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_PERMIT_DOCUMENT_CONTENT, params).await
	}

	#[rmcp::tool(
		name = "get_current_date",
		description = "Get today's date in YYYY-MM-DD format for temporal calculations.",
		input_schema = empty_schema()
	)]
	async fn get_current_date(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_CURRENT_DATE, params).await
	}

	#[rmcp::tool(
		name = "get_time_difference",
		description = "Days from now_datetime to target_datetime (YYYY-MM-DD). Positive when the target is in the future, negative when in the past, 0 for malformed dates.",
		input_schema = time_difference_schema()
	)]
	async fn get_time_difference(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_TIME_DIFFERENCE, params).await
	}

	#[rmcp::tool(
		name = "get_list_documents_by_issue_year",
		description = "List permits issued in a year or year range. Operator 'equal' matches the year exactly, 'greater' matches the year or later, 'less' matches the year or earlier.",
		input_schema = issue_year_schema()
	)]
	async fn get_list_documents_by_issue_year(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_LIST_DOCUMENTS_BY_ISSUE_YEAR, params).await
	}

	#[rmcp::tool(
		name = "get_list_documents_by_expiration_year",
		description = "List permits expiring in a year or year range. Only PLO permits have expiration dates.",
		input_schema = expiration_year_schema()
	)]
	async fn get_list_documents_by_expiration_year(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_LIST_DOCUMENTS_BY_EXPIRATION_YEAR, params).await
	}

	#[rmcp::tool(
		name = "get_list_documents_already_expired",
		description = "List PLO permits whose expiration date is before today.",
		input_schema = expired_schema()
	)]
	async fn get_list_documents_already_expired(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_LIST_DOCUMENTS_ALREADY_EXPIRED, params).await
	}

	#[rmcp::tool(
		name = "get_list_documents_expiring_soon",
		description = "List PLO permits expiring between today and today plus the given number of days, with days remaining for each.",
		input_schema = expiring_soon_schema()
	)]
	async fn get_list_documents_expiring_soon(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_LIST_DOCUMENTS_EXPIRING_SOON, params).await
	}

	#[rmcp::tool(
		name = "get_permit_details",
		description = "Get full details and current status for one permit number.",
		input_schema = permit_details_schema()
	)]
	async fn get_permit_details(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_PERMIT_DETAILS, params).await
	}

	#[rmcp::tool(
		name = "get_permits_by_installation",
		description = "List permits whose installation name contains the given text, ignoring case.",
		input_schema = installation_schema()
	)]
	async fn get_permits_by_installation(
		&self,
		params: JsonObject,
	) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_PERMITS_BY_INSTALLATION, params).await
	}

	#[rmcp::tool(
		name = "get_list_organizations",
		description = "List every organization code that owns permit documents.",
		input_schema = empty_schema()
	)]
	async fn get_list_organizations(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_LIST_ORGANIZATIONS, params).await
	}

	#[rmcp::tool(
		name = "get_permit_statistics",
		description = "Permit counts as JSON: total, expired, active, by permit type, and by organization.",
		input_schema = empty_schema()
	)]
	async fn get_permit_statistics(&self, params: JsonObject) -> Result<CallToolResult, ErrorData> {
		self.dispatch(tools::GET_PERMIT_STATISTICS, params).await
	}
}

#[rmcp::tool_handler]
impl ServerHandler for PermitMcp {
	fn get_info(&self) -> ServerInfo {
		ServerInfo {
			instructions: Some(
				"Permit retrieval tools over the permit search index and metadata store.".to_string(),
			),
			capabilities: ServerCapabilities::builder().enable_tools().build(),
			..Default::default()
		}
	}
}

pub async fn serve_mcp(
	bind_addr: &str,
	auth_state: McpAuthState,
	tools: Arc<PermitTools>,
) -> Result<()> {
	let bind_addr: SocketAddr = bind_addr.parse()?;
	let session_manager: Arc<LocalSessionManager> = Default::default();
	let service = StreamableHttpService::new(
		move || Ok(PermitMcp::new(tools.clone())),
		session_manager,
		StreamableHttpServerConfig::default(),
	);
	let router = Router::new()
		.fallback_service(service)
		.layer(middleware::from_fn_with_state(auth_state, mcp_auth_middleware));
	let listener = TcpListener::bind(bind_addr).await?;

	tracing::info!(%bind_addr, "MCP server listening.");

	axum::serve(listener, router).await?;

	Ok(())
}

fn is_authorized(headers: &HeaderMap, auth_state: &McpAuthState) -> bool {
	match auth_state {
		McpAuthState::Off => true,
		McpAuthState::StaticToken { bearer_token } =>
			read_bearer_token(headers).is_some_and(|token| token == bearer_token),
	}
}

fn read_bearer_token(headers: &HeaderMap) -> Option<&str> {
	let raw = headers.get(HEADER_AUTHORIZATION)?;
	let value = raw.to_str().ok()?.trim();
	let token = value.strip_prefix("Bearer ")?.trim();

	if token.is_empty() { None } else { Some(token) }
}

async fn mcp_auth_middleware(
	State(auth_state): State<McpAuthState>,
	req: Request<Body>,
	next: Next,
) -> axum::response::Response {
	if !is_authorized(req.headers(), &auth_state) {
		tracing::warn!(uri = %req.uri(), "Rejected unauthenticated MCP request.");

		return (
			axum::http::StatusCode::UNAUTHORIZED,
			"Authentication required for security.auth_mode=static_token with a Bearer token.",
		)
			.into_response();
	}

	next.run(req).await
}

/// Allowed values for an optional argument, including an explicit `null`.
fn nullable_enum(values: &[&str]) -> Vec<Value> {
	values.iter().map(|value| Value::from(*value)).chain([Value::Null]).collect()
}

fn empty_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {}
	}))
}

fn keyword_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["keyword"],
		"properties": {
			"keyword": { "type": "string", "description": "Search query or keywords from the question." }
		}
	}))
}

fn time_difference_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["now_datetime", "target_datetime"],
		"properties": {
			"now_datetime": { "type": "string", "description": "Current date, YYYY-MM-DD." },
			"target_datetime": { "type": "string", "description": "Target date, YYYY-MM-DD." }
		}
	}))
}

fn year_schema(permit_types: Vec<&'static str>) -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {
			"permit_type": { "type": ["string", "null"], "enum": nullable_enum(&permit_types) },
			"year": { "type": ["integer", "null"] },
			"organization": {
				"type": ["string", "null"],
				"description": "Organization code such as PPN, PGN, KPI, or SHU."
			},
			"operator": {
				"type": ["string", "null"],
				"enum": nullable_enum(&YEAR_OPERATOR_VALUES),
				"description": "Applied only when year is also given."
			},
			"order_by": {
				"type": ["string", "null"],
				"enum": nullable_enum(&ORDER_VALUES),
				"default": "latest"
			}
		}
	}))
}

fn issue_year_schema() -> Arc<JsonObject> {
	year_schema(PERMIT_TYPE_VALUES.to_vec())
}

fn expiration_year_schema() -> Arc<JsonObject> {
	year_schema(expiration_permit_types())
}

fn expired_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {
			"organization": { "type": ["string", "null"] },
			"order_by": {
				"type": ["string", "null"],
				"enum": nullable_enum(&ORDER_VALUES),
				"default": "latest"
			}
		}
	}))
}

fn expiring_soon_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"properties": {
			"days": { "type": ["integer", "null"], "minimum": 0, "default": 30 },
			"organization": { "type": ["string", "null"] },
			"order_by": {
				"type": ["string", "null"],
				"enum": nullable_enum(&ORDER_VALUES),
				"default": "earliest"
			}
		}
	}))
}

fn permit_details_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["permit_number"],
		"properties": {
			"permit_number": { "type": "string", "description": "For example PLO-2024-001." }
		}
	}))
}

fn installation_schema() -> Arc<JsonObject> {
	Arc::new(rmcp::object!({
		"type": "object",
		"additionalProperties": false,
		"required": ["installation"],
		"properties": {
			"installation": { "type": "string", "description": "For example IT Semarang." },
			"permit_type": {
				"type": ["string", "null"],
				"enum": nullable_enum(&PERMIT_TYPE_VALUES)
			}
		}
	}))
}
