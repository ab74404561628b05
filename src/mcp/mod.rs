use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerInfo},
    tool, tool_handler, tool_router,
    schemars::JsonSchema,
    ErrorData as McpError, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;
use featurevote_core::{Error as CoreError, VotingService};

#[derive(Clone)]
pub struct McpServer {
    db: Database,
    voting: VotingService,
    default_page_size: u32,
    tool_router: ToolRouter<Self>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ListFeaturesRequest {
    #[schemars(description = "1-based page number (default 1)")]
    #[serde(default)]
    pub page: Option<u32>,
    #[schemars(description = "Features per page (server default, max 100)")]
    #[serde(default)]
    pub page_size: Option<u32>,
    #[schemars(description = "User ID to report has_voted for")]
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetFeatureRequest {
    #[schemars(description = "The feature ID")]
    pub feature_id: String,
    #[schemars(description = "User ID to report has_voted for")]
    #[serde(default)]
    pub user_id: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct VoteRequest {
    #[schemars(description = "The feature ID to vote on")]
    pub feature_id: String,
    #[schemars(description = "The ID of the voting user")]
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct VoteResult {
    pub feature_id: Uuid,
    pub vote_count: i64,
    pub has_voted: bool,
}

impl McpServer {
    pub fn new(db: Database) -> Self {
        Self {
            voting: VotingService::new(db.clone()),
            db,
            default_page_size: DEFAULT_PAGE_SIZE,
            tool_router: Self::tool_router(),
        }
    }

    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.default_page_size = page_size;
        self
    }

    fn parse_uuid(s: &str) -> Result<Uuid, McpError> {
        Uuid::parse_str(s)
            .map_err(|e| McpError::invalid_params(format!("Invalid UUID: {}", e), None))
    }

    fn parse_optional_uuid(s: Option<&str>) -> Result<Option<Uuid>, McpError> {
        s.map(Self::parse_uuid).transpose()
    }

    fn core_error(err: CoreError) -> McpError {
        if err.is_client_error() {
            McpError::invalid_params(err.to_string(), None)
        } else {
            McpError::internal_error(err.to_string(), None)
        }
    }

    fn json_result(value: &impl Serialize) -> Result<CallToolResult, McpError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| McpError::internal_error(e.to_string(), None))?;
        Ok(CallToolResult::success(vec![Content::text(json)]))
    }
}

#[tool_router]
impl McpServer {
    #[tool(description = "List feature requests ranked by votes, newest first on ties")]
    async fn list_features(
        &self,
        params: Parameters<ListFeaturesRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let viewer = Self::parse_optional_uuid(req.user_id.as_deref())?;
        let request = PageRequest::new(req.page, req.page_size, self.default_page_size);

        let page = self.db.ranked_features(request, viewer).map_err(Self::core_error)?;
        Self::json_result(&page)
    }

    #[tool(description = "Get a feature request with its current vote count")]
    async fn get_feature(
        &self,
        params: Parameters<GetFeatureRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let feature_id = Self::parse_uuid(&req.feature_id)?;
        let viewer = Self::parse_optional_uuid(req.user_id.as_deref())?;

        let view = self.db.get_feature_view(feature_id, viewer).map_err(Self::core_error)?;
        Self::json_result(&view)
    }

    #[tool(description = "Upvote a feature on behalf of a user (once per user, never your own)")]
    async fn upvote_feature(
        &self,
        params: Parameters<VoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let feature_id = Self::parse_uuid(&req.feature_id)?;
        let user_id = Self::parse_uuid(&req.user_id)?;

        let status = self.voting.upvote(feature_id, user_id).map_err(Self::core_error)?;
        Self::json_result(&VoteResult {
            feature_id,
            vote_count: status.vote_count,
            has_voted: status.has_voted,
        })
    }

    #[tool(description = "Remove a user's vote from a feature")]
    async fn remove_vote(
        &self,
        params: Parameters<VoteRequest>,
    ) -> Result<CallToolResult, McpError> {
        let req = params.0;
        let feature_id = Self::parse_uuid(&req.feature_id)?;
        let user_id = Self::parse_uuid(&req.user_id)?;

        let status = self.voting.remove_vote(feature_id, user_id).map_err(Self::core_error)?;
        Self::json_result(&VoteResult {
            feature_id,
            vote_count: status.vote_count,
            has_voted: status.has_voted,
        })
    }
}

#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some("featurevote MCP server: browse ranked feature requests and vote on them".into()),
            ..Default::default()
        }
    }
}

pub async fn run_stdio_server(db: Database, page_size: u32) -> anyhow::Result<()> {
    use tokio::io::{stdin, stdout};

    tracing::info!("Starting MCP server via stdio");

    let service = McpServer::new(db).with_page_size(page_size);
    let server = service.serve((stdin(), stdout())).await?;

    let quit_reason = server.waiting().await?;
    tracing::info!("MCP server stopped: {:?}", quit_reason);

    Ok(())
}
