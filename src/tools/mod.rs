pub mod params;
pub mod quiz;

use infodiet::config::DietConfig;
use infodiet::diet::validate::{
    AddProgressInput, ListItemsInput, NewItemInput, SearchItemsInput, StatsInput, TimelineInput,
    MAX_LIMIT,
};
use infodiet::diet::{items, progress, stats, timeline};
use infodiet::error::DietError;
use params::{FinishItemParams, GetProgressParams, ItemIdParams, QuizMeArgs, UpdateItemParams};
use rmcp::handler::server::router::prompt::PromptRouter;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{
    AnnotateAble, GetPromptRequestParams, GetPromptResult, ListPromptsResult, ListResourcesResult,
    PaginatedRequestParams, PromptMessage, PromptMessageRole, RawResource,
    ReadResourceRequestParams, ReadResourceResult, ResourceContents,
};
use rmcp::service::RequestContext;
use rmcp::{
    prompt, prompt_handler, prompt_router, tool, tool_handler, tool_router, ErrorData as McpError,
    RoleServer, ServerHandler,
};
use rusqlite::Connection;
use serde::Serialize;
use std::sync::{Arc, Mutex};

pub const CURRENT_DIET_URI: &str = "diet://current";
pub const ACTIVITY_URI: &str = "diet://activity";

/// The information diet MCP handler. Holds the shared connection and config and
/// exposes every item, progress, and stats operation as a tool.
#[derive(Clone)]
pub struct DietTools {
    tool_router: ToolRouter<Self>,
    prompt_router: PromptRouter<Self>,
    db: Arc<Mutex<Connection>>,
    config: Arc<DietConfig>,
}

impl DietTools {
    /// Run a store operation on the blocking pool with the connection locked.
    async fn run_db<T, F>(&self, op: &'static str, f: F) -> Result<T, String>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> infodiet::error::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let mut conn = db.lock().map_err(|e| format!("db lock poisoned: {e}"))?;
            f(&mut *conn).map_err(|e| log_failure(op, e))
        })
        .await
        .map_err(|e| format!("db task failed: {e}"))?
    }

    async fn json<T, F>(&self, op: &'static str, f: F) -> Result<String, String>
    where
        T: Serialize + Send + 'static,
        F: FnOnce(&mut Connection) -> infodiet::error::Result<T> + Send + 'static,
    {
        let value = self.run_db(op, f).await?;
        serde_json::to_string_pretty(&value).map_err(|e| format!("serialization failed: {e}"))
    }

    async fn resource_text(&self, uri: &str) -> Result<String, McpError> {
        let result = match uri {
            CURRENT_DIET_URI => {
                self.json("read_current_diet", |conn| stats::get_current_diet(conn))
                    .await
            }
            ACTIVITY_URI => {
                let limit = i64::from(self.config.timeline.activity_limit.clamp(1, MAX_LIMIT));
                self.json("read_activity", move |conn| {
                    timeline::get_timeline(conn, TimelineInput { limit: Some(limit) })
                })
                .await
            }
            other => {
                return Err(McpError::resource_not_found(
                    format!("unknown resource: {other}"),
                    None,
                ))
            }
        };
        result.map_err(|e| McpError::internal_error(e, None))
    }
}

fn log_failure(op: &'static str, err: DietError) -> String {
    if err.is_caller_error() {
        tracing::warn!(op, error = %err, "request rejected");
    } else {
        tracing::error!(op, error = %err, "operation failed");
    }
    err.to_string()
}

#[tool_router]
impl DietTools {
    pub fn new(db: Arc<Mutex<Connection>>, config: Arc<DietConfig>) -> Self {
        Self {
            tool_router: Self::tool_router(),
            prompt_router: Self::prompt_router(),
            db,
            config,
        }
    }

    #[tool(description = "Add a new item (book, article, podcast, video, course, paper) to your information diet backlog")]
    async fn add_item(
        &self,
        Parameters(params): Parameters<NewItemInput>,
    ) -> Result<String, String> {
        tracing::info!(title = %params.title, item_type = %params.item_type, "add_item called");
        self.json("add_item", move |conn| items::add_item(conn, params))
            .await
    }

    #[tool(description = "Update fields of an existing item. Omitted fields are left unchanged; null clears author, url, rating, notes, startedAt or finishedAt.")]
    async fn update_item(
        &self,
        Parameters(params): Parameters<UpdateItemParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, "update_item called");
        self.json("update_item", move |conn| {
            items::update_item(conn, &params.id, params.changes)
        })
        .await
    }

    #[tool(description = "Mark an item as in progress and set its start date to today")]
    async fn start_item(
        &self,
        Parameters(params): Parameters<ItemIdParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, "start_item called");
        self.json("start_item", move |conn| items::start_item(conn, &params.id))
            .await
    }

    #[tool(description = "Mark an item as finished with an optional 1-5 rating; the finish date is set to today")]
    async fn finish_item(
        &self,
        Parameters(params): Parameters<FinishItemParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, rating = ?params.rating, "finish_item called");
        self.json("finish_item", move |conn| {
            items::finish_item(conn, &params.id, params.rating)
        })
        .await
    }

    #[tool(description = "Mark an item as abandoned")]
    async fn abandon_item(
        &self,
        Parameters(params): Parameters<ItemIdParams>,
    ) -> Result<String, String> {
        tracing::info!(id = %params.id, "abandon_item called");
        self.json("abandon_item", move |conn| items::abandon_item(conn, &params.id))
            .await
    }

    #[tool(description = "Get an item by ID together with its progress log")]
    async fn get_item(
        &self,
        Parameters(params): Parameters<ItemIdParams>,
    ) -> Result<String, String> {
        tracing::debug!(id = %params.id, "get_item called");
        self.json("get_item", move |conn| items::get_item(conn, &params.id))
            .await
    }

    #[tool(description = "Search your information diet by title, type, status, or tags")]
    async fn search_items(
        &self,
        Parameters(params): Parameters<SearchItemsInput>,
    ) -> Result<String, String> {
        tracing::debug!(query = ?params.query, "search_items called");
        self.json("search_items", move |conn| items::search_items(conn, params))
            .await
    }

    #[tool(description = "List items filtered by status or type, ordered by createdAt, updatedAt, or title")]
    async fn list_items(
        &self,
        Parameters(params): Parameters<ListItemsInput>,
    ) -> Result<String, String> {
        tracing::debug!(status = ?params.status, limit = ?params.limit, "list_items called");
        self.json("list_items", move |conn| items::list_items(conn, params))
            .await
    }

    #[tool(description = "Log a progress note on an item (e.g. 'Read chapters 3-5', 'Watched first half')")]
    async fn add_progress(
        &self,
        Parameters(params): Parameters<AddProgressInput>,
    ) -> Result<String, String> {
        tracing::info!(item_id = %params.item_id, "add_progress called");
        self.json("add_progress", move |conn| progress::add_progress(conn, params))
            .await
    }

    #[tool(description = "Get all progress notes for an item, oldest first")]
    async fn get_progress(
        &self,
        Parameters(params): Parameters<GetProgressParams>,
    ) -> Result<String, String> {
        tracing::debug!(item_id = %params.item_id, "get_progress called");
        self.json("get_progress", move |conn| {
            progress::get_progress(conn, &params.item_id)
        })
        .await
    }

    #[tool(description = "Get consumption statistics: finished items by type, average rating, top tags")]
    async fn get_stats(
        &self,
        Parameters(params): Parameters<StatsInput>,
    ) -> Result<String, String> {
        tracing::debug!(period = ?params.period, "get_stats called");
        self.json("get_stats", move |conn| stats::get_stats(conn, params))
            .await
    }

    #[tool(description = "Get the items currently in progress")]
    async fn get_current_diet(&self) -> Result<String, String> {
        tracing::debug!("get_current_diet called");
        self.json("get_current_diet", |conn| stats::get_current_diet(conn))
            .await
    }

    #[tool(description = "Get recent activity: items added, started, finished, abandoned, and progress notes")]
    async fn get_timeline(
        &self,
        Parameters(params): Parameters<TimelineInput>,
    ) -> Result<String, String> {
        tracing::debug!(limit = ?params.limit, "get_timeline called");
        self.json("get_timeline", move |conn| timeline::get_timeline(conn, params))
            .await
    }
}

#[prompt_router]
impl DietTools {
    #[prompt(name = "quiz-me", description = "Generate a quiz based on items you've finished consuming")]
    async fn quiz_me(
        &self,
        Parameters(args): Parameters<QuizMeArgs>,
    ) -> Result<Vec<PromptMessage>, McpError> {
        tracing::info!(topic = ?args.topic, "quiz-me requested");
        let finished = self
            .run_db("quiz_me", |conn| {
                items::search_items(
                    conn,
                    SearchItemsInput {
                        status: Some("finished".into()),
                        ..Default::default()
                    },
                )
            })
            .await
            .map_err(|e| McpError::internal_error(e, None))?;

        let text = quiz::quiz_prompt(&finished, args.topic.as_deref());
        Ok(vec![PromptMessage::new_text(PromptMessageRole::User, text)])
    }
}

#[tool_handler]
#[prompt_handler]
impl ServerHandler for DietTools {
    fn get_info(&self) -> rmcp::model::ServerInfo {
        rmcp::model::ServerInfo {
            instructions: Some(
                "Information diet tracker. Use add_item to queue books, articles, podcasts, \
                 videos, courses and papers; start_item, finish_item and add_progress to record \
                 consumption; get_stats and get_timeline to review habits. Read diet://current \
                 for what is in progress and diet://activity for recent activity."
                    .into(),
            ),
            capabilities: rmcp::model::ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            ..Default::default()
        }
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParams>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, McpError> {
        let resource = |uri: &str, name: &str, description: &str| {
            let mut raw = RawResource::new(uri, name);
            raw.description = Some(description.into());
            raw.mime_type = Some("application/json".into());
            raw.no_annotation()
        };

        Ok(ListResourcesResult::with_all_items(vec![
            resource(
                CURRENT_DIET_URI,
                "current-diet",
                "Items you are currently consuming",
            ),
            resource(
                ACTIVITY_URI,
                "recent-activity",
                "Recent activity across your information diet",
            ),
        ]))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParams,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, McpError> {
        tracing::debug!(uri = %request.uri, "read_resource called");
        let text = self.resource_text(&request.uri).await?;
        Ok(ReadResourceResult {
            contents: vec![ResourceContents::text(text, request.uri.clone())],
        })
    }
}
