//! CLI runner - executes commands

use crate::api::ContentApi;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::PortalConfig;
use crate::error::Result;
use crate::notify::TracingNotifier;
use crate::pagination::{PaginatedResource, ResourceConfig};
use crate::search::SearchService;
use crate::submissions::{SubmissionService, SubmissionStore};
use crate::types::ContentKind;
use serde::Serialize;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = PortalConfig::load(self.cli.config.as_deref())?;

        match &self.cli.command {
            Commands::Serve { port } => {
                let mut config = config;
                if let Some(port) = port {
                    config.server.port = *port;
                }
                crate::server::serve(Arc::new(config)).await
            }
            Commands::List {
                kind,
                page,
                limit,
                more,
                filters,
            } => {
                self.list(Arc::new(config), kind, *page, *limit, *more, filters)
                    .await
            }
            Commands::Search { query, limit } => {
                self.search(Arc::new(config), query, *limit).await
            }
            Commands::Pending { retry } => self.pending(Arc::new(config), *retry).await,
            Commands::Config => {
                print!("{}", config.to_yaml()?);
                Ok(())
            }
        }
    }

    /// Load a page (and optionally more) through the reconciler and print its state
    async fn list(
        &self,
        config: Arc<PortalConfig>,
        kind: &str,
        page: f64,
        limit: Option<u32>,
        more: u32,
        filters: &[(String, String)],
    ) -> Result<()> {
        let kind: ContentKind = kind.parse()?;
        let page_size = limit.unwrap_or(config.pagination.page_size);
        let resource_config = filters.iter().fold(
            ResourceConfig::new(page_size).initial_page(config.pagination.initial_page),
            |rc, (key, value)| rc.filter(key, value),
        );

        let api = ContentApi::new(config)?;
        let resource = PaginatedResource::new(api.fetcher(kind), resource_config)
            .with_notifier(Arc::new(TracingNotifier));

        resource.go_to_page(page).await;
        for _ in 0..more {
            if !resource.state().await.has_next_page {
                break;
            }
            resource.load_next_page().await;
        }

        self.emit(&resource.state().await)
    }

    /// Federated search
    async fn search(
        &self,
        config: Arc<PortalConfig>,
        query: &str,
        limit: Option<u32>,
    ) -> Result<()> {
        let service = SearchService::new(ContentApi::new(config)?);
        let results = service.search(query, limit).await;
        self.emit(&results)
    }

    /// List stored submissions, or try to deliver them
    async fn pending(&self, config: Arc<PortalConfig>, retry: bool) -> Result<()> {
        let store = Arc::new(SubmissionStore::open(&config.submissions.fallback_dir)?);
        if !retry {
            return self.emit(&store.list().await);
        }

        let service = SubmissionService::new(ContentApi::new(config)?, store)
            .with_notifier(Arc::new(TracingNotifier));
        let report = service.retry_pending().await?;
        self.emit(&report)
    }

    fn emit<T: Serialize>(&self, value: &T) -> Result<()> {
        let output = match self.cli.format {
            OutputFormat::Json => serde_json::to_string(value)?,
            OutputFormat::Pretty => serde_json::to_string_pretty(value)?,
        };
        println!("{output}");
        Ok(())
    }
}
