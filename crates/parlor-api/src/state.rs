//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the HTTP API. Services are generic over repository traits; AppState pins
//! them to the SQLite implementations.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use tokio_util::sync::CancellationToken;

use parlor_core::chat::service::ChatService;
use parlor_core::profile::service::ProfileService;
use parlor_core::prompt::service::PromptService;
use parlor_core::relay::ChatModel;
use parlor_infra::llm::ollama::OllamaRelay;
use parlor_infra::sqlite::chat::SqliteChatRepository;
use parlor_infra::sqlite::pool::{DatabasePool, PoolSettings};
use parlor_infra::sqlite::profile::SqliteProfileRepository;
use parlor_infra::sqlite::prompt::SqlitePromptRepository;
use parlor_types::config::AppConfig;
use parlor_types::prompt::PromptCatalog;

/// Concrete type aliases for the service generics pinned to infra implementations.
pub type ConcreteChatService = ChatService<SqliteChatRepository, SqliteProfileRepository>;

pub type ConcreteProfileService = ProfileService<SqliteProfileRepository>;

pub type ConcretePromptService = PromptService<SqlitePromptRepository>;

/// Shared application state holding all services.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub profile_service: Arc<ConcreteProfileService>,
    pub prompt_service: Arc<ConcretePromptService>,
    pub model: Arc<dyn ChatModel>,
    pub config: Arc<AppConfig>,
    /// Root token; every streamed turn runs under a child of it.
    pub shutdown: CancellationToken,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: open the database, build the
    /// Ollama relay, wire services.
    pub async fn init(data_dir: PathBuf, config: AppConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir)
            .await
            .with_context(|| format!("failed to create data directory {}", data_dir.display()))?;

        let db_path = data_dir.join(&config.storage.database);
        let db_pool = DatabasePool::open_with(&db_path, PoolSettings::from(&config.storage))
            .await
            .with_context(|| format!("failed to open database {}", db_path.display()))?;

        let model = OllamaRelay::new(&config.model)?;
        tracing::info!(
            base_url = model.base_url(),
            model = %config.model.model,
            "Ollama relay configured"
        );

        Self::with_model(data_dir, config, db_pool, Arc::new(model)).await
    }

    /// Wire services around an already opened pool and a given model.
    ///
    /// Seeds the prompt catalog when the table is empty.
    pub async fn with_model(
        data_dir: PathBuf,
        config: AppConfig,
        db_pool: DatabasePool,
        model: Arc<dyn ChatModel>,
    ) -> anyhow::Result<Self> {
        let profile_repo = SqliteProfileRepository::new(db_pool.clone());
        let chat_service = ChatService::new(
            SqliteChatRepository::new(db_pool.clone()),
            profile_repo.clone(),
        );
        let profile_service = ProfileService::new(profile_repo);
        let prompt_service = PromptService::new(SqlitePromptRepository::new(db_pool.clone()));

        let catalog = seed_catalog(&data_dir, &config).await?;
        prompt_service.ensure_seeded(&catalog).await?;

        Ok(Self {
            chat_service: Arc::new(chat_service),
            profile_service: Arc::new(profile_service),
            prompt_service: Arc::new(prompt_service),
            model,
            config: Arc::new(config),
            shutdown: CancellationToken::new(),
            data_dir,
            db_pool,
        })
    }
}

/// The catalog used to seed an empty prompt table: `storage.prompts_file`
/// when configured (relative paths resolve against the data directory),
/// otherwise the built-in one.
async fn seed_catalog(data_dir: &Path, config: &AppConfig) -> anyhow::Result<PromptCatalog> {
    let Some(file) = &config.storage.prompts_file else {
        return Ok(PromptCatalog::builtin());
    };
    let path = data_dir.join(file);
    let content = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("failed to read prompts file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse prompts file {}", path.display()))
}
