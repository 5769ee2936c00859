use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use sqlx::SqlitePool;

use crate::{
    ai::{self, mock::MockProvider, AiProvider},
    config::{
        AiConfig, AppConfig, JwtConfig, LimitsConfig, PlannerConfig,
    },
    db,
    recipes::{model::builtin_recipes, Recipe},
    storage::{S3Storage, StorageClient},
};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    /// Absent when no object store is configured; photos are then not kept.
    pub storage: Option<Arc<dyn StorageClient>>,
    pub ai: Arc<dyn AiProvider>,
    /// Built-in recipe book, parsed once.
    pub recipes: Arc<Vec<Recipe>>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = db::connect(&config.database_url).await?;

        let storage = match &config.storage {
            Some(cfg) => {
                tracing::info!(endpoint = %cfg.endpoint, bucket = %cfg.bucket, "object storage enabled");
                Some(Arc::new(S3Storage::new(cfg, "us-east-1").await?) as Arc<dyn StorageClient>)
            }
            None => {
                tracing::warn!("MINIO_* not set; food photos are not archived");
                None
            }
        };

        let ai = ai::from_config(&config.ai)?;
        let recipes = Arc::new(builtin_recipes()?);
        tracing::info!(count = recipes.len(), "recipe book loaded");

        Ok(Self {
            db,
            config,
            storage,
            ai,
            recipes,
        })
    }

    /// Migrated in-memory database, fake storage and a mock model that
    /// always fails, so every AI feature takes its fallback.
    pub async fn fake() -> Self {
        Self::fake_with_ai(Arc::new(MockProvider::failing())).await
    }

    pub async fn fake_with_ai(ai: Arc<dyn AiProvider>) -> Self {
        #[derive(Clone)]
        struct FakeStorage;
        #[async_trait]
        impl StorageClient for FakeStorage {
            async fn put_object(&self, _k: &str, _b: Bytes, _ct: &str) -> anyhow::Result<()> {
                Ok(())
            }
            async fn delete_object(&self, _k: &str) -> anyhow::Result<()> {
                Ok(())
            }
            async fn presign_get(&self, k: &str, _s: u64) -> anyhow::Result<String> {
                Ok(format!("https://fake.local/{}", k))
            }
        }

        let db = db::connect_in_memory().await.expect("in-memory pool");
        db::migrate(&db).await.expect("migrations");

        let config = Arc::new(AppConfig {
            database_url: "sqlite::memory:".into(),
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test".into(),
                audience: "test".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            ai: AiConfig {
                api_key: None,
                base_url: "http://localhost".into(),
                model: "test".into(),
                vision_model: "test".into(),
                temperature: 0.2,
                max_tokens: 100,
                timeout_seconds: 1,
            },
            storage: None,
            planner: PlannerConfig {
                default_pattern: "30/40/30".into(),
                default_calorie_target: 2000,
            },
            limits: LimitsConfig {
                max_image_size_mb: 1,
                max_challenge_participants: 2,
                max_friends: 3,
            },
        });

        Self {
            db,
            config,
            storage: Some(Arc::new(FakeStorage) as Arc<dyn StorageClient>),
            ai,
            recipes: Arc::new(builtin_recipes().expect("built-in recipes")),
        }
    }
}
