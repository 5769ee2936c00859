use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

/// OpenAI-compatible chat completions endpoint. Without a key every AI
/// feature falls back to its static output.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub vision_model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub endpoint: String,
    pub bucket: String,
    pub access_key: String,
    pub secret_key: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    pub default_pattern: String,
    pub default_calorie_target: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    pub max_image_size_mb: usize,
    pub max_challenge_participants: i64,
    pub max_friends: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub ai: AiConfig,
    pub storage: Option<StorageConfig>,
    pub planner: PlannerConfig,
    pub limits: LimitsConfig,
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.into())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env_or("DATABASE_URL", "sqlite://asistenti.db?mode=rwc");
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET")?,
            issuer: env_or("JWT_ISSUER", "asistenti"),
            audience: env_or("JWT_AUDIENCE", "asistenti-users"),
            ttl_minutes: env_parse("JWT_TTL_MINUTES", 60),
            refresh_ttl_minutes: env_parse("JWT_REFRESH_TTL_MINUTES", 60 * 24 * 14),
        };
        let ai = AiConfig {
            api_key: std::env::var("OPENAI_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            model: env_or("AI_MODEL", "gpt-4o-mini"),
            vision_model: env_or("AI_VISION_MODEL", "gpt-4o-mini"),
            temperature: env_parse("AI_TEMPERATURE", 0.2),
            max_tokens: env_parse("AI_MAX_TOKENS", 1000),
            timeout_seconds: env_parse("AI_TIMEOUT_SECONDS", 30),
        };
        let storage = match (
            std::env::var("MINIO_ENDPOINT"),
            std::env::var("MINIO_BUCKET"),
            std::env::var("MINIO_ACCESS_KEY"),
            std::env::var("MINIO_SECRET_KEY"),
        ) {
            (Ok(endpoint), Ok(bucket), Ok(access_key), Ok(secret_key)) => Some(StorageConfig {
                endpoint,
                bucket,
                access_key,
                secret_key,
            }),
            _ => None,
        };
        let planner = PlannerConfig {
            default_pattern: env_or("DEFAULT_MEAL_PATTERN", "30/40/30"),
            default_calorie_target: env_parse("DEFAULT_CALORIE_TARGET", 2000),
        };
        let limits = LimitsConfig {
            max_image_size_mb: env_parse("MAX_IMAGE_SIZE_MB", 10),
            max_challenge_participants: env_parse("MAX_CHALLENGE_PARTICIPANTS", 100),
            max_friends: env_parse("MAX_FRIENDS", 100),
        };
        Ok(Self {
            database_url,
            jwt,
            ai,
            storage,
            planner,
            limits,
        })
    }
}
