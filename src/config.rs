use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_ttl_hours: i64,
    pub client_url: String,
    pub blind_date_minutes: i64,
    pub upload_dir: String,
    pub email: EmailConfig,
    pub chat: ChatConfig,
}

#[derive(Debug, Clone, Default)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub from_email: String,
    pub from_name: String,
}

/// Credentials of the hosted chat service used to sign client tokens.
#[derive(Debug, Clone, Default)]
pub struct ChatConfig {
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = env::var("DATABASE_URL")?;
        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET is not set"))?;
        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .ok()
            .and_then(|p| p.parse::<u16>().ok())
            .unwrap_or(3000);
        let client_url =
            env::var("CLIENT_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());

        Ok(Self {
            database_url,
            host,
            port,
            jwt_secret,
            jwt_ttl_hours: parse_or("JWT_TTL_HOURS", 24 * 7),
            client_url,
            blind_date_minutes: parse_or("BLIND_DATE_MINUTES", 15),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            email: EmailConfig {
                api_key: non_empty("EMAIL_API_KEY"),
                from_email: env::var("EMAIL_FROM")
                    .unwrap_or_else(|_| "no-reply@campusmatch.local".to_string()),
                from_name: env::var("EMAIL_FROM_NAME").unwrap_or_else(|_| "Campus Match".to_string()),
            },
            chat: ChatConfig {
                api_key: non_empty("CHAT_API_KEY"),
                api_secret: non_empty("CHAT_API_SECRET"),
            },
        })
    }

    /// Configuration for tests and tools that never read the environment.
    pub fn for_database(database_url: &str) -> Self {
        Self {
            database_url: database_url.to_string(),
            host: "127.0.0.1".to_string(),
            port: 3000,
            jwt_secret: "test-secret".to_string(),
            jwt_ttl_hours: 24,
            client_url: "http://localhost:3000".to_string(),
            blind_date_minutes: 15,
            upload_dir: "uploads".to_string(),
            email: EmailConfig::default(),
            chat: ChatConfig::default(),
        }
    }
}

fn parse_or(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
