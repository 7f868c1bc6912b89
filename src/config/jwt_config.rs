use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    /// Token lifetime in seconds
    pub expiration_seconds: i64,
}

impl JwtConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let secret = cfg.get_string("JWT_SECRET")?;
        if secret.is_empty() {
            return Err(config::ConfigError::Message("JWT_SECRET cannot be empty".to_string()));
        }

        Ok(Self {
            secret,
            expiration_seconds: cfg.get_int("JWT_EXPIRATION").unwrap_or(86400),
        })
    }
}
