use serde::Deserialize;

use super::JwtConfig;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub app_name: String,
    pub app_version: String,
    /// Emails that are registered with admin rights
    pub admin_emails: Vec<String>,
    pub jwt: JwtConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();

        let cfg = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;

        let admin_emails = cfg
            .get_string("ADMIN_EMAILS")
            .map(|raw| parse_email_list(&raw))
            .unwrap_or_default();

        Ok(Self {
            host: cfg.get_string("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: cfg.get_int("PORT").unwrap_or(3000) as u16,
            environment: cfg.get_string("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            app_name: cfg.get_string("APP_NAME").unwrap_or_else(|_| "cafe-fila".to_string()),
            app_version: cfg.get_string("APP_VERSION").unwrap_or_else(|_| "0.1.0".to_string()),
            admin_emails,
            jwt: JwtConfig::from_env()?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_admin_email(&self, email: &str) -> bool {
        self.admin_emails
            .iter()
            .any(|admin| admin.eq_ignore_ascii_case(email))
    }
}

fn parse_email_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|email| !email.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[cfg(test)]
impl AppConfig {
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            environment: "test".to_string(),
            app_name: "cafe-fila".to_string(),
            app_version: "0.1.0".to_string(),
            admin_emails: vec!["admin@cafe.dev".to_string()],
            jwt: JwtConfig {
                secret: "test-secret".to_string(),
                expiration_seconds: 3600,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_email_list_is_trimmed_and_case_insensitive() {
        let emails = parse_email_list(" Admin@Cafe.dev, ,boss@cafe.dev ");
        assert_eq!(emails, vec!["admin@cafe.dev", "boss@cafe.dev"]);

        let config = AppConfig {
            admin_emails: emails,
            ..AppConfig::for_tests()
        };
        assert!(config.is_admin_email("ADMIN@cafe.dev"));
        assert!(!config.is_admin_email("alice@cafe.dev"));
    }
}
