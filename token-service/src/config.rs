use anyhow::{anyhow, Context, Result};
use axum::http::HeaderValue;
use common_auth::{parse_validity_days, Algorithm, JwtConfig, SigningKey};
use std::env;
use std::net::{IpAddr, SocketAddr};

const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub jwt: JwtConfig,
    pub signing_key: SigningKey,
    pub bind_addr: SocketAddr,
    pub cors_origins: Vec<HeaderValue>,
}

impl ServiceConfig {
    /// Builds the configuration from a key lookup (environment or test map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("JWT_KEY").ok_or_else(|| anyhow!("JWT_KEY must be set"))?;
        let signing_key =
            SigningKey::from_secret(&secret).context("JWT_KEY is not a usable signing key")?;

        let issuer = required(&lookup, "JWT_ISSUER")?;
        let audience = required(&lookup, "JWT_AUDIENCE")?;

        let validity_days = parse_validity_days(lookup("JWT_EXPIRES_IN_DAYS").as_deref());

        let leeway_seconds = lookup("JWT_CLOCK_SKEW_SECONDS")
            .and_then(|value| normalize_optional(&value))
            .map(|value| value.parse::<u32>())
            .transpose()
            .context("Failed to parse JWT_CLOCK_SKEW_SECONDS")?
            .unwrap_or(0);

        let algorithm = lookup("JWT_ALGORITHM")
            .and_then(|value| normalize_optional(&value))
            .map(|value| value.parse::<Algorithm>())
            .transpose()
            .context("Failed to parse JWT_ALGORITHM")?
            .unwrap_or_default();

        let jwt = JwtConfig::new(issuer, audience)
            .with_validity_days(validity_days)
            .with_leeway(leeway_seconds)
            .with_algorithm(algorithm);

        if signing_key.len() < algorithm.min_key_len() {
            return Err(anyhow!(
                "JWT_KEY is {} bytes but {algorithm} requires at least {}",
                signing_key.len(),
                algorithm.min_key_len()
            ));
        }

        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = lookup("PORT")
            .map(|value| value.trim().parse::<u16>())
            .transpose()
            .context("Failed to parse PORT")?
            .unwrap_or(DEFAULT_PORT);
        let ip: IpAddr = host
            .trim()
            .parse()
            .with_context(|| format!("Invalid HOST '{host}'"))?;

        let cors_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|value| parse_origins(&value))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            jwt,
            signing_key,
            bind_addr: SocketAddr::from((ip, port)),
            cors_origins,
        })
    }
}

pub fn load_service_config() -> Result<ServiceConfig> {
    ServiceConfig::from_lookup(|key| env::var(key).ok())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|value| normalize_optional(&value))
        .ok_or_else(|| anyhow!("{key} must be set"))
}

fn normalize_optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn parse_origins(value: &str) -> Result<Vec<HeaderValue>> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(|item| {
            HeaderValue::from_str(item).map_err(|err| anyhow!("Invalid CORS origin '{item}': {err}"))
        })
        .collect()
}
