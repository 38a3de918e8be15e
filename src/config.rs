use std::collections::HashMap;
use std::env;

use thiserror::Error;

use crate::util::ValidityPolicy;

const DEV_SERVER_SECRET: &str = "dev_secret";

/// Upper bound for every day-count setting (100 years).
const MAX_DAYS: i64 = 36_500;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} must be set outside dev mode")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value}")]
    Invalid { name: &'static str, value: String },
}

/// Stripe credentials. The webhook secret is optional so checkout can work
/// before webhooks are wired up, but `/webhook/stripe` rejects every event
/// until it is set.
#[derive(Debug, Clone)]
pub struct StripeConfig {
    pub secret_key: String,
    pub webhook_secret: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    pub base_url: String,
    pub dev_mode: bool,
    pub server_secret: String,
    pub stripe: Option<StripeConfig>,
    pub allow_simulated_webhooks: bool,
    pub validity: ValidityPolicy,
    pub payment_timeout_secs: u64,
    /// Audit trail retention (0 = keep forever)
    pub event_retention_days: i64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dev_mode = var("APP_ENV")
            .map(|v| v == "dev" || v == "development")
            .unwrap_or(false);

        let host = var("HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port: u16 = parse_or("PORT", var("PORT"), 5000)?;

        let base_url = var("BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("http://{}:{}", host, port));

        let server_secret = match var("SERVER_SECRET").filter(|s| !s.is_empty()) {
            Some(secret) => secret,
            None if dev_mode => DEV_SERVER_SECRET.to_string(),
            None => return Err(ConfigError::Missing("SERVER_SECRET")),
        };

        let stripe = var("STRIPE_SECRET_KEY")
            .filter(|s| !s.is_empty())
            .map(|secret_key| StripeConfig {
                secret_key,
                webhook_secret: var("STRIPE_WEBHOOK_SECRET").filter(|s| !s.is_empty()),
            });

        let allow_simulated_webhooks = match var("ALLOW_SIMULATED_WEBHOOKS") {
            Some(v) => parse_bool("ALLOW_SIMULATED_WEBHOOKS", &v)?,
            None => dev_mode,
        };

        let default_days: i64 = parse_or(
            "ENTITLEMENT_VALIDITY_DAYS",
            var("ENTITLEMENT_VALIDITY_DAYS"),
            30,
        )?;
        if !(1..=MAX_DAYS).contains(&default_days) {
            return Err(ConfigError::Invalid {
                name: "ENTITLEMENT_VALIDITY_DAYS",
                value: default_days.to_string(),
            });
        }
        let plan_days = match var("PLAN_VALIDITY_DAYS") {
            Some(raw) => parse_plan_days(&raw)?,
            None => HashMap::new(),
        };

        let event_retention_days: i64 =
            parse_or("EVENT_RETENTION_DAYS", var("EVENT_RETENTION_DAYS"), 0)?;
        if !(0..=MAX_DAYS).contains(&event_retention_days) {
            return Err(ConfigError::Invalid {
                name: "EVENT_RETENTION_DAYS",
                value: event_retention_days.to_string(),
            });
        }

        Ok(Self {
            host,
            port,
            database_path: var("DATABASE_PATH")
                .unwrap_or_else(|| "premium_ledger.db".to_string()),
            base_url,
            dev_mode,
            server_secret,
            stripe,
            allow_simulated_webhooks,
            validity: ValidityPolicy {
                default_days,
                plan_days,
            },
            payment_timeout_secs: parse_or("PAYMENT_TIMEOUT_SECS", var("PAYMENT_TIMEOUT_SECS"), 10)?,
            event_retention_days,
        })
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    name: &'static str,
    value: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match value {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value: v }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

/// Parse `"premium=30,pro=90"` into per-plan validity days.
fn parse_plan_days(raw: &str) -> Result<HashMap<String, i64>, ConfigError> {
    let invalid = || ConfigError::Invalid {
        name: "PLAN_VALIDITY_DAYS",
        value: raw.to_string(),
    };

    let mut plans = HashMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (plan, days) = entry.split_once('=').ok_or_else(invalid)?;
        let plan = plan.trim();
        let days: i64 = days.trim().parse().map_err(|_| invalid())?;
        if plan.is_empty() || !(1..=MAX_DAYS).contains(&days) {
            return Err(invalid());
        }
        plans.insert(plan.to_string(), days);
    }
    Ok(plans)
}
