//! Configuration from the environment

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Result;

use crate::clicks::Dispatch;
use crate::password::generate_secret;
use crate::redirect::DEFAULT_COUNTDOWN_SECONDS;
use crate::storage;
use crate::utils::env_var_or_else;
use crate::utils::parse_env_var_or;

const DEFAULT_ADDRESS: &str = "0.0.0.0:6000";

/// Seconds a resolved short code is cached, unless configured otherwise
const DEFAULT_RESOLVE_CACHE_TTL_SECONDS: u64 = 30;

/// Everything needed to start Linkshort
pub struct Config {
    /// Address to listen on
    pub address: SocketAddr,

    /// Where links and clicks are stored
    pub storage: storage::Config,

    /// Behavior of the app itself
    pub app: AppConfig,
}

/// Behavior of the app, independent of where it runs
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Secret to sign access tokens with
    pub jwt_secret: String,

    /// How clicks on the redirect paths are recorded
    pub click_dispatch: Dispatch,

    /// How long resolved short codes are cached, `None` disables the cache
    pub resolve_cache_ttl: Option<Duration>,

    /// Seconds counted down before redirecting
    pub countdown_seconds: u32,
}

impl Config {
    /// Read the configuration from ENV vars
    ///
    /// # Errors
    ///
    /// Will return `Err` when a set value can not be parsed
    pub fn from_env() -> Result<Self> {
        let storage = match std::env::var("DATABASE_URL") {
            Ok(database_url) if !database_url.is_empty() => storage::Config::Postgres(database_url),
            _ => {
                tracing::info!("`DATABASE_URL` is not set, keeping everything in memory");

                storage::Config::Memory
            }
        };

        Ok(Self {
            address: address_from_env()?,
            storage,
            app: AppConfig::from_env()?,
        })
    }
}

impl AppConfig {
    /// Read the app configuration from ENV vars
    ///
    /// # Errors
    ///
    /// Will return `Err` when a set value can not be parsed
    pub fn from_env() -> Result<Self> {
        let jwt_secret = env_var_or_else("JWT_SECRET", || {
            let jwt_secret = generate_secret();
            tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
            jwt_secret
        });

        let click_dispatch = parse_env_var_or("CLICK_ACCOUNTING", Dispatch::Background)?;

        let resolve_cache_ttl =
            parse_env_var_or("RESOLVE_CACHE_TTL_SECONDS", DEFAULT_RESOLVE_CACHE_TTL_SECONDS)?;

        let countdown_seconds =
            parse_env_var_or("REDIRECT_COUNTDOWN_SECONDS", DEFAULT_COUNTDOWN_SECONDS)?;

        Ok(Self {
            jwt_secret,
            click_dispatch,
            resolve_cache_ttl: (resolve_cache_ttl > 0)
                .then(|| Duration::from_secs(resolve_cache_ttl)),
            countdown_seconds,
        })
    }
}

fn address_from_env() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
