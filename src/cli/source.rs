use std::path::PathBuf;

use chrono::TimeDelta;
use clap::Parser;

use crate::{
    api::{
        tibber::{self, PriceExport},
        wallbox::{self, SessionExport},
    },
    core::{
        cache::{CacheManager, FileStorage, SystemClock},
        dataset::Dataset,
    },
    prelude::*,
};

/// Where the sessions and the prices come from.
#[derive(Parser)]
pub struct SourceArgs {
    #[clap(flatten)]
    pub wallbox: WallboxArgs,

    #[clap(flatten)]
    pub tibber: TibberArgs,

    #[clap(flatten)]
    pub cache: CacheArgs,
}

#[derive(Parser)]
pub struct WallboxArgs {
    /// Wallbox charging session export URL.
    #[clap(long = "wallbox-export-url", env = "WALLBOX_EXPORT_URL", hide_env_values = true)]
    pub export_url: String,
}

#[derive(Parser)]
pub struct TibberArgs {
    #[clap(long = "tibber-access-token", env = "TIBBER_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: String,

    /// Number of hourly intervals per consumption page.
    #[clap(long = "tibber-page-size", env = "TIBBER_PAGE_SIZE", default_value = "744")]
    pub page_size: u32,
}

#[derive(Parser)]
pub struct CacheArgs {
    #[clap(long = "cache-path", env = "CACHE_PATH", default_value = "cache.toml")]
    pub path: PathBuf,

    /// How long the fetched data stays valid.
    #[clap(long = "cache-ttl", env = "CACHE_TTL", default_value = "1h")]
    pub ttl: humantime::Duration,
}

impl CacheArgs {
    pub fn ttl(&self) -> Result<TimeDelta> {
        TimeDelta::from_std(self.ttl.into()).context("the cache time-to-live is too long")
    }
}

impl SourceArgs {
    /// Load the dataset from the cache, or from both providers when the cache is stale.
    #[instrument(skip_all, fields(cache_path = %self.cache.path.display()))]
    pub fn load(&self) -> Result<Dataset> {
        let manager =
            CacheManager::new(FileStorage::new(&self.cache.path), SystemClock, self.cache.ttl()?);
        Ok(manager.get(|| self.fetch())?.dataset)
    }

    fn fetch(&self) -> Result<Dataset> {
        let sessions = wallbox::Api::new(self.wallbox.export_url.clone())
            .get_sessions()
            .context("failed to fetch the charging sessions")?;
        let prices = tibber::Api::new(&self.tibber.access_token, self.tibber.page_size)
            .get_prices()
            .context("failed to fetch the prices")?;
        Ok(merge(sessions, prices))
    }
}

/// Combine both exports, preferring the address and the owner from the price provider.
fn merge(sessions: SessionExport, prices: PriceExport) -> Dataset {
    Dataset {
        columns: sessions.columns,
        sessions: sessions.sessions,
        prices: prices.prices,
        address: prices.address.or(sessions.address).unwrap_or_default(),
        owner: prices.owner.or(sessions.owner).unwrap_or_default(),
    }
}
