use std::{ffi::OsString, fs, path::PathBuf};

use chrono::{DateTime, Local, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::{core::dataset::Dataset, prelude::*};

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

impl<F: Fn() -> DateTime<Local>> Clock for F {
    fn now(&self) -> DateTime<Local> {
        self()
    }
}

/// Durable slot for at most one cache entry.
pub trait Storage {
    /// Read the entry back, [`None`] if nothing has been stored yet.
    fn load(&self) -> Result<Option<CacheEntry>>;

    /// Replace the stored entry as a whole.
    fn save(&self, entry: &CacheEntry) -> Result;
}

#[must_use]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub fetched_at: DateTime<Local>,
    pub dataset: Dataset,
}

/// TOML file storage.
///
/// Writes go to a sibling temporary file which is then renamed over the target,
/// so a reader sees either the old entry or the new one.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temporary_path(&self) -> PathBuf {
        let mut name = OsString::from(self.path.as_os_str());
        name.push(".tmp");
        PathBuf::from(name)
    }
}

impl Storage for FileStorage {
    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn load(&self) -> Result<Option<CacheEntry>> {
        if !self.path.is_file() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&self.path).context("failed to read the cache")?;
        let entry = toml::from_str(&contents).context("failed to decode the cache")?;
        Ok(Some(entry))
    }

    #[instrument(skip_all, fields(path = %self.path.display()))]
    fn save(&self, entry: &CacheEntry) -> Result {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create `{}`", parent.display()))?;
        }
        let temporary_path = self.temporary_path();
        fs::write(&temporary_path, toml::to_string(entry)?)
            .with_context(|| format!("failed to write `{}`", temporary_path.display()))?;
        fs::rename(&temporary_path, &self.path).context("failed to replace the cache")?;
        Ok(())
    }
}

/// Time-boxed cache of the combined dataset.
pub struct CacheManager<S, C> {
    storage: S,
    clock: C,
    ttl: TimeDelta,
}

impl<S: Storage, C: Clock> CacheManager<S, C> {
    pub const fn new(storage: S, clock: C, ttl: TimeDelta) -> Self {
        Self { storage, clock, ttl }
    }

    /// Fresh means strictly younger than the time-to-live.
    #[must_use]
    pub fn is_fresh(&self, entry: Option<&CacheEntry>, now: DateTime<Local>) -> bool {
        entry.is_some_and(|entry| now - entry.fetched_at < self.ttl)
    }

    /// Load the stored entry, treating an unreadable one as absent.
    pub fn load(&self) -> Option<CacheEntry> {
        self.storage.load().unwrap_or_else(|error| {
            warn!("ignoring the cache: {error:#}");
            None
        })
    }

    pub fn save(&self, entry: &CacheEntry) -> Result {
        self.storage.save(entry)
    }

    /// Return the cached entry while it is fresh, otherwise fetch, store and return a new one.
    ///
    /// Fetch failures are not masked by a stale entry.
    #[instrument(skip_all)]
    pub fn get(&self, fetch: impl FnOnce() -> Result<Dataset>) -> Result<CacheEntry> {
        let cached = self.load();
        if self.is_fresh(cached.as_ref(), self.clock.now())
            && let Some(entry) = cached
        {
            info!(fetched_at = %entry.fetched_at, "using the cached data…");
            return Ok(entry);
        }

        info!("fetching fresh data…");
        let dataset = fetch()?;
        let entry = CacheEntry { fetched_at: self.clock.now(), dataset };
        self.save(&entry).context("failed to save the cache")?;
        info!(
            n_sessions = entry.dataset.sessions.len(),
            n_prices = entry.dataset.prices.len(),
            "cached",
        );
        Ok(entry)
    }
}
