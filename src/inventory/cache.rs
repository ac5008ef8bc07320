//! JSON cache of the subnet inventory.
//!
//! Avoids repeated AWS calls while iterating on a report. A cache file holds
//! the observations of one region/filter in enumeration order.

use super::InventorySource;
use crate::models::SubnetObservation;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};

/// Contents of a cache file.
#[derive(Serialize, Deserialize, Debug, Default, Clone, PartialEq, Eq)]
pub struct InventoryCache {
    pub region: String,
    pub default_vpc: bool,
    pub subnets: Vec<SubnetObservation>,
}

/// Default cache file name, one per region, filter and day.
pub fn default_cache_file(region: &str, default_vpc: bool) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d");
    let filter = if default_vpc { "default" } else { "custom" };
    PathBuf::from(format!("subnet_cache_{region}_{filter}_{today}.json"))
}

pub fn read_inventory_cache(path: &Path) -> Result<InventoryCache, Box<dyn Error>> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading cache file {}: {e}", path.display()))?;
    let mut deserializer = serde_json::Deserializer::from_str(&json);
    let cache: InventoryCache = serde_path_to_error::deserialize(&mut deserializer)
        .map_err(|e| format!("Error parsing cache {}: path={} error={e}", path.display(), e.path()))?;
    log::info!(
        "Read {} subnets from cache file: {}",
        cache.subnets.len(),
        path.display()
    );
    Ok(cache)
}

pub fn write_inventory_cache(path: &Path, cache: &InventoryCache) -> Result<(), Box<dyn Error>> {
    let json =
        serde_json::to_string_pretty(cache).map_err(|e| format!("Error serializing JSON: {e}"))?;
    log::warn!("Writing data to cache file: {}", path.display());
    std::fs::write(path, json)
        .map_err(|e| format!("Error writing cache file {}: {e}", path.display()))?;
    Ok(())
}

/// Serves subnets from a cache file, filling it from `source` when missing.
pub struct CachedInventory<S> {
    source: S,
    path: PathBuf,
    /// The file was named explicitly and must already exist.
    required: bool,
    region: String,
    default_vpc: bool,
}

impl<S: InventorySource> CachedInventory<S> {
    /// Cache at `cache_file`, or at [`default_cache_file`] when `None`.
    pub fn new(
        source: S,
        cache_file: Option<PathBuf>,
        region: &str,
        default_vpc: bool,
    ) -> CachedInventory<S> {
        let required = cache_file.is_some();
        let path = cache_file.unwrap_or_else(|| default_cache_file(region, default_vpc));
        CachedInventory {
            source,
            path,
            required,
            region: region.to_string(),
            default_vpc,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<S: InventorySource> InventorySource for CachedInventory<S> {
    async fn subnets(&self) -> Result<Vec<SubnetObservation>, Box<dyn Error>> {
        if self.path.exists() {
            let cache = read_inventory_cache(&self.path)?;
            if cache.region != self.region || cache.default_vpc != self.default_vpc {
                log::warn!(
                    "cache {} holds region={} default_vpc={}, requested region={} default_vpc={}",
                    self.path.display(),
                    cache.region,
                    cache.default_vpc,
                    self.region,
                    self.default_vpc
                );
            }
            return Ok(cache.subnets);
        }
        if self.required {
            return Err(format!("Cache file does not exist: {}", self.path.display()).into());
        }

        log::warn!("Cache file not found: {}", self.path.display());
        let subnets = self.source.subnets().await?;
        let cache = InventoryCache {
            region: self.region.clone(),
            default_vpc: self.default_vpc,
            subnets,
        };
        write_inventory_cache(&self.path, &cache)?;
        Ok(cache.subnets)
    }
}
