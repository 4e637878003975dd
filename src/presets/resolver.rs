//! Resolves preset names to their reference documents

use log::{debug, info, warn};
use tokio::sync::OnceCell;

use super::catalog::{PresetCatalogEntry, find_entry, parse_catalog};
use super::fetch::JsonFetcher;
use super::retry::RetryPolicy;
use crate::exceptions::{FetchError, ResolutionError};
use crate::project::ResolvedPreset;

/// What happened when one preset name was looked up
#[derive(Debug, Clone, PartialEq)]
pub enum PresetLookup {
    /// The project names no preset for this category
    NotRequested,
    Resolved(ResolvedPreset),
    /// The catalog entry carries no `sub_path`, so there is nothing to compare against
    NoDetail,
    Failed(ResolutionError),
}

impl PresetLookup {
    pub fn preset(&self) -> Option<&ResolvedPreset> {
        match self {
            PresetLookup::Resolved(preset) => Some(preset),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ResolutionError> {
        match self {
            PresetLookup::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Print and filament lookups for one project
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedPresets {
    pub print: PresetLookup,
    pub filament: PresetLookup,
}

/// Per-request resolver.
///
/// The catalog is fetched lazily, at most once, and the outcome (success or
/// failure) is reused by every lookup made through this resolver. Build a new
/// resolver for each request.
#[derive(Debug)]
pub struct PresetResolver<'a> {
    fetcher: &'a dyn JsonFetcher,
    profile_root: String,
    catalog_url: String,
    policy: RetryPolicy,
    catalog: OnceCell<Result<Vec<PresetCatalogEntry>, FetchError>>,
}

impl<'a> PresetResolver<'a> {
    /// `profile_root` must end with `/`; detail documents live at
    /// `profile_root + sub_path`.
    pub fn new(
        fetcher: &'a dyn JsonFetcher,
        profile_root: impl Into<String>,
        catalog_url: impl Into<String>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            fetcher,
            profile_root: profile_root.into(),
            catalog_url: catalog_url.into(),
            policy,
            catalog: OnceCell::new(),
        }
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    async fn load_catalog(&self) -> Result<Vec<PresetCatalogEntry>, FetchError> {
        let url = self.catalog_url.as_str();
        let document = self
            .policy
            .run(url, || self.fetcher.fetch_json(url))
            .await?;
        let catalog = parse_catalog(document).map_err(|reason| FetchError::Decode {
            url: url.to_string(),
            reason,
        })?;
        info!("📚 Loaded {} presets from {}", catalog.len(), url);
        Ok(catalog)
    }

    async fn catalog(&self) -> Result<&[PresetCatalogEntry], ResolutionError> {
        self.catalog
            .get_or_init(|| self.load_catalog())
            .await
            .as_deref()
            .map_err(|e| ResolutionError::CatalogUnavailable(e.clone()))
    }

    fn detail_url(&self, sub_path: &str) -> String {
        format!("{}{}", self.profile_root, sub_path.trim_start_matches('/'))
    }

    /// Look `name` up in the catalog and fetch its detail document.
    ///
    /// `Ok(None)` means the entry exists but has no `sub_path`.
    pub async fn resolve_preset(&self, name: &str) -> Result<Option<ResolvedPreset>, ResolutionError> {
        let catalog = self.catalog().await?;

        let entry = find_entry(catalog, name)
            .ok_or_else(|| ResolutionError::PresetNotFound(name.to_string()))?;

        let Some(sub_path) = entry.detail_path() else {
            debug!("📭 Preset {name} has no detail document");
            return Ok(None);
        };

        let url = self.detail_url(sub_path);
        let unavailable = |reason: String| ResolutionError::PresetDetailUnavailable {
            name: name.to_string(),
            reason,
        };

        let document = self
            .policy
            .run(&url, || self.fetcher.fetch_json(&url))
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        let preset = ResolvedPreset::from_value(document)
            .ok_or_else(|| unavailable(format!("{url} is not a JSON object")))?;
        debug!("✅ Resolved {name} ({} settings)", preset.len());
        Ok(Some(preset))
    }

    async fn lookup(&self, name: Option<&str>) -> PresetLookup {
        let Some(name) = name else {
            return PresetLookup::NotRequested;
        };
        match self.resolve_preset(name).await {
            Ok(Some(preset)) => PresetLookup::Resolved(preset),
            Ok(None) => PresetLookup::NoDetail,
            Err(e) => {
                warn!("⚠️ {e}");
                PresetLookup::Failed(e)
            }
        }
    }

    /// Resolve both presets concurrently. Each side settles on its own; one
    /// failing never stops the other.
    pub async fn resolve_pair(&self, print: Option<&str>, filament: Option<&str>) -> ResolvedPresets {
        let (print, filament) = tokio::join!(self.lookup(print), self.lookup(filament));
        ResolvedPresets { print, filament }
    }
}
