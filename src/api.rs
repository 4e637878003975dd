//! High-level API for slicelens operations
//!
//! [`Analyzer`] runs one request end to end: upload checks, extraction,
//! preset resolution, comparison, description and the LLM call. Input
//! problems come back as [`SliceLensError`]; network and LLM problems are
//! folded into the report instead.

use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::analysis::prompt::{
    profile_system_prompt, profile_user_message, troubleshooting_system_prompt,
    troubleshooting_user_message,
};
use crate::analysis::{
    AnalysisProvider, AnalysisResult, Guidance, interpret_guidance_reply, interpret_profile_reply,
    provider_from_config,
};
use crate::compare::{ComparisonItem, describe, describe_troubleshooting, reconcile};
use crate::config::AnalyzerConfig;
use crate::exceptions::{Result, SliceLensError};
use crate::gcode::{gunzip_limited, locate_gcode_config_block};
use crate::project::archive::sha256_hex;
use crate::project::locator::decode_text;
use crate::project::{
    ConfigFile, ExtractedFile, config_files, extract_archive, inventory, locate_project_settings,
};
use crate::presets::{HttpFetcher, JsonFetcher, PresetLookup, PresetResolver};

/// How one preset lookup went, in report form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresetSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// `resolved`, `no_detail`, `not_requested` or `failed`
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setting_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PresetSummary {
    fn new(name: Option<&str>, lookup: &PresetLookup) -> Self {
        let (status, setting_count, error) = match lookup {
            PresetLookup::NotRequested => ("not_requested", None, None),
            PresetLookup::Resolved(preset) => ("resolved", Some(preset.len()), None),
            PresetLookup::NoDetail => ("no_detail", None, None),
            PresetLookup::Failed(e) => ("failed", None, Some(e.to_string())),
        };
        Self {
            name: name.map(str::to_string),
            status,
            setting_count,
            error,
        }
    }
}

/// Everything derived from a 3MF upload before the LLM is involved
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedProject {
    pub file_name: String,
    pub size: usize,
    pub sha256: String,
    /// Soft problems such as a missing 3MF structure
    pub warnings: Vec<String>,
    pub extracted_files: Vec<ExtractedFile>,
    pub config_files: Vec<ConfigFile>,
    pub print_preset: PresetSummary,
    pub filament_preset: PresetSummary,
    /// Preset resolution failures; the comparison lacks those categories
    pub preset_issues: Vec<String>,
    pub comparison: Vec<ComparisonItem>,
    /// Text handed to the LLM
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    #[serde(flatten)]
    pub project: PreparedProject,
    pub analysis: AnalysisResult,
}

/// Everything derived from a G-code upload before the LLM is involved
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedTroubleshooting {
    /// Upload name with any `.gz` suffix removed
    pub file_name: String,
    pub compressed_size: usize,
    pub decompressed_size: usize,
    pub settings: BTreeMap<String, String>,
    pub skipped_lines: usize,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TroubleshootReport {
    #[serde(flatten)]
    pub gcode: PreparedTroubleshooting,
    pub guidance: Guidance,
}

/// Request handler holding the configuration and both collaborators
#[derive(Debug)]
pub struct Analyzer {
    config: AnalyzerConfig,
    fetcher: Box<dyn JsonFetcher>,
    provider: Box<dyn AnalysisProvider>,
}

impl Analyzer {
    pub fn new(
        config: AnalyzerConfig,
        fetcher: Box<dyn JsonFetcher>,
        provider: Box<dyn AnalysisProvider>,
    ) -> Self {
        Self {
            config,
            fetcher,
            provider,
        }
    }

    /// Analyzer with the HTTP fetcher and the configured LLM provider.
    /// A missing LLM configuration is not an error here; analyses then
    /// come back as failed results.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new()
            .map_err(|e| SliceLensError::Generic(format!("Failed to build HTTP client: {e}")))?;
        let provider = provider_from_config(&config);
        Ok(Self::new(config, Box::new(fetcher), provider))
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    fn check_project_upload(&self, file_name: &str, bytes: &[u8]) -> Result<()> {
        if !file_name.to_ascii_lowercase().ends_with(".3mf") {
            return Err(SliceLensError::InvalidInput(format!(
                "{file_name} is not a .3mf file"
            )));
        }
        if bytes.len() > self.config.max_project_bytes {
            return Err(SliceLensError::FileTooLarge {
                limit: self.config.max_project_bytes,
                actual: Some(bytes.len()),
            });
        }
        Ok(())
    }

    /// Run a 3MF upload through extraction, preset resolution, comparison
    /// and description
    pub async fn prepare_project(&self, file_name: &str, bytes: &[u8]) -> Result<PreparedProject> {
        self.check_project_upload(file_name, bytes)?;

        let sha256 = sha256_hex(bytes);
        info!("📖 Analyzing {} ({} bytes, sha256 {})", file_name, bytes.len(), sha256);

        let archive = extract_archive(bytes)?;
        let mut warnings = Vec::new();
        if !archive.has_3mf_structure() {
            warnings.push(
                "The archive does not have a standard 3MF structure (3D/3dmodel.model, _rels/.rels, [Content_Types].xml)"
                    .to_string(),
            );
        }

        let settings = locate_project_settings(&archive)?;
        let print_name = settings.print_settings_id();
        let filament_name = settings.filament_settings_id();
        debug!(
            "🔍 Print preset {:?}, filament preset {:?}",
            print_name, filament_name
        );

        let resolver = PresetResolver::new(
            self.fetcher.as_ref(),
            self.config.profile_root.clone(),
            self.config.catalog_url(),
            self.config.retry_policy(),
        );
        let presets = resolver.resolve_pair(print_name, filament_name).await;

        let preset_issues: Vec<String> = [&presets.print, &presets.filament]
            .into_iter()
            .filter_map(|lookup| lookup.error().map(|e| e.to_string()))
            .collect();

        let comparison = reconcile(presets.print.preset(), presets.filament.preset(), &settings);
        let description = describe(&settings, &comparison);
        debug!("✅ {} settings compared", comparison.len());

        Ok(PreparedProject {
            file_name: file_name.to_string(),
            size: bytes.len(),
            sha256,
            warnings,
            extracted_files: inventory(&archive),
            config_files: config_files(&archive),
            print_preset: PresetSummary::new(print_name, &presets.print),
            filament_preset: PresetSummary::new(filament_name, &presets.filament),
            preset_issues,
            comparison,
            description,
        })
    }

    async fn request_analysis(&self, description: &str) -> AnalysisResult {
        let reply = self
            .provider
            .complete(&profile_system_prompt(), &profile_user_message(description))
            .await;
        interpret_profile_reply(reply)
    }

    /// Full 3MF analysis. LLM failures give a labelled fallback analysis.
    pub async fn analyze_project(&self, file_name: &str, bytes: &[u8]) -> Result<AnalysisReport> {
        let project = self.prepare_project(file_name, bytes).await?;
        let analysis = self.request_analysis(&project.description).await;
        Ok(AnalysisReport { project, analysis })
    }

    /// Analyze a profile description directly, e.g. one produced by
    /// [`Analyzer::prepare_project`] and then edited by hand
    pub async fn analyze_description(&self, description: &str) -> Result<AnalysisResult> {
        if description.trim().is_empty() {
            return Err(SliceLensError::InvalidInput(
                "a profile description is required".to_string(),
            ));
        }
        debug!("📖 Analyzing a {} char description", description.len());
        Ok(self.request_analysis(description).await)
    }

    /// Decompress a gzip G-code upload and describe its config block
    pub fn prepare_troubleshooting(
        &self,
        file_name: &str,
        bytes: &[u8],
        problem: &str,
    ) -> Result<PreparedTroubleshooting> {
        if problem.trim().is_empty() {
            return Err(SliceLensError::InvalidInput(
                "a problem description is required".to_string(),
            ));
        }

        let display_name = file_name.strip_suffix(".gz").unwrap_or(file_name);
        info!("📖 Troubleshooting {} ({} compressed bytes)", display_name, bytes.len());

        let decompressed = gunzip_limited(bytes, self.config.max_gcode_bytes)?;
        let text = decode_text(&decompressed);

        let block = locate_gcode_config_block(&text).inspect_err(|e| {
            warn!("❌ {}: {}", display_name, e.detail());
        })?;
        if block.skipped_lines() > 0 {
            debug!("{} config lines had no '='", block.skipped_lines());
        }

        Ok(PreparedTroubleshooting {
            file_name: display_name.to_string(),
            compressed_size: bytes.len(),
            decompressed_size: decompressed.len(),
            settings: block.entries().clone(),
            skipped_lines: block.skipped_lines(),
            description: describe_troubleshooting(problem, &block),
        })
    }

    /// Full troubleshooting request. LLM failures give fallback guidance.
    pub async fn troubleshoot_gcode(
        &self,
        file_name: &str,
        bytes: &[u8],
        problem: &str,
    ) -> Result<TroubleshootReport> {
        let gcode = self.prepare_troubleshooting(file_name, bytes, problem)?;

        let reply = self
            .provider
            .complete(
                &troubleshooting_system_prompt(),
                &troubleshooting_user_message(&gcode.description),
            )
            .await;
        let guidance = interpret_guidance_reply(reply);

        Ok(TroubleshootReport { gcode, guidance })
    }
}
