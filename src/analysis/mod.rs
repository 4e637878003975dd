//! LLM-backed analysis: prompts, the provider seam, and reply validation

pub mod parse;
pub mod prompt;
pub mod provider;

pub use parse::{
    AnalysisOutcome, AnalysisResult, Guidance, ParameterEffect, ProfileAnalysis, ScalarValue,
    interpret_guidance_reply, interpret_profile_reply, parse_profile_analysis, salvage,
};
pub use provider::{AnalysisProvider, LlmProvider, UnavailableProvider, provider_from_config};
