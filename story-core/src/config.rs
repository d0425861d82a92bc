//! Fixed generation parameters.
//!
//! None of these are runtime-configurable; deployments only choose the API
//! key and listen address.

use gemini::{HarmBlockThreshold, HarmCategory, SafetySetting};
use serde::Serialize;
use std::time::Duration;

/// Model identifiers and sampling parameters.
#[derive(Debug, Clone, Copy)]
pub struct ModelConfig {
    /// Model used for chapter generation.
    pub generation: &'static str,
    /// Model used by the safety gate.
    pub safety: &'static str,
    /// Model used to suggest reader choices.
    pub choices: &'static str,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: f32,
    pub top_k: u32,
    /// Low temperature keeps safety verdicts consistent between calls.
    pub safety_temperature: f32,
}

pub const MODEL_CONFIG: ModelConfig = ModelConfig {
    generation: "gemini-2.5-flash",
    safety: "gemini-2.5-flash",
    choices: "gemini-2.5-flash",
    temperature: 0.8,
    max_tokens: 1000,
    top_p: 0.9,
    top_k: 40,
    safety_temperature: 0.1,
};

/// Provider-side content filters attached to every model call.
pub const SAFETY_SETTINGS: [SafetySetting; 4] = [
    SafetySetting::new(HarmCategory::Harassment, HarmBlockThreshold::BlockMediumAndAbove),
    SafetySetting::new(HarmCategory::HateSpeech, HarmBlockThreshold::BlockMediumAndAbove),
    SafetySetting::new(
        HarmCategory::SexuallyExplicit,
        HarmBlockThreshold::BlockMediumAndAbove,
    ),
    SafetySetting::new(
        HarmCategory::DangerousContent,
        HarmBlockThreshold::BlockMediumAndAbove,
    ),
];

/// Story shape limits. Published to clients with the catalog listing.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryLimits {
    pub min_chapters: usize,
    pub max_chapters: usize,
    pub default_chapters: usize,
    /// Chapter length bounds, in words.
    pub min_chapter_words: usize,
    pub max_chapter_words: usize,
    pub min_choices: usize,
    pub max_choices: usize,
    /// Chapters the prompt asks for before the story may conclude.
    pub chapters_before_conclusion: usize,
    pub default_target_age: &'static str,
    pub default_author_style: &'static str,
    pub default_location: &'static str,
}

pub const STORY_LIMITS: StoryLimits = StoryLimits {
    min_chapters: 1,
    max_chapters: 10,
    default_chapters: 3,
    min_chapter_words: 100,
    max_chapter_words: 500,
    min_choices: 2,
    max_choices: 4,
    chapters_before_conclusion: 5,
    default_target_age: "3-5",
    default_author_style: "dr-seuss",
    default_location: "magical-forest",
};

/// Request body limits.
pub const USER_PROMPT_MAX_CHARS: usize = 1000;
pub const CHAPTER_TITLE_MAX_CHARS: usize = 200;
pub const CHAPTER_CONTENT_MAX_CHARS: usize = 10_000;

/// Upper bound on how long a generation stream is relayed.
pub const MAX_GENERATION_TIME: Duration = Duration::from_secs(30);
