//! Request payloads, story data and model output contracts.
//!
//! The output contracts derive [`ResponseSchema`], so the schema sent to the
//! model is generated from the same struct the reply is decoded into.

use serde::{Deserialize, Serialize};
use story_macros::ResponseSchema;

/// A children's author whose voice the story imitates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorStyle {
    pub id: String,
    pub name: String,
    pub description: String,
    pub example_phrases: Vec<String>,
}

/// Where the story takes place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Target reader age band. Free-form ages are never accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgeBand {
    #[serde(rename = "3-5")]
    Preschool,
    #[serde(rename = "6-8")]
    EarlyReader,
    #[serde(rename = "9-12")]
    Preteen,
}

impl AgeBand {
    pub const ALL: [AgeBand; 3] = [AgeBand::Preschool, AgeBand::EarlyReader, AgeBand::Preteen];

    /// The wire label, e.g. `"6-8"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBand::Preschool => "3-5",
            AgeBand::EarlyReader => "6-8",
            AgeBand::Preteen => "9-12",
        }
    }

    pub fn parse(label: &str) -> Option<AgeBand> {
        AgeBand::ALL.into_iter().find(|band| band.as_str() == label)
    }

    pub fn labels() -> Vec<&'static str> {
        AgeBand::ALL.iter().map(AgeBand::as_str).collect()
    }
}

impl std::fmt::Display for AgeBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated story request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryConfig {
    pub author_style: AuthorStyle,
    pub location: Location,
    pub user_prompt: String,
    pub target_age: AgeBand,
}

/// Chapter text a reader is choosing how to continue from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterText {
    pub title: String,
    pub content: String,
}

/// A validated request for reader choices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoicesRequest {
    pub config: StoryConfig,
    pub chapter: ChapterText,
}

/// One generated chapter of a story
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ResponseSchema)]
#[serde(rename_all = "camelCase")]
#[schema(rename_all = "camelCase")]
pub struct ChapterGeneration {
    /// The title of the chapter
    pub title: String,
    /// The main story content for this chapter
    pub content: String,
    /// Whether this chapter concludes the story
    pub is_conclusion: bool,
}

/// Safety verdict on a story prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ResponseSchema)]
#[serde(rename_all = "camelCase")]
#[schema(rename_all = "camelCase")]
pub struct SafetyValidation {
    /// Whether the content is appropriate for children
    pub is_appropriate: bool,
    /// Brief explanation of why the content is or is not appropriate
    pub reason: String,
}

impl SafetyValidation {
    pub fn approved(reason: impl Into<String>) -> Self {
        Self {
            is_appropriate: true,
            reason: reason.into(),
        }
    }

    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            is_appropriate: false,
            reason: reason.into(),
        }
    }
}

/// A choice the reader can make after a chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ResponseSchema)]
pub struct StoryChoice {
    /// The choice text presented to the user
    pub text: String,
}

/// Story choices for the reader to select from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ResponseSchema)]
pub struct ChoiceGeneration {
    /// Story choices for the user to select from
    #[schema(min_items = 2, max_items = 4)]
    pub choices: Vec<StoryChoice>,
}

/// A chapter as held by the client between requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryChapter {
    pub title: String,
    pub content: String,
    pub choices: Vec<StoryChoice>,
    pub is_conclusion: bool,
}

/// Whole-story state. Lives on the client; the server never stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryState {
    pub id: String,
    pub config: StoryConfig,
    pub chapters: Vec<StoryChapter>,
    pub is_complete: bool,
    /// Text of each choice the reader picked, in order.
    pub user_choices: Vec<String>,
}

impl StoryState {
    pub fn new(id: impl Into<String>, config: StoryConfig) -> Self {
        Self {
            id: id.into(),
            config,
            chapters: Vec::new(),
            is_complete: false,
            user_choices: Vec::new(),
        }
    }

    /// Append a generated chapter; a concluding chapter completes the story.
    pub fn push_chapter(&mut self, chapter: ChapterGeneration, choices: Vec<StoryChoice>) {
        self.is_complete = chapter.is_conclusion;
        self.chapters.push(StoryChapter {
            title: chapter.title,
            content: chapter.content,
            choices,
            is_conclusion: chapter.is_conclusion,
        });
    }
}
