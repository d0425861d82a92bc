//! The story request pipeline.
//!
//! One request moves through
//! `validating -> resolving -> safety_checking -> generating` and ends at the
//! first failing stage. The safety gate always resolves before generation is
//! dispatched. Nothing is shared between requests except the read-only
//! catalogs and the model handle.

use crate::catalog::{self, StoryOptions};
use crate::choices::ChoiceSuggester;
use crate::config::STORY_LIMITS;
use crate::dispatch::GenerationDispatcher;
use crate::error::{Stage, StoryError};
use crate::model::{StructuredModel, TextStream};
use crate::prompt::{compose_opening_instruction, compose_system_prompt};
use crate::safety::SafetyGate;
use crate::schema::ChoiceGeneration;
use crate::validation::{validate_age_band, validate_choices_request, validate_story_config};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct StoryService {
    model: Arc<dyn StructuredModel>,
    safety: SafetyGate,
    dispatcher: GenerationDispatcher,
    choices: ChoiceSuggester,
}

impl StoryService {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self {
            safety: SafetyGate::new(model.clone()),
            dispatcher: GenerationDispatcher::new(model.clone()),
            choices: ChoiceSuggester::new(model.clone()),
            model,
        }
    }

    /// Replace the dispatcher, e.g. to change the generation time ceiling.
    pub fn with_dispatcher(mut self, dispatcher: GenerationDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Provider name, for logs.
    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    /// Validate a story request, gate it, and start streaming the first chapter.
    pub async fn start_story(&self, body: &Value) -> Result<TextStream, StoryError> {
        let config = validate_story_config(body)?;
        let (author_style, location) =
            catalog::resolve(&config.author_style.id, &config.location.id)?;
        info!(
            author_style = %author_style.id,
            location = %location.id,
            target_age = %config.target_age,
            "story request accepted"
        );

        let verdict = self.safety.check(&config.user_prompt, config.target_age).await;
        if !verdict.is_appropriate {
            warn!(reason = %verdict.reason, "story prompt rejected by safety gate");
            return Err(StoryError::SafetyRejection {
                reason: verdict.reason,
            });
        }

        let system_prompt = compose_system_prompt(
            &config,
            author_style,
            location,
            config.target_age.guidelines(),
        );
        let instruction = compose_opening_instruction(&config, author_style, location);
        debug!(prompt_chars = system_prompt.len(), "dispatching chapter generation");

        let stream = self
            .dispatcher
            .dispatch(&system_prompt, &instruction)
            .await
            .map_err(|e| StoryError::upstream(Stage::Generating, e))?;
        info!("chapter stream started");
        Ok(stream)
    }

    /// Suggest reader choices for a chapter.
    pub async fn suggest_choices(&self, body: &Value) -> Result<ChoiceGeneration, StoryError> {
        let request = validate_choices_request(body)?;
        let (author_style, location) = catalog::resolve(
            &request.config.author_style.id,
            &request.config.location.id,
        )?;

        let generation = self
            .choices
            .suggest(&request.config, author_style, location, &request.chapter)
            .await
            .map_err(|e| StoryError::upstream(Stage::SuggestingChoices, e))?;
        info!(count = generation.choices.len(), "choices suggested");
        Ok(generation)
    }

    /// Catalog listing for clients. `target_age` picks the suggested prompt.
    pub fn options(&self, target_age: Option<&str>) -> Result<StoryOptions, StoryError> {
        let age = match target_age {
            Some(label) => validate_age_band(label, "targetAge")?,
            None => validate_age_band(STORY_LIMITS.default_target_age, "targetAge")?,
        };
        Ok(catalog::story_options(age))
    }
}
