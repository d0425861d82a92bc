//! Reader choice suggestions for a finished chapter.

use crate::config::{MODEL_CONFIG, STORY_LIMITS};
use crate::model::{ModelError, ModelMessage, ObjectRequest, StructuredModel};
use crate::schema::{AuthorStyle, ChapterText, ChoiceGeneration, Location, StoryConfig};
use std::sync::Arc;

pub struct ChoiceSuggester {
    model: Arc<dyn StructuredModel>,
}

impl ChoiceSuggester {
    pub fn new(model: Arc<dyn StructuredModel>) -> Self {
        Self { model }
    }

    pub fn request_for(
        config: &StoryConfig,
        author_style: &AuthorStyle,
        location: &Location,
        chapter: &ChapterText,
    ) -> ObjectRequest {
        let guidelines = config.target_age.guidelines();
        let system = format!(
            "You suggest what happens next in a children's story for {age} year olds, written in the style of {style} and set in {place}. \
Offer between {min} and {max} short, distinct choices the reader can pick from. \
Every choice must be safe and kind, fit these themes: {themes}, and avoid: {avoid}.",
            age = config.target_age,
            style = author_style.name,
            place = location.name,
            min = STORY_LIMITS.min_choices,
            max = STORY_LIMITS.max_choices,
            themes = guidelines.themes.join(", "),
            avoid = guidelines.avoid.join(", "),
        );
        let user = format!(
            "The story so far is based on: \"{}\".\n\nChapter \"{}\":\n{}\n\nWhat could the reader choose to happen next?",
            config.user_prompt, chapter.title, chapter.content
        );

        ObjectRequest::new(MODEL_CONFIG.choices, ChoiceGeneration::response_schema())
            .with_message(ModelMessage::system(system))
            .with_message(ModelMessage::user(user))
            .with_temperature(MODEL_CONFIG.temperature)
            .with_max_output_tokens(MODEL_CONFIG.max_tokens)
    }

    /// Ask the model for choices; the reply must hold an allowed number of them.
    pub async fn suggest(
        &self,
        config: &StoryConfig,
        author_style: &AuthorStyle,
        location: &Location,
        chapter: &ChapterText,
    ) -> Result<ChoiceGeneration, ModelError> {
        let value = self
            .model
            .generate_object(Self::request_for(config, author_style, location, chapter))
            .await?;
        let generation: ChoiceGeneration =
            serde_json::from_value(value).map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        let count = generation.choices.len();
        if !(STORY_LIMITS.min_choices..=STORY_LIMITS.max_choices).contains(&count) {
            return Err(ModelError::InvalidResponse(format!(
                "expected {}-{} choices, got {count}",
                STORY_LIMITS.min_choices, STORY_LIMITS.max_choices
            )));
        }
        if generation.choices.iter().any(|c| c.text.trim().is_empty()) {
            return Err(ModelError::InvalidResponse("empty choice text".into()));
        }
        Ok(generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::resolve;
    use crate::model::MessageRole;
    use crate::schema::AgeBand;
    use crate::testing::MockModel;
    use serde_json::json;

    fn fixture() -> (StoryConfig, ChapterText) {
        let (style, location) = resolve("beatrix-potter", "underwater-city").unwrap();
        let config = StoryConfig {
            author_style: style.clone(),
            location: location.clone(),
            user_prompt: "a crab who is afraid of the dark".into(),
            target_age: AgeBand::EarlyReader,
        };
        let chapter = ChapterText {
            title: "Night Falls".into(),
            content: "The reef grew dim.".into(),
        };
        (config, chapter)
    }

    #[test]
    fn test_request_shape() {
        let (config, chapter) = fixture();
        let request = ChoiceSuggester::request_for(
            &config,
            &config.author_style,
            &config.location,
            &chapter,
        );
        assert_eq!(request.model, MODEL_CONFIG.choices);
        assert_eq!(request.schema["properties"]["choices"]["maxItems"], 4);
        let system = request.message(MessageRole::System).unwrap();
        assert!(system.contains("6-8 year olds"));
        assert!(system.contains("Beatrix Potter"));
        assert!(system.contains("between 2 and 4"));
        assert!(request.message(MessageRole::User).unwrap().contains("The reef grew dim."));
    }

    #[tokio::test]
    async fn test_suggest_accepts_bounded_choices() {
        let (config, chapter) = fixture();
        let model = Arc::new(MockModel::new().with_object(json!({
            "choices": [{"text": "Light a lantern fish"}, {"text": "Ask the octopus for help"}]
        })));
        let suggester = ChoiceSuggester::new(model);

        let generation = suggester
            .suggest(&config, &config.author_style, &config.location, &chapter)
            .await
            .unwrap();
        assert_eq!(generation.choices.len(), 2);
    }

    #[tokio::test]
    async fn test_suggest_rejects_too_few_or_too_many() {
        let (config, chapter) = fixture();
        let one = json!({"choices": [{"text": "Only one"}]});
        let five = json!({"choices": [
            {"text": "a"}, {"text": "b"}, {"text": "c"}, {"text": "d"}, {"text": "e"}
        ]});
        let model = Arc::new(MockModel::new().with_object(one).with_object(five));
        let suggester = ChoiceSuggester::new(model);

        for _ in 0..2 {
            let result = suggester
                .suggest(&config, &config.author_style, &config.location, &chapter)
                .await;
            assert!(matches!(result, Err(ModelError::InvalidResponse(_))));
        }
    }

    #[tokio::test]
    async fn test_suggest_propagates_model_failure() {
        let (config, chapter) = fixture();
        let model = Arc::new(MockModel::new().with_object_failure("unavailable"));
        let suggester = ChoiceSuggester::new(model);
        let result = suggester
            .suggest(&config, &config.author_style, &config.location, &chapter)
            .await;
        assert!(matches!(result, Err(ModelError::Unavailable(_))));
    }
}
