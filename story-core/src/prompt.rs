//! Prompt composition for chapter generation.
//!
//! Pure string assembly: identical inputs always produce identical prompts.

use crate::catalog::AgeGuidelines;
use crate::config::STORY_LIMITS;
use crate::schema::{AuthorStyle, Location, StoryConfig};

/// System prompt that frames every chapter of the story.
pub fn compose_system_prompt(
    config: &StoryConfig,
    author_style: &AuthorStyle,
    location: &Location,
    guidelines: &AgeGuidelines,
) -> String {
    let min_chapters = STORY_LIMITS.chapters_before_conclusion;
    format!(
        r#"You are a children's story generator creating age-appropriate content for {age} year olds.

Author Style: {style_name} - {style_description}
Location: {location_name} - {location_description}

Age Guidelines:
- Complexity: {complexity}
- Length: {length}
- Themes: {themes}
- Avoid: {avoid}

Story Structure:
- Create at least {min_chapters} chapters before considering the story complete
- After {min_chapters} chapters, you may end the story naturally when it feels complete
- Each chapter should advance the plot and develop characters
- End with a satisfying conclusion that teaches a positive lesson

Create the next chapter of an engaging and safe story."#,
        age = config.target_age,
        style_name = author_style.name,
        style_description = author_style.description,
        location_name = location.name,
        location_description = location.description,
        complexity = guidelines.max_complexity,
        length = guidelines.max_length,
        themes = guidelines.themes.join(", "),
        avoid = guidelines.avoid.join(", "),
    )
}

/// User-facing instruction for the opening chapter.
pub fn compose_opening_instruction(
    config: &StoryConfig,
    author_style: &AuthorStyle,
    location: &Location,
) -> String {
    format!(
        "Create the first chapter of a story with this prompt: \"{}\". Set in {}. Write in the style of {}.",
        config.user_prompt, location.name, author_style.name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{author_style_by_id, location_by_id};
    use crate::schema::AgeBand;

    fn config(age: AgeBand) -> StoryConfig {
        StoryConfig {
            author_style: author_style_by_id("dr-seuss").unwrap().clone(),
            location: location_by_id("magical-forest").unwrap().clone(),
            user_prompt: "a bunny who learns to share".into(),
            target_age: age,
        }
    }

    #[test]
    fn test_system_prompt_embeds_everything() {
        let config = config(AgeBand::Preschool);
        let prompt = compose_system_prompt(
            &config,
            &config.author_style,
            &config.location,
            AgeBand::Preschool.guidelines(),
        );

        assert!(prompt.starts_with(
            "You are a children's story generator creating age-appropriate content for 3-5 year olds."
        ));
        assert!(prompt.contains("Author Style: Dr. Seuss - Whimsical rhymes"));
        assert!(prompt.contains("Location: Enchanted Forest - A mystical woodland"));
        assert!(prompt.contains("- Complexity: simple\n- Length: very short"));
        assert!(prompt.contains("- Themes: basic emotions, simple problem-solving, family and friends"));
        assert!(prompt.contains("- Avoid: conflict, scary elements, complex emotions"));
        assert!(prompt.contains("Create at least 5 chapters"));
        assert!(prompt.contains("advance the plot"));
        assert!(prompt.contains("teaches a positive lesson"));
        assert!(prompt.ends_with("Create the next chapter of an engaging and safe story."));
    }

    #[test]
    fn test_system_prompt_is_deterministic() {
        let config = config(AgeBand::Preteen);
        let guidelines = AgeBand::Preteen.guidelines();
        let first = compose_system_prompt(&config, &config.author_style, &config.location, guidelines);
        let second = compose_system_prompt(&config, &config.author_style, &config.location, guidelines);
        assert_eq!(first.as_bytes(), second.as_bytes());
    }

    #[test]
    fn test_guidelines_follow_age_band() {
        let config = config(AgeBand::Preteen);
        let prompt = compose_system_prompt(
            &config,
            &config.author_style,
            &config.location,
            AgeBand::Preteen.guidelines(),
        );
        assert!(prompt.contains("for 9-12 year olds"));
        assert!(prompt.contains("- Complexity: moderate to complex"));
        assert!(prompt.contains("romance"));
    }

    #[test]
    fn test_opening_instruction() {
        let config = config(AgeBand::Preschool);
        assert_eq!(
            compose_opening_instruction(&config, &config.author_style, &config.location),
            "Create the first chapter of a story with this prompt: \"a bunny who learns to share\". Set in Enchanted Forest. Write in the style of Dr. Seuss."
        );
    }
}
