//! Static reference data: author styles, locations and age guidelines.
//!
//! The tables are built once on first use and never mutated, so they are
//! shared freely across concurrent requests.

use crate::config::{StoryLimits, STORY_LIMITS};
use crate::schema::{AgeBand, AuthorStyle, Location};
use rand::seq::SliceRandom;
use serde::Serialize;
use thiserror::Error;

/// Fallback when an age band has no default prompts.
const FALLBACK_PROMPT: &str = "A wonderful adventure that teaches an important lesson";

/// Returned when a request names an author style or location we do not know.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid author style or location")]
pub struct ReferenceNotFound {
    pub author_style_id: String,
    pub location_id: String,
}

/// Content guidance for one age band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgeGuidelines {
    pub max_complexity: &'static str,
    pub max_length: &'static str,
    pub themes: &'static [&'static str],
    pub avoid: &'static [&'static str],
}

fn author(id: &str, name: &str, description: &str, phrases: [&str; 3]) -> AuthorStyle {
    AuthorStyle {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        example_phrases: phrases.iter().map(|p| p.to_string()).collect(),
    }
}

fn location(id: &str, name: &str, description: &str) -> Location {
    Location {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    }
}

lazy_static::lazy_static! {
    /// Famous children's authors with distinctive voices.
    pub static ref AUTHOR_STYLES: Vec<AuthorStyle> = vec![
        author(
            "dr-seuss",
            "Dr. Seuss",
            "Whimsical rhymes, made-up words, and fantastical creatures in colorful worlds",
            [
                "In a world where the trees are purple and the sky is green",
                "The Sneetches with stars upon thars",
                "Oh, the places you'll go with your imagination",
            ],
        ),
        author(
            "shel-silverstein",
            "Shel Silverstein",
            "Playful poetry with gentle humor, simple illustrations, and life lessons",
            [
                "Where the sidewalk ends and the wild things begin",
                "A light in the attic, a dream in the pocket",
                "The giving tree that loved a little boy",
            ],
        ),
        author(
            "l-frank-baum",
            "L. Frank Baum",
            "Classic fantasy adventures with magical lands, talking animals, and brave heroes",
            [
                "Somewhere over the rainbow, dreams really do come true",
                "There's no place like home, but adventure calls",
                "The yellow brick road leads to wonderful places",
            ],
        ),
        author(
            "roald-dahl",
            "Roald Dahl",
            "Quirky characters, dark humor, and unexpected twists with heartwarming endings",
            [
                "In a world where chocolate rivers flow and giants are friendly",
                "Matilda's magic powers and Miss Honey's kindness",
                "The BFG who catches dreams and spreads them around",
            ],
        ),
        author(
            "beatrix-potter",
            "Beatrix Potter",
            "Gentle animal stories with detailed nature descriptions and cozy adventures",
            [
                "In the peaceful English countryside where rabbits wear waistcoats",
                "Peter Rabbit's garden adventures and family lessons",
                "The cozy burrow where love and kindness always win",
            ],
        ),
    ];

    pub static ref LOCATIONS: Vec<Location> = vec![
        location(
            "magical-forest",
            "Enchanted Forest",
            "A mystical woodland filled with talking trees, friendly animals, and hidden magical creatures",
        ),
        location(
            "candy-mountain",
            "Candy Mountain",
            "A sweet paradise where everything is made of candy, from chocolate rivers to lollipop trees",
        ),
        location(
            "underwater-city",
            "Underwater City",
            "A beautiful underwater kingdom with coral castles, friendly sea creatures, and pearl palaces",
        ),
        location(
            "cloud-castle",
            "Cloud Castle",
            "A floating castle in the sky where clouds are soft as pillows and rainbows are bridges",
        ),
        location(
            "dinosaur-valley",
            "Dinosaur Valley",
            "A prehistoric land where friendly dinosaurs roam and ancient secrets are waiting to be discovered",
        ),
    ];
}

/// Themes every story should lean toward. Listed for clients.
pub const POSITIVE_THEMES: &[&str] = &[
    "friendship and cooperation",
    "kindness and empathy",
    "courage and perseverance",
    "creativity and imagination",
    "learning and growth",
    "family and community",
    "respect for nature",
    "problem-solving",
    "self-acceptance",
    "helping others",
];

/// Topics stories stay away from. Listed for clients.
pub const SENSITIVE_TOPICS: &[&str] = &[
    "violence or conflict",
    "scary or frightening content",
    "sad or traumatic events",
    "dangerous situations",
    "inappropriate language",
    "stereotypes or bias",
    "commercial content",
    "political themes",
];

impl AgeBand {
    pub fn guidelines(&self) -> &'static AgeGuidelines {
        match self {
            AgeBand::Preschool => &AgeGuidelines {
                max_complexity: "simple",
                max_length: "very short",
                themes: &["basic emotions", "simple problem-solving", "family and friends"],
                avoid: &["conflict", "scary elements", "complex emotions"],
            },
            AgeBand::EarlyReader => &AgeGuidelines {
                max_complexity: "moderate",
                max_length: "short to medium",
                themes: &["friendship", "school", "adventure", "learning"],
                avoid: &["serious conflict", "frightening content", "adult themes"],
            },
            AgeBand::Preteen => &AgeGuidelines {
                max_complexity: "moderate to complex",
                max_length: "medium to long",
                themes: &["personal growth", "teamwork", "problem-solving", "adventure"],
                avoid: &["violence", "romance", "adult situations", "inappropriate content"],
            },
        }
    }

    /// Suggested story prompts for readers in this band.
    pub fn default_prompts(&self) -> &'static [&'static str] {
        match self {
            AgeBand::Preschool => &[
                "A little animal who learns to share",
                "A magical toy that comes to life",
                "A friendly monster who's not scary at all",
                "A lost pet who finds their way home",
                "A rainbow that grants wishes",
            ],
            AgeBand::EarlyReader => &[
                "A brave knight who saves the day with kindness",
                "A magical school where everyone learns something special",
                "A time-traveling adventure to meet historical heroes",
                "A detective who solves mysteries with friendship",
                "A space explorer who discovers new planets",
            ],
            AgeBand::Preteen => &[
                "A young wizard who learns that magic comes from within",
                "A group of friends who save their town from a misunderstanding",
                "A character who discovers they have a special power",
                "An adventure that teaches the importance of teamwork",
                "A story about overcoming fears and finding courage",
            ],
        }
    }
}

pub fn author_style_by_id(id: &str) -> Option<&'static AuthorStyle> {
    AUTHOR_STYLES.iter().find(|style| style.id == id)
}

pub fn location_by_id(id: &str) -> Option<&'static Location> {
    LOCATIONS.iter().find(|location| location.id == id)
}

/// Resolve both ids against the catalogs. Either miss rejects the pair.
pub fn resolve(
    author_style_id: &str,
    location_id: &str,
) -> Result<(&'static AuthorStyle, &'static Location), ReferenceNotFound> {
    match (author_style_by_id(author_style_id), location_by_id(location_id)) {
        (Some(style), Some(location)) => Ok((style, location)),
        _ => Err(ReferenceNotFound {
            author_style_id: author_style_id.to_string(),
            location_id: location_id.to_string(),
        }),
    }
}

/// A random suggested prompt for the band.
pub fn default_prompt_for(age: AgeBand) -> &'static str {
    age.default_prompts()
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(FALLBACK_PROMPT)
}

pub fn random_author_style() -> &'static AuthorStyle {
    AUTHOR_STYLES
        .choose(&mut rand::thread_rng())
        .unwrap_or(&AUTHOR_STYLES[0])
}

pub fn random_location() -> &'static Location {
    LOCATIONS
        .choose(&mut rand::thread_rng())
        .unwrap_or(&LOCATIONS[0])
}

/// Default selections offered to clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryDefaults {
    pub target_age: &'static str,
    pub author_style: &'static str,
    pub location: &'static str,
}

/// Everything a client needs to build a valid story request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoryOptions {
    pub author_styles: &'static [AuthorStyle],
    pub locations: &'static [Location],
    pub age_bands: Vec<&'static str>,
    pub age_guidelines: &'static AgeGuidelines,
    pub defaults: StoryDefaults,
    pub limits: &'static StoryLimits,
    pub positive_themes: &'static [&'static str],
    pub sensitive_topics: &'static [&'static str],
    pub suggested_prompt: &'static str,
}

/// Catalog listing, with guidelines and a suggested prompt for `age`.
pub fn story_options(age: AgeBand) -> StoryOptions {
    StoryOptions {
        author_styles: AUTHOR_STYLES.as_slice(),
        locations: LOCATIONS.as_slice(),
        age_bands: AgeBand::labels(),
        age_guidelines: age.guidelines(),
        defaults: StoryDefaults {
            target_age: STORY_LIMITS.default_target_age,
            author_style: STORY_LIMITS.default_author_style,
            location: STORY_LIMITS.default_location,
        },
        limits: &STORY_LIMITS,
        positive_themes: POSITIVE_THEMES,
        sensitive_topics: SENSITIVE_TOPICS,
        suggested_prompt: default_prompt_for(age),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_ids_are_unique() {
        let styles: HashSet<_> = AUTHOR_STYLES.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(styles.len(), AUTHOR_STYLES.len());
        let locations: HashSet<_> = LOCATIONS.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(locations.len(), LOCATIONS.len());
    }

    #[test]
    fn test_lookup_by_id() {
        assert_eq!(author_style_by_id("roald-dahl").unwrap().name, "Roald Dahl");
        assert_eq!(location_by_id("magical-forest").unwrap().name, "Enchanted Forest");
        assert!(author_style_by_id("tolkien").is_none());
        assert!(location_by_id("").is_none());
    }

    #[test]
    fn test_resolve_requires_both() {
        assert!(resolve("dr-seuss", "cloud-castle").is_ok());

        let err = resolve("dr-seuss", "mars").unwrap_err();
        assert_eq!(err.location_id, "mars");
        assert_eq!(err.to_string(), "Invalid author style or location");

        assert!(resolve("nobody", "cloud-castle").is_err());
    }

    #[test]
    fn test_defaults_exist_in_catalogs() {
        assert!(author_style_by_id(STORY_LIMITS.default_author_style).is_some());
        assert!(location_by_id(STORY_LIMITS.default_location).is_some());
        assert!(AgeBand::parse(STORY_LIMITS.default_target_age).is_some());
    }

    #[test]
    fn test_default_prompt_comes_from_band() {
        for band in AgeBand::ALL {
            let prompt = default_prompt_for(band);
            assert!(band.default_prompts().contains(&prompt));
        }
    }

    #[test]
    fn test_random_picks_are_catalog_entries() {
        assert!(AUTHOR_STYLES.contains(random_author_style()));
        assert!(LOCATIONS.contains(random_location()));
    }

    #[test]
    fn test_guidelines_per_band() {
        assert_eq!(AgeBand::Preschool.guidelines().max_complexity, "simple");
        assert!(AgeBand::Preteen.guidelines().avoid.contains(&"romance"));
        assert_eq!(AgeBand::EarlyReader.guidelines().themes.len(), 4);
    }

    #[test]
    fn test_story_options() {
        let options = story_options(AgeBand::EarlyReader);
        assert_eq!(options.author_styles.len(), 5);
        assert_eq!(options.age_bands, vec!["3-5", "6-8", "9-12"]);
        assert!(AgeBand::EarlyReader
            .default_prompts()
            .contains(&options.suggested_prompt));

        let wire = serde_json::to_value(&options).unwrap();
        assert_eq!(wire["authorStyles"][0]["examplePhrases"].as_array().unwrap().len(), 3);
        assert_eq!(wire["defaults"]["location"], "magical-forest");
        assert_eq!(wire["limits"]["maxChapters"], 10);
        assert_eq!(wire["limits"]["minChapterWords"], 100);
        assert_eq!(wire["limits"]["maxChapterWords"], 500);
        assert_eq!(wire["sensitiveTopics"].as_array().unwrap().len(), SENSITIVE_TOPICS.len());
        assert_eq!(wire["positiveThemes"][0], "friendship and cooperation");
    }
}
