//! Request schema validation.
//!
//! Bodies are checked against the request shape before anything else
//! happens. Every violation is collected, not just the first, and no
//! validation path makes an external call.

use crate::config::{CHAPTER_CONTENT_MAX_CHARS, CHAPTER_TITLE_MAX_CHARS, USER_PROMPT_MAX_CHARS};
use crate::schema::{AgeBand, AuthorStyle, ChapterText, ChoicesRequest, Location, StoryConfig};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// What is wrong with one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Problem {
    Missing,
    WrongType { expected: &'static str },
    TooShort { min: usize },
    TooLong { max: usize },
    NotAllowed { allowed: Vec<&'static str> },
    Malformed { message: String },
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Problem::Missing => write!(f, "is required"),
            Problem::WrongType { expected } => write!(f, "expected {expected}"),
            Problem::TooShort { min } => write!(f, "must contain at least {min} character(s)"),
            Problem::TooLong { max } => write!(f, "must contain at most {max} character(s)"),
            Problem::NotAllowed { allowed } => {
                write!(f, "must be one of {}", allowed.join(", "))
            }
            Problem::Malformed { message } => write!(f, "is not valid JSON ({message})"),
        }
    }
}

/// A problem at a path such as `authorStyle.examplePhrases[2]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Dotted path to the field; empty for the body itself.
    pub path: String,
    #[serde(flatten)]
    pub problem: Problem,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "body {}", self.problem)
        } else {
            write!(f, "{} {}", self.path, self.problem)
        }
    }
}

/// The request body does not match the expected shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid request")]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub fn single(path: impl Into<String>, problem: Problem) -> Self {
        Self {
            issues: vec![FieldIssue {
                path: path.into(),
                problem,
            }],
        }
    }

    /// All issues joined into one readable line.
    pub fn summary(&self) -> String {
        self.issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Whether any issue is reported at `path`.
    pub fn has_issue_at(&self, path: &str) -> bool {
        self.issues.iter().any(|issue| issue.path == path)
    }
}

/// Decode a raw request body.
pub fn parse_body(bytes: &[u8]) -> Result<Value, ValidationError> {
    serde_json::from_slice(bytes).map_err(|e| {
        ValidationError::single(
            "",
            Problem::Malformed {
                message: e.to_string(),
            },
        )
    })
}

/// Validate a `/api/story` body.
pub fn validate_story_config(value: &Value) -> Result<StoryConfig, ValidationError> {
    let mut checker = Checker::default();
    let config = checker.story_config(Some(value), "");
    checker.finish(config)
}

/// Validate a `/api/story/choices` body.
pub fn validate_choices_request(value: &Value) -> Result<ChoicesRequest, ValidationError> {
    let mut checker = Checker::default();
    let request = checker.object(Some(value), "").and_then(|body| {
        let config = checker.story_config(body.get("config"), "config");
        let chapter = checker.chapter(body.get("chapter"), "chapter");
        Some(ChoicesRequest {
            config: config?,
            chapter: chapter?,
        })
    });
    checker.finish(request)
}

/// Validate an age band label supplied outside a JSON body.
pub fn validate_age_band(label: &str, path: &str) -> Result<AgeBand, ValidationError> {
    AgeBand::parse(label).ok_or_else(|| {
        ValidationError::single(
            path,
            Problem::NotAllowed {
                allowed: AgeBand::labels(),
            },
        )
    })
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

#[derive(Default)]
struct Checker {
    issues: Vec<FieldIssue>,
}

impl Checker {
    fn report(&mut self, path: &str, problem: Problem) {
        self.issues.push(FieldIssue {
            path: path.to_string(),
            problem,
        });
    }

    fn finish<T>(self, value: Option<T>) -> Result<T, ValidationError> {
        match value {
            Some(value) if self.issues.is_empty() => Ok(value),
            _ => Err(ValidationError {
                issues: self.issues,
            }),
        }
    }

    fn object<'v>(&mut self, value: Option<&'v Value>, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            None => {
                self.report(path, Problem::Missing);
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.report(path, Problem::WrongType { expected: "object" });
                None
            }
        }
    }

    fn string(&mut self, value: Option<&Value>, path: &str) -> Option<String> {
        match value {
            None => {
                self.report(path, Problem::Missing);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.report(path, Problem::WrongType { expected: "string" });
                None
            }
        }
    }

    fn bounded_string(
        &mut self,
        value: Option<&Value>,
        path: &str,
        min: usize,
        max: usize,
    ) -> Option<String> {
        let s = self.string(value, path)?;
        let len = s.chars().count();
        if len < min {
            self.report(path, Problem::TooShort { min });
            return None;
        }
        if len > max {
            self.report(path, Problem::TooLong { max });
            return None;
        }
        Some(s)
    }

    fn string_array(&mut self, value: Option<&Value>, path: &str) -> Option<Vec<String>> {
        let items = match value {
            None => {
                self.report(path, Problem::Missing);
                return None;
            }
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.report(path, Problem::WrongType { expected: "array" });
                return None;
            }
        };

        let mut strings = Vec::with_capacity(items.len());
        let mut ok = true;
        for (i, item) in items.iter().enumerate() {
            match self.string(Some(item), &format!("{path}[{i}]")) {
                Some(s) => strings.push(s),
                None => ok = false,
            }
        }
        ok.then_some(strings)
    }

    fn age_band(&mut self, value: Option<&Value>, path: &str) -> Option<AgeBand> {
        let label = self.string(value, path)?;
        match AgeBand::parse(&label) {
            Some(band) => Some(band),
            None => {
                self.report(
                    path,
                    Problem::NotAllowed {
                        allowed: AgeBand::labels(),
                    },
                );
                None
            }
        }
    }

    fn author_style(&mut self, value: Option<&Value>, path: &str) -> Option<AuthorStyle> {
        let obj = self.object(value, path)?;
        let id = self.string(obj.get("id"), &join(path, "id"));
        let name = self.string(obj.get("name"), &join(path, "name"));
        let description = self.string(obj.get("description"), &join(path, "description"));
        let example_phrases = self.string_array(obj.get("examplePhrases"), &join(path, "examplePhrases"));
        Some(AuthorStyle {
            id: id?,
            name: name?,
            description: description?,
            example_phrases: example_phrases?,
        })
    }

    fn location(&mut self, value: Option<&Value>, path: &str) -> Option<Location> {
        let obj = self.object(value, path)?;
        let id = self.string(obj.get("id"), &join(path, "id"));
        let name = self.string(obj.get("name"), &join(path, "name"));
        let description = self.string(obj.get("description"), &join(path, "description"));
        Some(Location {
            id: id?,
            name: name?,
            description: description?,
        })
    }

    fn story_config(&mut self, value: Option<&Value>, path: &str) -> Option<StoryConfig> {
        let obj = self.object(value, path)?;
        let author_style = self.author_style(obj.get("authorStyle"), &join(path, "authorStyle"));
        let location = self.location(obj.get("location"), &join(path, "location"));
        let user_prompt = self.bounded_string(
            obj.get("userPrompt"),
            &join(path, "userPrompt"),
            1,
            USER_PROMPT_MAX_CHARS,
        );
        let target_age = self.age_band(obj.get("targetAge"), &join(path, "targetAge"));
        Some(StoryConfig {
            author_style: author_style?,
            location: location?,
            user_prompt: user_prompt?,
            target_age: target_age?,
        })
    }

    fn chapter(&mut self, value: Option<&Value>, path: &str) -> Option<ChapterText> {
        let obj = self.object(value, path)?;
        let title = self.bounded_string(
            obj.get("title"),
            &join(path, "title"),
            1,
            CHAPTER_TITLE_MAX_CHARS,
        );
        let content = self.bounded_string(
            obj.get("content"),
            &join(path, "content"),
            1,
            CHAPTER_CONTENT_MAX_CHARS,
        );
        Some(ChapterText {
            title: title?,
            content: content?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_body() -> Value {
        json!({
            "authorStyle": {
                "id": "dr-seuss",
                "name": "Dr. Seuss",
                "description": "Whimsical rhymes",
                "examplePhrases": ["Oh, the places you'll go"]
            },
            "location": {
                "id": "magical-forest",
                "name": "Enchanted Forest",
                "description": "Talking trees"
            },
            "userPrompt": "a bunny who learns to share",
            "targetAge": "3-5"
        })
    }

    #[test]
    fn test_valid_body() {
        let config = validate_story_config(&valid_body()).unwrap();
        assert_eq!(config.author_style.id, "dr-seuss");
        assert_eq!(config.location.id, "magical-forest");
        assert_eq!(config.target_age, AgeBand::Preschool);
    }

    #[test]
    fn test_unknown_keys_are_ignored() {
        let mut body = valid_body();
        body["minChapters"] = json!(5);
        assert!(validate_story_config(&body).is_ok());
    }

    #[test]
    fn test_non_object_body() {
        let err = validate_story_config(&json!([1, 2, 3])).unwrap_err();
        assert_eq!(err.issues.len(), 1);
        assert_eq!(err.issues[0].problem, Problem::WrongType { expected: "object" });
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let mut body = valid_body();
        let obj = body.as_object_mut().unwrap();
        obj.remove("userPrompt");
        obj.remove("targetAge");
        obj["location"].as_object_mut().unwrap().remove("name");

        let err = validate_story_config(&body).unwrap_err();
        assert!(err.has_issue_at("userPrompt"));
        assert!(err.has_issue_at("targetAge"));
        assert!(err.has_issue_at("location.name"));
        assert_eq!(err.issues.len(), 3);
        assert!(err.issues.iter().all(|i| i.problem == Problem::Missing));
    }

    #[test]
    fn test_wrong_types() {
        let mut body = valid_body();
        body["userPrompt"] = json!(42);
        body["authorStyle"]["examplePhrases"] = json!(["ok", false]);

        let err = validate_story_config(&body).unwrap_err();
        assert!(err.has_issue_at("userPrompt"));
        assert!(err.has_issue_at("authorStyle.examplePhrases[1]"));
        assert!(!err.has_issue_at("authorStyle.examplePhrases[0]"));
    }

    #[test]
    fn test_prompt_length_bounds() {
        let mut body = valid_body();
        body["userPrompt"] = json!("");
        let err = validate_story_config(&body).unwrap_err();
        assert_eq!(err.issues[0].problem, Problem::TooShort { min: 1 });

        body["userPrompt"] = json!("a".repeat(1001));
        let err = validate_story_config(&body).unwrap_err();
        assert_eq!(err.issues[0].problem, Problem::TooLong { max: 1000 });

        body["userPrompt"] = json!("a".repeat(1000));
        assert!(validate_story_config(&body).is_ok());
    }

    #[test]
    fn test_prompt_length_counts_characters() {
        let mut body = valid_body();
        body["userPrompt"] = json!("é".repeat(1000));
        assert!(validate_story_config(&body).is_ok());
    }

    #[test]
    fn test_unknown_age_band() {
        let mut body = valid_body();
        body["targetAge"] = json!("13-17");
        let err = validate_story_config(&body).unwrap_err();
        assert_eq!(
            err.issues[0].problem,
            Problem::NotAllowed {
                allowed: vec!["3-5", "6-8", "9-12"]
            }
        );
        assert_eq!(err.summary(), "targetAge must be one of 3-5, 6-8, 9-12");
    }

    #[test]
    fn test_parse_body_rejects_garbage() {
        let err = parse_body(b"{not json").unwrap_err();
        assert!(matches!(err.issues[0].problem, Problem::Malformed { .. }));
        assert!(parse_body(b"{}").is_ok());
    }

    #[test]
    fn test_choices_request() {
        let body = json!({
            "config": valid_body(),
            "chapter": {"title": "The Carrot Patch", "content": "Bunny found a carrot."}
        });
        let request = validate_choices_request(&body).unwrap();
        assert_eq!(request.chapter.title, "The Carrot Patch");

        let body = json!({"config": valid_body(), "chapter": {"title": ""}});
        let err = validate_choices_request(&body).unwrap_err();
        assert!(err.has_issue_at("chapter.title"));
        assert!(err.has_issue_at("chapter.content"));

        let mut config = valid_body();
        config["targetAge"] = json!("adult");
        let err = validate_choices_request(&json!({"config": config})).unwrap_err();
        assert!(err.has_issue_at("config.targetAge"));
        assert!(err.has_issue_at("chapter"));
    }

    #[test]
    fn test_issue_serialization() {
        let issue = FieldIssue {
            path: "userPrompt".into(),
            problem: Problem::TooLong { max: 1000 },
        };
        assert_eq!(
            serde_json::to_value(&issue).unwrap(),
            json!({"path": "userPrompt", "kind": "too_long", "max": 1000})
        );
    }
}
