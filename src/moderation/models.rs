// Data model for one moderation request.
//
// Everything here is request-scoped and immutable once built. The only
// static data is the category → reference link table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ModerationError;
use super::schema::{FieldKind, FieldSpec, SchemaDescriptor, StructuredOutput};

/// Forum section a post is submitted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[serde(rename = "A-Level")]
    ALevel,
    #[serde(rename = "GCSE")]
    Gcse,
    #[serde(rename = "Study Support")]
    StudySupport,
    #[serde(rename = "Job Experience")]
    JobExperience,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::ALevel,
        Category::Gcse,
        Category::StudySupport,
        Category::JobExperience,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Category::ALevel => "A-Level",
            Category::Gcse => "GCSE",
            Category::StudySupport => "Study Support",
            Category::JobExperience => "Job Experience",
        }
    }

    /// Forum listing where users can browse popular posts in this category.
    pub fn reference_link(self) -> &'static str {
        match self {
            Category::ALevel => "https://www.thestudentroom.co.uk/forumdisplay.php?f=80",
            Category::Gcse => "https://www.thestudentroom.co.uk/forumdisplay.php?f=85",
            Category::StudySupport => "https://www.thestudentroom.co.uk/forumdisplay.php?f=635",
            Category::JobExperience => "https://www.thestudentroom.co.uk/forumdisplay.php?f=201",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = ModerationError;

    /// Case-insensitive; "A Level" (the front end's spelling) is accepted too.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', " ");
        match normalized.as_str() {
            "a level" => Ok(Category::ALevel),
            "gcse" => Ok(Category::Gcse),
            "study support" => Ok(Category::StudySupport),
            "job experience" => Ok(Category::JobExperience),
            _ => Err(ModerationError::Validation {
                field: "category",
                message: format!("Unknown category: {}", s.trim()),
            }),
        }
    }
}

/// Raw post as submitted. Any field may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostSubmission {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

/// A validated post: all fields present, category known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationRequest {
    pub content: String,
    pub title: String,
    pub category: Category,
}

impl ModerationRequest {
    /// Validate a submission. Fields are checked in the order
    /// content, title, category; the first problem wins.
    pub fn validate(submission: &PostSubmission) -> Result<Self, ModerationError> {
        let content = required(submission.content.as_deref(), "content")?;
        let title = required(submission.title.as_deref(), "title")?;
        let category: Category = required(submission.category.as_deref(), "category")?.parse()?;

        Ok(Self {
            content: content.to_string(),
            title: title.to_string(),
            category,
        })
    }
}

fn required<'a>(value: Option<&'a str>, field: &'static str) -> Result<&'a str, ModerationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ModerationError::missing(field)),
    }
}

/// Content-safety verdict produced by structured extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyAnalysis {
    pub ridiculous: bool,
    pub leaks_pii: bool,
    pub relevant_to_category: bool,
}

impl SafetyAnalysis {
    /// Human-readable problems, empty when the post looks fine.
    pub fn issues(&self) -> Vec<&'static str> {
        let mut issues = Vec::new();
        if self.ridiculous {
            issues.push("Ridiculous content");
        }
        if self.leaks_pii {
            issues.push("Contains PII (personal information)");
        }
        if !self.relevant_to_category {
            issues.push("Not relevant to the selected category");
        }
        issues
    }
}

impl fmt::Display for SafetyAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ridiculous={} leaks_pii={} relevant_to_category={}",
            self.ridiculous, self.leaks_pii, self.relevant_to_category
        )
    }
}

impl StructuredOutput for SafetyAnalysis {
    fn schema() -> SchemaDescriptor {
        SchemaDescriptor {
            name: "PostContent",
            description: "Validate response and provide feedback",
            fields: vec![
                FieldSpec {
                    name: "ridiculous",
                    kind: FieldKind::Boolean,
                    description: "Is the post utterly ridiculous/completely inappropriate?",
                },
                FieldSpec {
                    name: "leaks_pii",
                    kind: FieldKind::Boolean,
                    description:
                        "Does the post expose any sensitive Personally Identifiable Information?",
                },
                FieldSpec {
                    name: "relevant_to_category",
                    kind: FieldKind::Boolean,
                    description: "Is the content even remotely related to post category? \
                                  Be fairly lenient with this.",
                },
            ],
        }
    }
}

/// Which race branch produced the feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackSource {
    /// The preferred backend, started without delay.
    Primary,
    /// The delayed backend.
    Secondary,
    /// Neither backend answered in time.
    Fallback,
}

impl fmt::Display for FeedbackSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FeedbackSource::Primary => "primary",
            FeedbackSource::Secondary => "secondary",
            FeedbackSource::Fallback => "fallback",
        };
        f.write_str(s)
    }
}

/// Engagement feedback text and where it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackResult {
    pub text: String,
    pub source: FeedbackSource,
}

/// Suggested rewrite of the post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSuggestion {
    #[serde(rename = "new_post_title")]
    pub new_title: String,
    #[serde(rename = "new_post_content")]
    pub new_content: String,
}

impl PostSuggestion {
    /// Sentinel returned when suggestion generation failed.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.new_title.is_empty() && self.new_content.is_empty()
    }
}

impl StructuredOutput for PostSuggestion {
    fn schema() -> SchemaDescriptor {
        SchemaDescriptor {
            name: "Suggestion",
            description: "Suggest a new post title and post content",
            fields: vec![
                FieldSpec {
                    name: "new_post_title",
                    kind: FieldKind::String,
                    description: "Suggest a new post title",
                },
                FieldSpec {
                    name: "new_post_content",
                    kind: FieldKind::String,
                    description: "Craft the new post content",
                },
            ],
        }
    }
}

/// Everything the caller gets back for a successful moderation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModerationResult {
    pub feedback: FeedbackResult,
    pub analysis: SafetyAnalysis,
    pub suggestion: PostSuggestion,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(content: &str, title: &str, category: &str) -> PostSubmission {
        PostSubmission {
            content: Some(content.into()),
            title: Some(title.into()),
            category: Some(category.into()),
        }
    }

    #[test]
    fn category_accepts_both_a_level_spellings() {
        assert_eq!("A-Level".parse::<Category>().unwrap(), Category::ALevel);
        assert_eq!("A Level".parse::<Category>().unwrap(), Category::ALevel);
        assert_eq!("gcse".parse::<Category>().unwrap(), Category::Gcse);
        assert_eq!(
            " Job Experience ".parse::<Category>().unwrap(),
            Category::JobExperience
        );
    }

    #[test]
    fn every_category_has_a_distinct_link() {
        let links: std::collections::HashSet<_> =
            Category::ALL.iter().map(|c| c.reference_link()).collect();
        assert_eq!(links.len(), Category::ALL.len());
    }

    #[test]
    fn label_round_trips_through_parse() {
        for category in Category::ALL {
            assert_eq!(category.label().parse::<Category>().unwrap(), category);
        }
    }

    #[test]
    fn unknown_category_is_a_validation_error() {
        let err = ModerationRequest::validate(&submission("body", "title", "Memes")).unwrap_err();
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.public_message(), "Unknown category: Memes");
    }

    #[test]
    fn validation_checks_content_first() {
        let err = ModerationRequest::validate(&PostSubmission::default()).unwrap_err();
        assert!(matches!(
            err,
            ModerationError::Validation {
                field: "content",
                ..
            }
        ));
    }

    #[test]
    fn whitespace_only_title_is_missing() {
        let err = ModerationRequest::validate(&submission("body", "   ", "GCSE")).unwrap_err();
        assert_eq!(err.public_message(), "Title not found");
    }

    #[test]
    fn issues_lists_each_problem() {
        let analysis = SafetyAnalysis {
            ridiculous: true,
            leaks_pii: true,
            relevant_to_category: false,
        };
        assert_eq!(analysis.issues().len(), 3);

        let clean = SafetyAnalysis {
            ridiculous: false,
            leaks_pii: false,
            relevant_to_category: true,
        };
        assert!(clean.issues().is_empty());
    }

    #[test]
    fn suggestion_serializes_with_wire_names() {
        let json = serde_json::to_value(PostSuggestion::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"new_post_title": "", "new_post_content": ""})
        );
    }
}
