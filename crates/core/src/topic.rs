use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad conversation frames a session can be anchored to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TopicCategory {
    /// Things the family is going to do.
    Plan,
    /// Things that already happened.
    Recall,
    /// Whatever the pair wants to talk about.
    Free,
}

impl fmt::Display for TopicCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TopicCategory::Plan => write!(f, "plan"),
            TopicCategory::Recall => write!(f, "recall"),
            TopicCategory::Free => write!(f, "free"),
        }
    }
}

/// What a session is about: a category plus an optional free-form subtopic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionTopicInfo {
    pub category: TopicCategory,
    pub subtopic: Option<String>,
    pub subtopic_description: Option<String>,
}

impl SessionTopicInfo {
    pub fn new(category: TopicCategory) -> Self {
        Self {
            category,
            subtopic: None,
            subtopic_description: None,
        }
    }

    pub fn with_subtopic(
        category: TopicCategory,
        subtopic: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        Self {
            category,
            subtopic: Some(subtopic.into()),
            subtopic_description: description,
        }
    }

    /// The subtopic if one was set, otherwise a generic phrase for the
    /// category. Used for template substitution.
    pub fn subject(&self) -> &str {
        match &self.subtopic {
            Some(subtopic) => subtopic,
            None => match self.category {
                TopicCategory::Plan => "plans for today or tomorrow",
                TopicCategory::Recall => "things that happened lately",
                TopicCategory::Free => "whatever you both like",
            },
        }
    }

    /// One-line rendering used when conditioning generators on the topic.
    pub fn readable_description(&self) -> String {
        let frame = match self.category {
            TopicCategory::Plan => "making plans",
            TopicCategory::Recall => "recalling past events",
            TopicCategory::Free => "free conversation",
        };
        match &self.subtopic {
            Some(subtopic) => format!("{frame} about {subtopic}"),
            None => frame.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_wire_strings() {
        assert_eq!(
            serde_json::to_string(&TopicCategory::Plan).unwrap(),
            "\"plan\""
        );
        let category: TopicCategory = serde_json::from_str("\"free\"").unwrap();
        assert_eq!(category, TopicCategory::Free);
        assert_eq!(format!("{}", TopicCategory::Recall), "recall");
    }

    #[test]
    fn test_readable_description() {
        let bare = SessionTopicInfo::new(TopicCategory::Recall);
        assert_eq!(bare.readable_description(), "recalling past events");

        let detailed = SessionTopicInfo::with_subtopic(TopicCategory::Plan, "the zoo trip", None);
        assert_eq!(
            detailed.readable_description(),
            "making plans about the zoo trip"
        );
    }

    #[test]
    fn test_subject_falls_back_per_category() {
        let with_subtopic = SessionTopicInfo::with_subtopic(TopicCategory::Free, "dinosaurs", None);
        assert_eq!(with_subtopic.subject(), "dinosaurs");

        let bare = SessionTopicInfo::new(TopicCategory::Plan);
        assert_eq!(bare.subject(), "plans for today or tomorrow");
    }
}
