//! Collaborator contracts for dialogue content generation.
//!
//! The moderation engine never produces conversational content itself. Card
//! recommendations, parent guides, example messages, dialogue inspection and
//! translation are all delegated through the traits in this module, so the
//! engine can be wired against an AI-powered backend, a static table, or a
//! deterministic test double without changing any session logic.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    CardInfo, ChildCardRecommendationResult, DialogueInspectionCategory, DialogueMessage, Dyad,
    ParentExampleMessage, ParentGuideElement, ParentGuideRecommendationResult, ParentType,
    UserLocale,
};
use crate::topic::SessionTopicInfo;

/// Findings from reviewing the recent dialogue before guiding the parent.
///
/// An inspection may flag several categories at once. `feedback` carries the
/// reviewer's note to the parent and is only present when the inspector found
/// something worth surfacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DialogueInspectionResult {
    pub categories: Vec<DialogueInspectionCategory>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

/// Context handed to a [`ChildCardRecommender`] for one generation call.
#[derive(Debug, Clone)]
pub struct ChildCardRequest {
    /// Turn the recommendation will belong to.
    pub turn_id: Uuid,
    pub locale: UserLocale,
    pub parent_type: ParentType,
    pub topic: SessionTopicInfo,
    /// Full dialogue so far, oldest first.
    pub dialogue: Vec<DialogueMessage>,
    /// Cards the child has already picked in the current turn, if any.
    pub interim_cards: Option<Vec<CardInfo>>,
    /// The recommendation being refreshed, when this is a regeneration.
    pub previous_recommendation: Option<ChildCardRecommendationResult>,
}

/// Context handed to a [`ParentGuideRecommender`] for one generation call.
#[derive(Debug, Clone)]
pub struct ParentGuideRequest {
    /// Turn the guides will belong to.
    pub turn_id: Uuid,
    pub dyad: Dyad,
    pub topic: SessionTopicInfo,
    /// Full dialogue so far, oldest first.
    pub dialogue: Vec<DialogueMessage>,
    /// Inspection findings for the latest parent message, when available.
    pub inspection: Option<DialogueInspectionResult>,
}

/// Defines the contract for any service that can recommend cards to the child.
///
/// This abstraction allows the engine to swap between different recommendation
/// approaches (e.g. AI-powered, static mock) while keeping the turn-taking
/// logic identical.
#[async_trait]
pub trait ChildCardRecommender: Send + Sync {
    /// Produces a fresh set of cards for the child's current turn.
    ///
    /// # Arguments
    ///
    /// * `request` - Dialogue context, interim selection and the previous
    ///   recommendation when one is being refreshed.
    ///
    /// # Returns
    ///
    /// A `Result` containing the new recommendation or an error.
    async fn generate(&self, request: ChildCardRequest) -> Result<ChildCardRecommendationResult>;
}

/// Defines the contract for any service that can recommend guides to the parent.
#[async_trait]
pub trait ParentGuideRecommender: Send + Sync {
    /// Produces messaging guides (and a feedback guide when inspection
    /// findings are present) for the parent's current turn.
    async fn generate(&self, request: ParentGuideRequest) -> Result<ParentGuideRecommendationResult>;
}

/// Expands a single messaging guide into a concrete utterance the parent
/// could say next.
#[async_trait]
pub trait ParentExampleGenerator: Send + Sync {
    /// Writes one example message for `guide`.
    ///
    /// # Arguments
    ///
    /// * `locale` - Locale the localized rendition should target.
    /// * `dialogue` - Full dialogue so far, oldest first.
    /// * `guide` - The messaging guide being expanded.
    /// * `recommendation_id` - Id of the guide recommendation that owns
    ///   `guide`, stamped into the returned message.
    async fn generate(
        &self,
        locale: UserLocale,
        dialogue: &[DialogueMessage],
        guide: &ParentGuideElement,
        recommendation_id: Uuid,
    ) -> Result<ParentExampleMessage>;
}

/// Reviews recent dialogue for anything the parent should hear about before
/// their next message.
///
/// Inspection runs in the background while the child composes a reply, so
/// every call carries a tag that the implementation must echo back. The
/// engine compares the echoed tag against the one it expects and discards
/// results that arrive from a superseded call.
#[async_trait]
pub trait DialogueInspector: Send + Sync {
    /// Inspects the dialogue, returning findings (or `None` when the
    /// exchange looks fine) together with the echoed `task_id`.
    async fn inspect(
        &self,
        dialogue: &[DialogueMessage],
        task_id: Uuid,
    ) -> Result<(Option<DialogueInspectionResult>, Uuid)>;
}

/// Canonicalizes parent input: `text` written in `locale` comes back in the
/// canonical locale.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, locale: UserLocale) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DialogueInspectionCategory;

    #[test]
    fn test_inspection_result_omits_absent_feedback() {
        let result = DialogueInspectionResult {
            categories: vec![DialogueInspectionCategory::Blame],
            feedback: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["categories"][0], "blame");
        assert!(json.get("feedback").is_none());
    }

    #[test]
    fn test_inspection_result_roundtrip_with_feedback() {
        let result = DialogueInspectionResult {
            categories: vec![
                DialogueInspectionCategory::Correction,
                DialogueInspectionCategory::Deviation,
            ],
            feedback: Some("Try acknowledging the answer first.".to_string()),
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: DialogueInspectionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}
