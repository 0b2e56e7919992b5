//! Session domain entities.
//!
//! Everything the moderation engine persists is defined here: the dyad and
//! session records, dialogue turns and messages, card and guide
//! recommendations, the child's interim card selections, and the append-only
//! interaction log. Recommendation-like entities are write-once; corrections
//! are always new entities on the same turn.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Initial,
    Started,
    Conversation,
    Terminated,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DialogueRole {
    Parent,
    Child,
}

impl DialogueRole {
    /// The role that speaks next.
    pub fn opposite(&self) -> Self {
        match self {
            DialogueRole::Parent => DialogueRole::Child,
            DialogueRole::Child => DialogueRole::Parent,
        }
    }
}

impl fmt::Display for DialogueRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DialogueRole::Parent => write!(f, "parent"),
            DialogueRole::Child => write!(f, "child"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CardCategory {
    Topic,
    Emotion,
    Action,
    Core,
}

impl fmt::Display for CardCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CardCategory::Topic => write!(f, "topic"),
            CardCategory::Emotion => write!(f, "emotion"),
            CardCategory::Action => write!(f, "action"),
            CardCategory::Core => write!(f, "core"),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParentType {
    Mother,
    Father,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChildGender {
    Boy,
    Girl,
}

/// Locales the family can run a session in. English is the canonical form
/// for stored parent text; other locales are translated on submission.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserLocale {
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh")]
    SimplifiedChinese,
    #[serde(rename = "yue")]
    Cantonese,
    #[serde(rename = "ko")]
    Korean,
}

impl UserLocale {
    pub fn is_canonical(&self) -> bool {
        matches!(self, UserLocale::English)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParentGuideType {
    Messaging,
    Feedback,
}

/// Conversational moves a messaging guide can coach the parent on.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParentGuideCategory {
    Intention,
    Specification,
    Choice,
    Clues,
    Coping,
    Stimulate,
    Share,
    Empathize,
    Encourage,
    Emotion,
    Extend,
    Terminate,
}

/// Issues a dialogue inspection can flag in the parent's last message.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DialogueInspectionCategory {
    Blame,
    Correction,
    Complex,
    Deviation,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum InteractionType {
    SubmitParentMessage,
    RequestParentExampleMessage,
    RefreshChildCards,
    AppendChildCard,
    RemoveLastChildCard,
    ConfirmChildCardSelection,
}

/// The parent+child pair that owns every session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Dyad {
    pub id: Uuid,
    pub child_name: String,
    pub parent_type: ParentType,
    pub child_gender: ChildGender,
    pub locale: UserLocale,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionInfo {
    pub id: Uuid,
    pub dyad_id: Uuid,
    pub topic: crate::topic::SessionTopicInfo,
    pub status: SessionStatus,
    pub local_timezone: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
}

impl SessionInfo {
    pub fn new(dyad_id: Uuid, topic: crate::topic::SessionTopicInfo, local_timezone: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            dyad_id,
            topic,
            status: SessionStatus::Initial,
            local_timezone,
            started_at: Utc::now(),
            ended_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueTurn {
    pub id: Uuid,
    pub session_id: Uuid,
    pub role: DialogueRole,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub audio_filename: Option<String>,
}

impl DialogueTurn {
    /// Opens a new turn for `role`, starting now.
    pub fn open(session_id: Uuid, role: DialogueRole) -> Self {
        Self {
            id: Uuid::new_v4(),
            session_id,
            role,
            started_at: Utc::now(),
            ended_at: None,
            audio_filename: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// What a dialogue message carries: parent turns hold free text, child turns
/// hold the confirmed card selection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Cards(Vec<CardInfo>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DialogueMessage {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub role: DialogueRole,
    pub content: MessageContent,
    /// The message as the family typed or reads it, when that differs from
    /// the stored canonical form.
    pub content_localized: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl DialogueMessage {
    /// A parent message holding the canonical text plus the original input.
    pub fn parent_text(turn_id: Uuid, canonical: String, localized: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            turn_id,
            role: DialogueRole::Parent,
            content: MessageContent::Text(canonical),
            content_localized: Some(localized),
            created_at: Utc::now(),
        }
    }

    /// A child message carrying the confirmed card selection.
    pub fn child_cards(turn_id: Uuid, cards: Vec<CardInfo>) -> Self {
        Self {
            id: Uuid::new_v4(),
            turn_id,
            role: DialogueRole::Child,
            content: MessageContent::Cards(cards),
            content_localized: None,
            created_at: Utc::now(),
        }
    }
}

/// A reference to one card inside the recommendation that proposed it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CardIdentity {
    pub id: Uuid,
    pub recommendation_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardInfo {
    pub id: Uuid,
    /// Stamped when the card joins a recommendation.
    pub recommendation_id: Uuid,
    pub label: String,
    pub label_localized: Option<String>,
    pub category: CardCategory,
}

impl CardInfo {
    pub fn new(label: impl Into<String>, category: CardCategory) -> Self {
        Self {
            id: Uuid::new_v4(),
            recommendation_id: Uuid::nil(),
            label: label.into(),
            label_localized: None,
            category,
        }
    }

    pub fn with_localized(mut self, label: impl Into<String>) -> Self {
        self.label_localized = Some(label.into());
        self
    }

    pub fn identity(&self) -> CardIdentity {
        CardIdentity {
            id: self.id,
            recommendation_id: self.recommendation_id,
        }
    }
}

impl fmt::Display for CardInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label, self.category)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChildCardRecommendationResult {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub cards: Vec<CardInfo>,
    pub created_at: DateTime<Utc>,
}

impl ChildCardRecommendationResult {
    /// Builds a recommendation and stamps each card with its id.
    pub fn new(turn_id: Uuid, cards: Vec<CardInfo>) -> Self {
        let id = Uuid::new_v4();
        let cards = cards
            .into_iter()
            .map(|mut card| {
                card.recommendation_id = id;
                card
            })
            .collect();
        Self {
            id,
            turn_id,
            cards,
            created_at: Utc::now(),
        }
    }

    /// The same card set reissued under a fresh recommendation id.
    pub fn with_fresh_id(&self) -> Self {
        Self::new(self.turn_id, self.cards.clone())
    }

    pub fn find_card(&self, card_id: Uuid) -> Option<&CardInfo> {
        self.cards.iter().find(|card| card.id == card_id)
    }
}

/// The child's in-progress pick of cards. Immutable: appending or popping
/// produces a new selection, and the old one stays retrievable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InterimCardSelection {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub cards: Vec<CardIdentity>,
    pub created_at: DateTime<Utc>,
}

impl InterimCardSelection {
    pub fn new(turn_id: Uuid, cards: Vec<CardIdentity>) -> Self {
        Self {
            id: Uuid::new_v4(),
            turn_id,
            cards,
            created_at: Utc::now(),
        }
    }

    /// A new selection with `identity` appended.
    pub fn with_appended(&self, identity: CardIdentity) -> Self {
        let mut cards = self.cards.clone();
        cards.push(identity);
        Self::new(self.turn_id, cards)
    }

    /// A new selection without the most recent card, plus the removed
    /// identity. `None` when there is nothing to remove.
    pub fn without_last(&self) -> Option<(Self, CardIdentity)> {
        let (last, rest) = self.cards.split_last()?;
        Some((Self::new(self.turn_id, rest.to_vec()), *last))
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

/// The category a guide element is tagged with: messaging guides carry one
/// conversational move, feedback guides carry the inspection findings they
/// respond to.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum GuideCategory {
    Messaging(ParentGuideCategory),
    Feedback(Vec<DialogueInspectionCategory>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParentGuideElement {
    pub id: Uuid,
    pub category: GuideCategory,
    pub guide: String,
    pub guide_localized: Option<String>,
    pub guide_type: ParentGuideType,
    /// Set when the guide came from the static template table.
    pub static_key: Option<String>,
}

impl ParentGuideElement {
    pub fn messaging(category: ParentGuideCategory, guide: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: GuideCategory::Messaging(category),
            guide: guide.into(),
            guide_localized: None,
            guide_type: ParentGuideType::Messaging,
            static_key: None,
        }
    }

    pub fn feedback(
        categories: Vec<DialogueInspectionCategory>,
        guide: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            category: GuideCategory::Feedback(categories),
            guide: guide.into(),
            guide_localized: None,
            guide_type: ParentGuideType::Feedback,
            static_key: None,
        }
    }

    pub fn with_localized(mut self, guide: impl Into<String>) -> Self {
        self.guide_localized = Some(guide.into());
        self
    }

    pub fn with_static_key(mut self, key: impl Into<String>) -> Self {
        self.static_key = Some(key.into());
        self
    }

    pub fn is_generated(&self) -> bool {
        self.static_key.is_none()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParentGuideRecommendationResult {
    pub id: Uuid,
    pub turn_id: Uuid,
    pub guides: Vec<ParentGuideElement>,
    pub created_at: DateTime<Utc>,
}

impl ParentGuideRecommendationResult {
    pub fn new(turn_id: Uuid, guides: Vec<ParentGuideElement>) -> Self {
        Self {
            id: Uuid::new_v4(),
            turn_id,
            guides,
            created_at: Utc::now(),
        }
    }

    pub fn messaging_guides(&self) -> impl Iterator<Item = &ParentGuideElement> {
        self.guides
            .iter()
            .filter(|guide| guide.guide_type == ParentGuideType::Messaging)
    }

    pub fn find_guide(&self, guide_id: Uuid) -> Option<&ParentGuideElement> {
        self.guides.iter().find(|guide| guide.id == guide_id)
    }
}

/// An example utterance written for one messaging guide of one
/// recommendation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParentExampleMessage {
    pub id: Uuid,
    pub recommendation_id: Uuid,
    pub guide_id: Uuid,
    pub message: String,
    pub message_localized: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl ParentExampleMessage {
    pub fn new(recommendation_id: Uuid, guide_id: Uuid, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recommendation_id,
            guide_id,
            message: message.into(),
            message_localized: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_localized(mut self, message: impl Into<String>) -> Self {
        self.message_localized = Some(message.into());
        self
    }
}

/// Append-only audit record of what the family did.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: InteractionType,
    pub turn_id: Uuid,
    pub metadata: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn new(kind: InteractionType, turn_id: Uuid, metadata: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            turn_id,
            metadata,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::{SessionTopicInfo, TopicCategory};

    #[test]
    fn test_status_and_role_wire_strings() {
        assert_eq!(
            serde_json::to_string(&SessionStatus::Conversation).unwrap(),
            "\"conversation\""
        );
        assert_eq!(
            serde_json::to_string(&DialogueRole::Parent).unwrap(),
            "\"parent\""
        );
        assert_eq!(
            serde_json::to_string(&CardCategory::Core).unwrap(),
            "\"core\""
        );
        assert_eq!(
            serde_json::to_string(&UserLocale::Cantonese).unwrap(),
            "\"yue\""
        );
        assert_eq!(
            serde_json::to_string(&InteractionType::RemoveLastChildCard).unwrap(),
            "\"remove_last_child_card\""
        );

        let status: SessionStatus = serde_json::from_str("\"initial\"").unwrap();
        assert_eq!(status, SessionStatus::Initial);
        let locale: UserLocale = serde_json::from_str("\"en\"").unwrap();
        assert_eq!(locale, UserLocale::English);
    }

    #[test]
    fn test_invalid_enum_deserialization() {
        let result: Result<DialogueRole, _> = serde_json::from_str("\"narrator\"");
        assert!(result.is_err());

        let result: Result<SessionStatus, _> = serde_json::from_str("\"paused\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_role_opposite() {
        assert_eq!(DialogueRole::Parent.opposite(), DialogueRole::Child);
        assert_eq!(DialogueRole::Child.opposite(), DialogueRole::Parent);
        assert_eq!(format!("{}", DialogueRole::Child), "child");
    }

    #[test]
    fn test_locale_canonical() {
        assert!(UserLocale::English.is_canonical());
        assert!(!UserLocale::SimplifiedChinese.is_canonical());
        assert!(!UserLocale::Korean.is_canonical());
    }

    #[test]
    fn test_turn_open_and_close() {
        let session_id = Uuid::new_v4();
        let turn = DialogueTurn::open(session_id, DialogueRole::Parent);

        assert_eq!(turn.session_id, session_id);
        assert_eq!(turn.role, DialogueRole::Parent);
        assert!(turn.is_open());
        assert!(turn.audio_filename.is_none());

        let mut closed = turn.clone();
        closed.ended_at = Some(Utc::now());
        assert!(!closed.is_open());
    }

    #[test]
    fn test_message_content_untagged_roundtrip() {
        let text = MessageContent::Text("hello".to_string());
        let json = serde_json::to_string(&text).unwrap();
        assert_eq!(json, "\"hello\"");
        let back: MessageContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, text);

        let recommendation = ChildCardRecommendationResult::new(
            Uuid::new_v4(),
            vec![CardInfo::new("water", CardCategory::Topic)],
        );
        let cards = MessageContent::Cards(recommendation.cards.clone());
        let json = serde_json::to_string(&cards).unwrap();
        assert!(json.starts_with('['));
        let back: MessageContent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cards);
    }

    #[test]
    fn test_parent_message_keeps_localized_input() {
        let turn_id = Uuid::new_v4();
        let message =
            DialogueMessage::parent_text(turn_id, "Hello".to_string(), "你好".to_string());

        assert_eq!(message.role, DialogueRole::Parent);
        assert_eq!(message.content, MessageContent::Text("Hello".to_string()));
        assert_eq!(message.content_localized.as_deref(), Some("你好"));
    }

    #[test]
    fn test_recommendation_stamps_cards() {
        let turn_id = Uuid::new_v4();
        let recommendation = ChildCardRecommendationResult::new(
            turn_id,
            vec![
                CardInfo::new("water", CardCategory::Topic),
                CardInfo::new("happy", CardCategory::Emotion).with_localized("开心"),
            ],
        );

        for card in &recommendation.cards {
            assert_eq!(card.recommendation_id, recommendation.id);
        }
        assert_eq!(
            recommendation.cards[1].label_localized.as_deref(),
            Some("开心")
        );

        let card = &recommendation.cards[0];
        assert_eq!(recommendation.find_card(card.id), Some(card));
        assert_eq!(recommendation.find_card(Uuid::new_v4()), None);
        assert_eq!(card.identity().recommendation_id, recommendation.id);
    }

    #[test]
    fn test_with_fresh_id_restamps_cards() {
        let recommendation = ChildCardRecommendationResult::new(
            Uuid::new_v4(),
            vec![CardInfo::new("play", CardCategory::Action)],
        );
        let reissued = recommendation.with_fresh_id();

        assert_ne!(reissued.id, recommendation.id);
        assert_eq!(reissued.turn_id, recommendation.turn_id);
        assert_eq!(reissued.cards.len(), 1);
        assert_eq!(reissued.cards[0].id, recommendation.cards[0].id);
        assert_eq!(reissued.cards[0].label, "play");
        assert_eq!(reissued.cards[0].recommendation_id, reissued.id);
    }

    #[test]
    fn test_selection_copy_on_write() {
        let turn_id = Uuid::new_v4();
        let a = CardIdentity {
            id: Uuid::new_v4(),
            recommendation_id: Uuid::new_v4(),
        };
        let b = CardIdentity {
            id: Uuid::new_v4(),
            recommendation_id: a.recommendation_id,
        };

        let first = InterimCardSelection::new(turn_id, vec![a]);
        let second = first.with_appended(b);

        assert_ne!(second.id, first.id);
        assert_eq!(first.cards, vec![a]);
        assert_eq!(second.cards, vec![a, b]);

        let (third, removed) = second.without_last().unwrap();
        assert_eq!(removed, b);
        assert_eq!(third.cards, vec![a]);
        assert_ne!(third.id, second.id);

        let empty = InterimCardSelection::new(turn_id, Vec::new());
        assert!(empty.is_empty());
        assert!(empty.without_last().is_none());
    }

    #[test]
    fn test_guide_element_constructors() {
        let messaging =
            ParentGuideElement::messaging(ParentGuideCategory::Choice, "Offer two options");
        assert_eq!(messaging.guide_type, ParentGuideType::Messaging);
        assert_eq!(
            messaging.category,
            GuideCategory::Messaging(ParentGuideCategory::Choice)
        );
        assert!(messaging.is_generated());

        let feedback = ParentGuideElement::feedback(
            vec![DialogueInspectionCategory::Complex],
            "Try a shorter sentence",
        );
        assert_eq!(feedback.guide_type, ParentGuideType::Feedback);
        assert!(feedback.is_generated());

        let templated = ParentGuideElement::messaging(ParentGuideCategory::Intention, "Ask")
            .with_static_key("plan-intro")
            .with_localized("问一下");
        assert!(!templated.is_generated());
        assert_eq!(templated.static_key.as_deref(), Some("plan-intro"));
        assert_eq!(templated.guide_localized.as_deref(), Some("问一下"));
    }

    #[test]
    fn test_guide_category_untagged_serialization() {
        let messaging = GuideCategory::Messaging(ParentGuideCategory::Empathize);
        assert_eq!(serde_json::to_string(&messaging).unwrap(), "\"empathize\"");

        let feedback = GuideCategory::Feedback(vec![
            DialogueInspectionCategory::Blame,
            DialogueInspectionCategory::Deviation,
        ]);
        assert_eq!(
            serde_json::to_string(&feedback).unwrap(),
            "[\"blame\",\"deviation\"]"
        );

        let back: GuideCategory = serde_json::from_str("[\"correction\"]").unwrap();
        assert_eq!(
            back,
            GuideCategory::Feedback(vec![DialogueInspectionCategory::Correction])
        );
    }

    #[test]
    fn test_guide_recommendation_lookup() {
        let turn_id = Uuid::new_v4();
        let recommendation = ParentGuideRecommendationResult::new(
            turn_id,
            vec![
                ParentGuideElement::messaging(ParentGuideCategory::Intention, "Ask"),
                ParentGuideElement::feedback(vec![DialogueInspectionCategory::Blame], "Soften"),
                ParentGuideElement::messaging(ParentGuideCategory::Extend, "Build on it"),
            ],
        );

        let messaging: Vec<_> = recommendation.messaging_guides().collect();
        assert_eq!(messaging.len(), 2);

        let guide = &recommendation.guides[1];
        assert_eq!(recommendation.find_guide(guide.id), Some(guide));
        assert_eq!(recommendation.find_guide(Uuid::new_v4()), None);
    }

    #[test]
    fn test_interaction_serializes_kind_as_type() {
        let interaction = Interaction::new(
            InteractionType::AppendChildCard,
            Uuid::new_v4(),
            serde_json::json!({ "card_id": "abc" }),
        );

        let json = serde_json::to_value(&interaction).unwrap();
        assert_eq!(json["type"], "append_child_card");
        assert_eq!(json["metadata"]["card_id"], "abc");

        let back: Interaction = serde_json::from_value(json).unwrap();
        assert_eq!(back.kind, InteractionType::AppendChildCard);
    }

    #[test]
    fn test_session_info_roundtrip() {
        let info = SessionInfo::new(
            Uuid::new_v4(),
            SessionTopicInfo::new(TopicCategory::Recall),
            "Asia/Seoul".to_string(),
        );
        assert_eq!(info.status, SessionStatus::Initial);
        assert!(info.ended_at.is_none());

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("\"initial\""));
        assert!(json.contains("Asia/Seoul"));

        let back: SessionInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(back, info);
    }

    #[test]
    fn test_card_display() {
        let card = CardInfo::new("more", CardCategory::Core);
        assert_eq!(format!("{}", card), "more (core)");
    }
}
