//! Durable session state.
//!
//! `SessionStorage` is the persistence contract the moderation engine reads
//! and writes through. Backends must preserve append order per entity kind;
//! every "latest" read resolves to the most recently appended entity for the
//! given turn. One storage instance covers exactly one session, and callers
//! are expected to serialize operations per session.

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use crate::model::{
    ChildCardRecommendationResult, DialogueMessage, DialogueTurn, Interaction,
    InterimCardSelection, ParentExampleMessage, ParentGuideRecommendationResult, SessionInfo,
};

mod memory;

pub use memory::MemorySessionStorage;

#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Retrieves the session record, if one was ever written.
    async fn get_session_info(&self) -> Result<Option<SessionInfo>>;

    /// Writes the session record, replacing any previous version.
    async fn update_session_info(&self, info: &SessionInfo) -> Result<()>;

    /// Inserts the turn if unseen, otherwise replaces the stored turn with
    /// the same id. Only the currently-open turn is ever upserted.
    async fn upsert_turn(&self, turn: &DialogueTurn) -> Result<()>;

    /// Retrieves the most recently appended turn.
    async fn get_latest_turn(&self) -> Result<Option<DialogueTurn>>;

    /// Appends a message to the dialogue log.
    async fn add_message(&self, message: &DialogueMessage) -> Result<()>;

    /// Retrieves the full dialogue in append order.
    async fn get_dialogue(&self) -> Result<Vec<DialogueMessage>>;

    /// Appends a card recommendation.
    async fn add_card_recommendation(
        &self,
        recommendation: &ChildCardRecommendationResult,
    ) -> Result<()>;

    /// Retrieves a card recommendation by id, from any turn.
    async fn get_card_recommendation(
        &self,
        recommendation_id: Uuid,
    ) -> Result<Option<ChildCardRecommendationResult>>;

    /// Retrieves the most recently appended card recommendation for a turn.
    async fn get_latest_card_recommendation(
        &self,
        turn_id: Uuid,
    ) -> Result<Option<ChildCardRecommendationResult>>;

    /// Appends an interim card selection.
    async fn add_card_selection(&self, selection: &InterimCardSelection) -> Result<()>;

    /// Retrieves the most recently appended selection for a turn.
    async fn get_latest_card_selection(
        &self,
        turn_id: Uuid,
    ) -> Result<Option<InterimCardSelection>>;

    /// Appends a parent guide recommendation.
    async fn add_guide_recommendation(
        &self,
        recommendation: &ParentGuideRecommendationResult,
    ) -> Result<()>;

    /// Retrieves a guide recommendation by id, from any turn.
    async fn get_guide_recommendation(
        &self,
        recommendation_id: Uuid,
    ) -> Result<Option<ParentGuideRecommendationResult>>;

    /// Retrieves the most recently appended guide recommendation for a turn.
    async fn get_latest_guide_recommendation(
        &self,
        turn_id: Uuid,
    ) -> Result<Option<ParentGuideRecommendationResult>>;

    /// Appends an example message.
    async fn add_example_message(&self, example: &ParentExampleMessage) -> Result<()>;

    /// Retrieves the example written for one guide of one recommendation.
    async fn get_example_message(
        &self,
        recommendation_id: Uuid,
        guide_id: Uuid,
    ) -> Result<Option<ParentExampleMessage>>;

    /// Appends an interaction to the audit log.
    async fn add_interaction(&self, interaction: &Interaction) -> Result<()>;

    /// Retrieves the audit log in append order.
    async fn get_interactions(&self) -> Result<Vec<Interaction>>;

    /// Removes every entity belonging to the session.
    async fn delete_all(&self) -> Result<()>;

    /// Releases any resources held by the backend. The engine calls this
    /// once, when the session terminates or is aborted.
    async fn dispose(&self) -> Result<()>;
}
