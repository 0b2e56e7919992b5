//! In-memory reference backend.

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::model::{
    ChildCardRecommendationResult, DialogueMessage, DialogueTurn, Interaction,
    InterimCardSelection, ParentExampleMessage, ParentGuideRecommendationResult, SessionInfo,
};
use crate::storage::SessionStorage;

#[derive(Default, Serialize)]
struct MemoryState {
    session: Option<SessionInfo>,
    turns: Vec<DialogueTurn>,
    messages: Vec<DialogueMessage>,
    card_recommendations: Vec<ChildCardRecommendationResult>,
    card_selections: Vec<InterimCardSelection>,
    guide_recommendations: Vec<ParentGuideRecommendationResult>,
    example_messages: Vec<ParentExampleMessage>,
    interactions: Vec<Interaction>,
}

/// [`SessionStorage`] backend holding everything in memory.
///
/// Entities live in plain append vectors, so insertion order doubles as the
/// sequence the "latest" reads resolve against. This is the executable
/// reference for the contract and the backend the engine's own tests run on.
#[derive(Default)]
pub struct MemorySessionStorage {
    state: RwLock<MemoryState>,
}

impl MemorySessionStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serializes everything currently stored, mainly for diagnostics and
    /// for asserting that an operation wrote nothing.
    pub async fn snapshot(&self) -> Result<serde_json::Value> {
        let state = self.state.read().await;
        Ok(serde_json::to_value(&*state)?)
    }
}

#[async_trait]
impl SessionStorage for MemorySessionStorage {
    async fn get_session_info(&self) -> Result<Option<SessionInfo>> {
        Ok(self.state.read().await.session.clone())
    }

    async fn update_session_info(&self, info: &SessionInfo) -> Result<()> {
        self.state.write().await.session = Some(info.clone());
        Ok(())
    }

    async fn upsert_turn(&self, turn: &DialogueTurn) -> Result<()> {
        let mut state = self.state.write().await;
        match state.turns.iter_mut().find(|stored| stored.id == turn.id) {
            Some(stored) => *stored = turn.clone(),
            None => state.turns.push(turn.clone()),
        }
        Ok(())
    }

    async fn get_latest_turn(&self) -> Result<Option<DialogueTurn>> {
        Ok(self.state.read().await.turns.last().cloned())
    }

    async fn add_message(&self, message: &DialogueMessage) -> Result<()> {
        self.state.write().await.messages.push(message.clone());
        Ok(())
    }

    async fn get_dialogue(&self) -> Result<Vec<DialogueMessage>> {
        Ok(self.state.read().await.messages.clone())
    }

    async fn add_card_recommendation(
        &self,
        recommendation: &ChildCardRecommendationResult,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .card_recommendations
            .push(recommendation.clone());
        Ok(())
    }

    async fn get_card_recommendation(
        &self,
        recommendation_id: Uuid,
    ) -> Result<Option<ChildCardRecommendationResult>> {
        Ok(self
            .state
            .read()
            .await
            .card_recommendations
            .iter()
            .find(|stored| stored.id == recommendation_id)
            .cloned())
    }

    async fn get_latest_card_recommendation(
        &self,
        turn_id: Uuid,
    ) -> Result<Option<ChildCardRecommendationResult>> {
        Ok(self
            .state
            .read()
            .await
            .card_recommendations
            .iter()
            .rev()
            .find(|stored| stored.turn_id == turn_id)
            .cloned())
    }

    async fn add_card_selection(&self, selection: &InterimCardSelection) -> Result<()> {
        self.state
            .write()
            .await
            .card_selections
            .push(selection.clone());
        Ok(())
    }

    async fn get_latest_card_selection(
        &self,
        turn_id: Uuid,
    ) -> Result<Option<InterimCardSelection>> {
        Ok(self
            .state
            .read()
            .await
            .card_selections
            .iter()
            .rev()
            .find(|stored| stored.turn_id == turn_id)
            .cloned())
    }

    async fn add_guide_recommendation(
        &self,
        recommendation: &ParentGuideRecommendationResult,
    ) -> Result<()> {
        self.state
            .write()
            .await
            .guide_recommendations
            .push(recommendation.clone());
        Ok(())
    }

    async fn get_guide_recommendation(
        &self,
        recommendation_id: Uuid,
    ) -> Result<Option<ParentGuideRecommendationResult>> {
        Ok(self
            .state
            .read()
            .await
            .guide_recommendations
            .iter()
            .find(|stored| stored.id == recommendation_id)
            .cloned())
    }

    async fn get_latest_guide_recommendation(
        &self,
        turn_id: Uuid,
    ) -> Result<Option<ParentGuideRecommendationResult>> {
        Ok(self
            .state
            .read()
            .await
            .guide_recommendations
            .iter()
            .rev()
            .find(|stored| stored.turn_id == turn_id)
            .cloned())
    }

    async fn add_example_message(&self, example: &ParentExampleMessage) -> Result<()> {
        self.state
            .write()
            .await
            .example_messages
            .push(example.clone());
        Ok(())
    }

    async fn get_example_message(
        &self,
        recommendation_id: Uuid,
        guide_id: Uuid,
    ) -> Result<Option<ParentExampleMessage>> {
        Ok(self
            .state
            .read()
            .await
            .example_messages
            .iter()
            .rev()
            .find(|stored| {
                stored.recommendation_id == recommendation_id && stored.guide_id == guide_id
            })
            .cloned())
    }

    async fn add_interaction(&self, interaction: &Interaction) -> Result<()> {
        self.state
            .write()
            .await
            .interactions
            .push(interaction.clone());
        Ok(())
    }

    async fn get_interactions(&self) -> Result<Vec<Interaction>> {
        Ok(self.state.read().await.interactions.clone())
    }

    async fn delete_all(&self) -> Result<()> {
        *self.state.write().await = MemoryState::default();
        Ok(())
    }

    async fn dispose(&self) -> Result<()> {
        Ok(())
    }
}
