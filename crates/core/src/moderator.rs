//! Conversation moderation engine.
//!
//! `ModeratorSession` mediates one turn-taking session between a parent and
//! a minimally verbal child. The parent writes, the child answers with
//! cards; the engine enforces strict turn alternation, persists every
//! exchange through [`SessionStorage`], and keeps content generation one
//! step ahead of the family with speculative background tasks.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::CoreConfig;
use crate::error::{ModerationError, Result};
use crate::generators::{
    ChildCardRecommender, ChildCardRequest, DialogueInspectionResult, DialogueInspector,
    ParentExampleGenerator, ParentGuideRecommender, ParentGuideRequest, Translator,
};
use crate::model::{
    CardIdentity, CardInfo, ChildCardRecommendationResult, DialogueMessage, DialogueRole,
    DialogueTurn, Dyad, Interaction, InteractionType, InterimCardSelection, ParentExampleMessage,
    ParentGuideElement, ParentGuideRecommendationResult, ParentGuideType, SessionInfo,
    SessionStatus,
};
use crate::static_guides::StaticGuideFactory;
use crate::storage::SessionStorage;
use crate::tasks::{ExampleTaskSet, TaggedTask, supersede};
use crate::topic::SessionTopicInfo;

type InspectionTask = TaggedTask<(Option<DialogueInspectionResult>, Uuid)>;

/// The shared collaborators, created once at startup and handed to every
/// session. All fields are public so a host can assemble them directly.
#[derive(Clone)]
pub struct Collaborators {
    pub card_recommender: Arc<dyn ChildCardRecommender>,
    pub guide_recommender: Arc<dyn ParentGuideRecommender>,
    pub example_generator: Arc<dyn ParentExampleGenerator>,
    pub dialogue_inspector: Arc<dyn DialogueInspector>,
    pub translator: Arc<dyn Translator>,
    pub static_guides: Arc<StaticGuideFactory>,
    pub config: CoreConfig,
}

/// One moderated conversation between a dyad, backed by one storage
/// instance.
///
/// Callers are expected to serialize operations per session; the engine
/// itself only guards logical preconditions (status, speaker), not
/// concurrent invocation.
pub struct ModeratorSession {
    dyad: Dyad,
    storage: Arc<dyn SessionStorage>,
    collaborators: Collaborators,
    inspection_task: Option<InspectionTask>,
    example_tasks: Option<ExampleTaskSet>,
}

impl ModeratorSession {
    fn new(dyad: Dyad, storage: Arc<dyn SessionStorage>, collaborators: Collaborators) -> Self {
        Self {
            dyad,
            storage,
            collaborators,
            inspection_task: None,
            example_tasks: None,
        }
    }

    /// Creates a fresh session in `Initial` status and persists its record.
    pub async fn create(
        dyad: Dyad,
        topic: SessionTopicInfo,
        timezone: impl Into<String>,
        storage: Arc<dyn SessionStorage>,
        collaborators: Collaborators,
    ) -> Result<Self> {
        let info = SessionInfo::new(dyad.id, topic, timezone.into());
        storage.update_session_info(&info).await?;
        info!(session_id = %info.id, dyad_id = %dyad.id, "Created moderation session.");
        Ok(Self::new(dyad, storage, collaborators))
    }

    /// Restores a session from persisted state.
    ///
    /// Returns `Ok(None)` when the storage holds no session at all. A
    /// session left in `Started` with no turn is repaired by opening a fresh
    /// parent turn; a `Started` session whose latest turn is anything other
    /// than an open parent turn is unrecoverable.
    pub async fn restore(
        dyad: Dyad,
        storage: Arc<dyn SessionStorage>,
        collaborators: Collaborators,
    ) -> Result<Option<Self>> {
        let Some(info) = storage.get_session_info().await? else {
            return Ok(None);
        };
        if info.status == SessionStatus::Started {
            match storage.get_latest_turn().await? {
                None => {
                    let turn = DialogueTurn::open(info.id, DialogueRole::Parent);
                    storage.upsert_turn(&turn).await?;
                    warn!(
                        session_id = %info.id,
                        turn_id = %turn.id,
                        "Restored a started session with no turn. Opened a fresh parent turn."
                    );
                }
                Some(turn) if turn.role == DialogueRole::Parent && turn.is_open() => {}
                Some(turn) => {
                    return Err(ModerationError::restore_inconsistency(format!(
                        "session {} is marked started but its latest turn is a {} turn (open: {})",
                        info.id,
                        turn.role,
                        turn.is_open()
                    )));
                }
            }
        }
        info!(session_id = %info.id, status = ?info.status, "Restored moderation session.");
        Ok(Some(Self::new(dyad, storage, collaborators)))
    }

    pub fn dyad(&self) -> &Dyad {
        &self.dyad
    }

    /// Storage handle, for read-through access to dialogue and audit logs.
    pub fn storage(&self) -> &Arc<dyn SessionStorage> {
        &self.storage
    }

    async fn session_info(&self) -> Result<SessionInfo> {
        self.storage
            .get_session_info()
            .await?
            .ok_or_else(|| ModerationError::invalid_state("session record is missing from storage"))
    }

    async fn session_topic(&self) -> Result<SessionTopicInfo> {
        Ok(self.session_info().await?.topic)
    }

    /// Role holding the open turn, or `None` before the first turn exists.
    pub async fn current_speaker(&self) -> Result<Option<DialogueRole>> {
        Ok(self.storage.get_latest_turn().await?.map(|turn| turn.role))
    }

    /// Verifies the current turn belongs to `required` and returns it.
    /// Fails before any state is touched.
    async fn require_speaker(&self, required: DialogueRole) -> Result<DialogueTurn> {
        match self.storage.get_latest_turn().await? {
            Some(turn) if turn.role == required => Ok(turn),
            other => Err(ModerationError::WrongSpeaker {
                required,
                actual: other.map(|turn| turn.role),
            }),
        }
    }

    /// Closes the open turn, stamping its end exactly once, and opens a new
    /// turn for the opposite role.
    async fn switch_turn(&self) -> Result<DialogueTurn> {
        let mut current = self.storage.get_latest_turn().await?.ok_or_else(|| {
            ModerationError::invalid_state("cannot switch turns before any turn exists")
        })?;
        if current.ended_at.is_none() {
            current.ended_at = Some(Utc::now());
            self.storage.upsert_turn(&current).await?;
        }
        let next = DialogueTurn::open(current.session_id, current.role.opposite());
        self.storage.upsert_turn(&next).await?;
        debug!(turn_id = %next.id, role = %next.role, "Switched turn.");
        Ok(next)
    }

    async fn log_interaction(
        &self,
        kind: InteractionType,
        turn_id: Uuid,
        metadata: serde_json::Value,
    ) -> Result<()> {
        self.storage
            .add_interaction(&Interaction::new(kind, turn_id, metadata))
            .await?;
        Ok(())
    }

    /// Starts the session: opens the first parent turn, produces the opening
    /// guide recommendation and enters `Conversation`.
    pub async fn start(&mut self) -> Result<(DialogueTurn, ParentGuideRecommendationResult)> {
        let mut session_info = self.session_info().await?;
        if session_info.status != SessionStatus::Initial {
            return Err(ModerationError::WrongSessionStatus {
                actual: session_info.status,
            });
        }
        session_info.status = SessionStatus::Started;
        self.storage.update_session_info(&session_info).await?;

        let current_turn = match self.storage.get_latest_turn().await? {
            Some(turn) if turn.is_open() => turn,
            _ => {
                let turn = DialogueTurn::open(session_info.id, DialogueRole::Parent);
                self.storage.upsert_turn(&turn).await?;
                info!(session_id = %session_info.id, turn_id = %turn.id, "Opened the first parent turn.");
                turn
            }
        };

        let guides = self.produce_guide_recommendation().await?;

        let mut session_info = self.session_info().await?;
        session_info.status = SessionStatus::Conversation;
        self.storage.update_session_info(&session_info).await?;
        info!(session_id = %session_info.id, "Session entered conversation.");

        Ok((current_turn, guides))
    }

    /// Ends the session: cancels background work, stamps the end timestamp
    /// once, and releases storage resources.
    pub async fn terminate(&mut self) -> Result<()> {
        let mut session_info = self.session_info().await?;
        if session_info.status == SessionStatus::Terminated {
            return Err(ModerationError::WrongSessionStatus {
                actual: session_info.status,
            });
        }
        self.cancel_background_tasks();
        session_info.status = SessionStatus::Terminated;
        session_info.ended_at = Some(Utc::now());
        self.storage.update_session_info(&session_info).await?;
        self.storage.dispose().await?;
        info!(session_id = %session_info.id, "Session terminated.");
        Ok(())
    }

    /// Discards the session: cancels background work and deletes every
    /// persisted entity. The destructive counterpart of [`Self::terminate`].
    pub async fn abort(mut self) -> Result<()> {
        self.cancel_background_tasks();
        self.storage.delete_all().await?;
        self.storage.dispose().await?;
        info!(dyad_id = %self.dyad.id, "Session aborted and storage cleared.");
        Ok(())
    }

    fn cancel_background_tasks(&mut self) {
        self.clear_example_tasks();
        supersede(&mut self.inspection_task, None);
    }

    fn clear_example_tasks(&mut self) {
        if let Some(tasks) = self.example_tasks.take() {
            tasks.abort_all();
        }
    }

    /// Records the audio filename on the currently open turn.
    pub async fn attach_turn_audio(&self, filename: impl Into<String>) -> Result<DialogueTurn> {
        let mut turn = self
            .storage
            .get_latest_turn()
            .await?
            .ok_or_else(|| ModerationError::invalid_state("no turn to attach audio to"))?;
        turn.audio_filename = Some(filename.into());
        self.storage.upsert_turn(&turn).await?;
        Ok(turn)
    }

    /// Accepts the parent's message, hands the turn to the child, and
    /// returns the first card recommendation for the child's reply.
    pub async fn submit_parent_message(
        &mut self,
        message: impl Into<String>,
    ) -> Result<(DialogueTurn, ChildCardRecommendationResult)> {
        let message = message.into();
        let current_turn = self.require_speaker(DialogueRole::Parent).await?;

        // Whatever examples were drafted for this parent turn are moot now.
        self.clear_example_tasks();

        let locale = self.dyad.locale;
        let (canonical, localized) = if locale.is_canonical() {
            (message.clone(), message)
        } else {
            let translated = self
                .collaborators
                .translator
                .translate(&message, locale)
                .await?;
            (translated, message)
        };

        self.storage
            .add_message(&DialogueMessage::parent_text(
                current_turn.id,
                canonical.clone(),
                localized.clone(),
            ))
            .await?;

        let dialogue = self.storage.get_dialogue().await?;
        self.start_dialogue_inspection(dialogue.clone());

        let topic = self.session_topic().await?;
        let next_turn = self.switch_turn().await?;

        let recommendation = self
            .collaborators
            .card_recommender
            .generate(ChildCardRequest {
                turn_id: next_turn.id,
                locale,
                parent_type: self.dyad.parent_type,
                topic,
                dialogue,
                interim_cards: None,
                previous_recommendation: None,
            })
            .await?;
        self.storage.add_card_recommendation(&recommendation).await?;

        self.log_interaction(
            InteractionType::SubmitParentMessage,
            current_turn.id,
            json!({
                "message": localized,
                "message_eng": canonical,
                "next_turn_id": next_turn.id,
                "child_recommendation_id": recommendation.id,
            }),
        )
        .await?;

        Ok((next_turn, recommendation))
    }

    /// Regenerates the child's card recommendation, feeding the generator
    /// the interim selection and the previous result to diversify against.
    pub async fn refresh_child_card_recommendation(
        &self,
    ) -> Result<ChildCardRecommendationResult> {
        let current_turn = self.require_speaker(DialogueRole::Child).await?;

        let (dialogue, interim_selection, previous_recommendation) = futures::try_join!(
            self.storage.get_dialogue(),
            self.storage.get_latest_card_selection(current_turn.id),
            self.storage.get_latest_card_recommendation(current_turn.id),
        )?;

        let interim_cards = match &interim_selection {
            Some(selection) => Some(self.resolve_card_identities(&selection.cards).await?),
            None => None,
        };

        let topic = self.session_topic().await?;
        let recommendation = self
            .collaborators
            .card_recommender
            .generate(ChildCardRequest {
                turn_id: current_turn.id,
                locale: self.dyad.locale,
                parent_type: self.dyad.parent_type,
                topic,
                dialogue,
                interim_cards,
                previous_recommendation,
            })
            .await?;
        self.storage.add_card_recommendation(&recommendation).await?;

        self.log_interaction(
            InteractionType::RefreshChildCards,
            current_turn.id,
            json!({ "new_card_recommendation_id": recommendation.id }),
        )
        .await?;

        Ok(recommendation)
    }

    /// Adds one picked card to the child's interim selection.
    pub async fn append_child_card(&self, identity: CardIdentity) -> Result<InterimCardSelection> {
        let current_turn = self.require_speaker(DialogueRole::Child).await?;

        // The identity must resolve to a card the child was actually shown.
        let known = self
            .storage
            .get_card_recommendation(identity.recommendation_id)
            .await?
            .is_some_and(|recommendation| recommendation.find_card(identity.id).is_some());
        if !known {
            return Err(ModerationError::invalid_state(format!(
                "card {} does not belong to recommendation {}",
                identity.id, identity.recommendation_id
            )));
        }

        let new_selection = match self
            .storage
            .get_latest_card_selection(current_turn.id)
            .await?
        {
            Some(selection) => selection.with_appended(identity),
            None => InterimCardSelection::new(current_turn.id, vec![identity]),
        };
        self.storage.add_card_selection(&new_selection).await?;

        self.log_interaction(
            InteractionType::AppendChildCard,
            current_turn.id,
            json!({ "new_card_selection_id": new_selection.id }),
        )
        .await?;

        Ok(new_selection)
    }

    /// Removes the most recently picked card. With nothing picked this is a
    /// no-op reporting current state.
    ///
    /// The originating recommendation of the removed card is persisted again
    /// under a fresh id so clients stop treating the popped-from id as
    /// current.
    pub async fn pop_last_child_card(
        &self,
    ) -> Result<(Option<InterimCardSelection>, ChildCardRecommendationResult)> {
        let current_turn = self.require_speaker(DialogueRole::Child).await?;
        let current_selection = self
            .storage
            .get_latest_card_selection(current_turn.id)
            .await?;

        let Some((new_selection, removed)) = current_selection
            .as_ref()
            .and_then(|selection| selection.without_last())
        else {
            let recommendation = self.latest_card_recommendation(current_turn.id).await?;
            return Ok((current_selection, recommendation));
        };

        self.storage.add_card_selection(&new_selection).await?;

        let origin = self
            .storage
            .get_card_recommendation(removed.recommendation_id)
            .await?
            .ok_or_else(|| {
                ModerationError::invalid_state(format!(
                    "removed card {} references unknown recommendation {}",
                    removed.id, removed.recommendation_id
                ))
            })?;
        let recommendation = origin.with_fresh_id();
        self.storage.add_card_recommendation(&recommendation).await?;

        self.log_interaction(
            InteractionType::RemoveLastChildCard,
            current_turn.id,
            json!({
                "removed_card_id": removed.id,
                "orig_card_selection_id": current_selection.as_ref().map(|selection| selection.id),
                "new_card_selection_id": new_selection.id,
            }),
        )
        .await?;

        Ok((Some(new_selection), recommendation))
    }

    /// Confirms the child's selection as their message for this turn, hands
    /// the turn back to the parent, and returns the next guide
    /// recommendation.
    pub async fn confirm_child_card_selection(
        &mut self,
    ) -> Result<(DialogueTurn, ParentGuideRecommendationResult)> {
        let current_turn = self.require_speaker(DialogueRole::Child).await?;
        let selection = self
            .storage
            .get_latest_card_selection(current_turn.id)
            .await?
            .filter(|selection| !selection.is_empty())
            .ok_or_else(|| {
                ModerationError::invalid_state("cannot confirm an empty card selection")
            })?;

        let cards = self.resolve_card_identities(&selection.cards).await?;
        self.storage
            .add_message(&DialogueMessage::child_cards(current_turn.id, cards))
            .await?;

        let next_turn = self.switch_turn().await?;
        let recommendation = self.produce_guide_recommendation().await?;

        self.log_interaction(
            InteractionType::ConfirmChildCardSelection,
            current_turn.id,
            json!({
                "next_turn_id": next_turn.id,
                "confirmed_card_selection_id": selection.id,
                "parent_recommendation_id": recommendation.id,
            }),
        )
        .await?;

        Ok((next_turn, recommendation))
    }

    /// Fetches the example message for one messaging guide, preferring work
    /// already done: a speculative task first, then storage, then on-demand
    /// generation.
    pub async fn request_parent_example_message(
        &mut self,
        recommendation_id: Uuid,
        guide_id: Uuid,
    ) -> Result<ParentExampleMessage> {
        let current_turn = self.require_speaker(DialogueRole::Parent).await?;

        let speculative = match self.example_tasks.as_mut() {
            Some(set) if set.recommendation_id() == recommendation_id => set.take(guide_id),
            _ => None,
        };

        let example = match speculative {
            Some(task) => task.join().await?,
            None => {
                match self
                    .storage
                    .get_example_message(recommendation_id, guide_id)
                    .await?
                {
                    Some(example) => example,
                    None => {
                        self.generate_example_on_demand(recommendation_id, guide_id)
                            .await?
                    }
                }
            }
        };

        self.log_interaction(
            InteractionType::RequestParentExampleMessage,
            current_turn.id,
            json!({
                "recommendation_id": recommendation_id,
                "guide_id": guide_id,
                "example_message_id": example.id,
            }),
        )
        .await?;

        Ok(example)
    }

    async fn latest_card_recommendation(
        &self,
        turn_id: Uuid,
    ) -> Result<ChildCardRecommendationResult> {
        self.storage
            .get_latest_card_recommendation(turn_id)
            .await?
            .ok_or_else(|| {
                ModerationError::invalid_state("no card recommendation exists for this turn")
            })
    }

    async fn resolve_card_identities(&self, identities: &[CardIdentity]) -> Result<Vec<CardInfo>> {
        let mut cards = Vec::with_capacity(identities.len());
        for identity in identities {
            let card = self
                .storage
                .get_card_recommendation(identity.recommendation_id)
                .await?
                .as_ref()
                .and_then(|recommendation| recommendation.find_card(identity.id).cloned())
                .ok_or_else(|| {
                    ModerationError::invalid_state(format!(
                        "card {} cannot be resolved through recommendation {}",
                        identity.id, identity.recommendation_id
                    ))
                })?;
            cards.push(card);
        }
        Ok(cards)
    }

    /// Starts a fresh inspection over `dialogue`, superseding any previous
    /// task.
    fn start_dialogue_inspection(&mut self, dialogue: Vec<DialogueMessage>) {
        let task_id = Uuid::new_v4();
        let inspector = Arc::clone(&self.collaborators.dialogue_inspector);
        let task = TaggedTask::spawn(task_id, async move {
            inspector.inspect(&dialogue, task_id).await
        });
        debug!(task_id = %task_id, "Started dialogue inspection.");
        supersede(&mut self.inspection_task, Some(task));
    }

    /// Joins the pending inspection. A result echoing a tag other than the
    /// one the task was issued under is stale and gets discarded.
    async fn join_current_inspection(&mut self) -> Result<Option<DialogueInspectionResult>> {
        let Some(task) = self.inspection_task.take() else {
            return Ok(None);
        };
        let expected = task.task_id();
        let (result, echoed) = task.join().await?;
        if echoed != expected {
            warn!(task_id = %expected, "Discarding stale dialogue inspection result.");
            return Ok(None);
        }
        Ok(result)
    }

    /// Produces and persists the guide recommendation for the open parent
    /// turn, then drafts its example messages in the background.
    ///
    /// The very first recommendation, before any dialogue exists, comes from
    /// the static template table rather than the generator.
    async fn produce_guide_recommendation(&mut self) -> Result<ParentGuideRecommendationResult> {
        let current_turn = self.storage.get_latest_turn().await?.ok_or_else(|| {
            ModerationError::invalid_state("no open turn to recommend guides for")
        })?;
        let dialogue = self.storage.get_dialogue().await?;
        let inspection = self.join_current_inspection().await?;
        let topic = self.session_topic().await?;

        let recommendation = if dialogue.is_empty() {
            self.collaborators
                .static_guides
                .guide_recommendation(&topic, &self.dyad, current_turn.id)
        } else {
            self.collaborators
                .guide_recommender
                .generate(ParentGuideRequest {
                    turn_id: current_turn.id,
                    dyad: self.dyad.clone(),
                    topic: topic.clone(),
                    dialogue: dialogue.clone(),
                    inspection,
                })
                .await?
        };
        self.storage.add_guide_recommendation(&recommendation).await?;

        self.place_example_tasks(&topic, &dialogue, &recommendation);

        Ok(recommendation)
    }

    /// Eagerly drafts one example per messaging guide so the parent's later
    /// request is most likely already answered. A new recommendation always
    /// invalidates the previous set.
    fn place_example_tasks(
        &mut self,
        topic: &SessionTopicInfo,
        dialogue: &[DialogueMessage],
        recommendation: &ParentGuideRecommendationResult,
    ) {
        self.clear_example_tasks();
        if !self.collaborators.config.prefetch_examples {
            debug!(recommendation_id = %recommendation.id, "Example prefetch disabled.");
            return;
        }
        let mut set = ExampleTaskSet::new(recommendation.id);
        for guide in recommendation.messaging_guides() {
            set.insert(
                guide.id,
                TaggedTask::spawn(
                    guide.id,
                    example_generation(
                        self.collaborators.clone(),
                        Arc::clone(&self.storage),
                        self.dyad.clone(),
                        topic.clone(),
                        dialogue.to_vec(),
                        guide.clone(),
                        recommendation.id,
                    ),
                ),
            );
        }
        debug!(
            recommendation_id = %recommendation.id,
            count = set.len(),
            "Placed example generation tasks."
        );
        self.example_tasks = Some(set);
    }

    async fn generate_example_on_demand(
        &self,
        recommendation_id: Uuid,
        guide_id: Uuid,
    ) -> Result<ParentExampleMessage> {
        let recommendation = self
            .storage
            .get_guide_recommendation(recommendation_id)
            .await?
            .ok_or_else(|| {
                ModerationError::invalid_state(format!(
                    "unknown guide recommendation {recommendation_id}"
                ))
            })?;
        let guide = recommendation.find_guide(guide_id).ok_or_else(|| {
            ModerationError::invalid_state(format!(
                "guide {guide_id} does not belong to recommendation {recommendation_id}"
            ))
        })?;
        if guide.guide_type != ParentGuideType::Messaging {
            return Err(ModerationError::invalid_state(
                "feedback guides have no example message",
            ));
        }

        let dialogue = self.storage.get_dialogue().await?;
        let topic = self.session_topic().await?;
        Ok(example_generation(
            self.collaborators.clone(),
            Arc::clone(&self.storage),
            self.dyad.clone(),
            topic,
            dialogue,
            guide.clone(),
            recommendation_id,
        )
        .await?)
    }
}

/// Generates and persists one example message, routing through the static
/// template table while the dialogue is empty. Runs both inside speculative
/// tasks and on the synchronous fallback path.
async fn example_generation(
    collaborators: Collaborators,
    storage: Arc<dyn SessionStorage>,
    dyad: Dyad,
    topic: SessionTopicInfo,
    dialogue: Vec<DialogueMessage>,
    guide: ParentGuideElement,
    recommendation_id: Uuid,
) -> anyhow::Result<ParentExampleMessage> {
    let message = if dialogue.is_empty() {
        collaborators
            .static_guides
            .example_message(&topic, &dyad, &guide, recommendation_id)?
    } else {
        collaborators
            .example_generator
            .generate(dyad.locale, &dialogue, &guide, recommendation_id)
            .await?
    };
    storage.add_example_message(&message).await?;
    Ok(message)
}
