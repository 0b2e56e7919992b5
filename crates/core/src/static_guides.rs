//! Static parent guides for opening turns.
//!
//! The very first parent turn has no dialogue to condition a generator on, so
//! its guides and example messages come from a fixed template table instead.
//! Templates carry `{child_name}` and `{subtopic}` placeholders that are
//! substituted per dyad and session before anything is shown to the parent.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{
    Dyad, ParentExampleMessage, ParentGuideCategory, ParentGuideElement,
    ParentGuideRecommendationResult, UserLocale,
};
use crate::topic::{SessionTopicInfo, TopicCategory};

/// One template entry: a guide, its example utterance, and localized
/// renditions of both keyed by locale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticGuideInfo {
    /// Stable key a produced guide element carries so its example can be
    /// looked up later.
    pub key: String,
    pub category: ParentGuideCategory,
    pub guide: String,
    #[serde(default)]
    pub guide_localized: HashMap<UserLocale, String>,
    pub example: String,
    #[serde(default)]
    pub example_localized: HashMap<UserLocale, String>,
}

/// Template entries grouped by session topic category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticGuideTable {
    #[serde(default)]
    pub plan: Vec<StaticGuideInfo>,
    #[serde(default)]
    pub recall: Vec<StaticGuideInfo>,
    #[serde(default)]
    pub free: Vec<StaticGuideInfo>,
}

impl StaticGuideTable {
    fn for_category(&self, category: TopicCategory) -> &[StaticGuideInfo] {
        match category {
            TopicCategory::Plan => &self.plan,
            TopicCategory::Recall => &self.recall,
            TopicCategory::Free => &self.free,
        }
    }
}

fn substitute(template: &str, topic: &SessionTopicInfo, dyad: &Dyad) -> String {
    template
        .replace("{child_name}", &dyad.child_name)
        .replace("{subtopic}", topic.subject())
}

/// Produces opening-turn guides and their example messages from a template
/// table.
pub struct StaticGuideFactory {
    table: StaticGuideTable,
}

impl StaticGuideFactory {
    /// Builds the factory over the built-in template table.
    pub fn builtin() -> Self {
        Self {
            table: builtin_table(),
        }
    }

    /// Loads a template table from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref()).with_context(|| {
            format!(
                "Failed to read static guide table from {}",
                path.as_ref().display()
            )
        })?;
        let table = serde_json::from_str(&raw).context("Failed to parse static guide table")?;
        Ok(Self { table })
    }

    pub fn from_table(table: StaticGuideTable) -> Self {
        Self { table }
    }

    /// Builds the opening guide recommendation for `turn_id`.
    ///
    /// Every produced element keeps its template key, and non-canonical
    /// locales get a localized rendition when the table carries one.
    pub fn guide_recommendation(
        &self,
        topic: &SessionTopicInfo,
        dyad: &Dyad,
        turn_id: Uuid,
    ) -> ParentGuideRecommendationResult {
        let guides = self
            .table
            .for_category(topic.category)
            .iter()
            .map(|info| {
                let guide = substitute(&info.guide, topic, dyad);
                let mut element = ParentGuideElement::messaging(info.category, guide)
                    .with_static_key(info.key.clone());
                if !dyad.locale.is_canonical() {
                    if let Some(localized) = info.guide_localized.get(&dyad.locale) {
                        element = element.with_localized(substitute(localized, topic, dyad));
                    }
                }
                element
            })
            .collect();
        ParentGuideRecommendationResult::new(turn_id, guides)
    }

    /// Renders the example utterance for a static guide.
    ///
    /// Only guides that carry a template key can be expanded here; generated
    /// guides go through a [`crate::generators::ParentExampleGenerator`].
    pub fn example_message(
        &self,
        topic: &SessionTopicInfo,
        dyad: &Dyad,
        guide: &ParentGuideElement,
        recommendation_id: Uuid,
    ) -> Result<ParentExampleMessage> {
        let Some(key) = &guide.static_key else {
            bail!("Only guides with a template key can yield a static example message");
        };
        let info = self
            .table
            .for_category(topic.category)
            .iter()
            .find(|info| &info.key == key)
            .with_context(|| format!("No static guide template with key '{key}'"))?;
        let mut message = ParentExampleMessage::new(
            recommendation_id,
            guide.id,
            substitute(&info.example, topic, dyad),
        );
        if !dyad.locale.is_canonical() {
            if let Some(localized) = info.example_localized.get(&dyad.locale) {
                message = message.with_localized(substitute(localized, topic, dyad));
            }
        }
        Ok(message)
    }
}

fn entry(
    key: &str,
    category: ParentGuideCategory,
    guide: &str,
    guide_zh: &str,
    example: &str,
    example_zh: &str,
) -> StaticGuideInfo {
    StaticGuideInfo {
        key: key.to_string(),
        category,
        guide: guide.to_string(),
        guide_localized: HashMap::from([(UserLocale::SimplifiedChinese, guide_zh.to_string())]),
        example: example.to_string(),
        example_localized: HashMap::from([(UserLocale::SimplifiedChinese, example_zh.to_string())]),
    }
}

fn builtin_table() -> StaticGuideTable {
    StaticGuideTable {
        plan: vec![
            entry(
                "plan-intention",
                ParentGuideCategory::Intention,
                "Ask {child_name} what they want to do about {subtopic}.",
                "问问{child_name}想怎么安排{subtopic}。",
                "What do you want to do for {subtopic}?",
                "{subtopic}你想做什么呢？",
            ),
            entry(
                "plan-specification",
                ParentGuideCategory::Specification,
                "Ask one concrete question about {subtopic}, like when or where.",
                "就{subtopic}问一个具体的问题，比如时间或地点。",
                "Where should we go for {subtopic}?",
                "{subtopic}我们去哪里好呢？",
            ),
            entry(
                "plan-choice",
                ParentGuideCategory::Choice,
                "Offer {child_name} two simple options to choose between.",
                "给{child_name}两个简单的选项来选择。",
                "Shall we go to the park, or stay home and play?",
                "我们去公园，还是在家里玩？",
            ),
        ],
        recall: vec![
            entry(
                "recall-stimulate",
                ParentGuideCategory::Stimulate,
                "Invite {child_name} to think back to {subtopic}.",
                "请{child_name}回想一下{subtopic}。",
                "Do you remember {subtopic}?",
                "你还记得{subtopic}吗？",
            ),
            entry(
                "recall-share",
                ParentGuideCategory::Share,
                "Tell {child_name} one thing you remember about {subtopic}, then hand the turn over.",
                "先说一件你记得的关于{subtopic}的事，再把话题交给{child_name}。",
                "I really liked the ice cream we had. What did you like?",
                "我最喜欢我们吃的冰淇淋。你喜欢什么？",
            ),
            entry(
                "recall-specification",
                ParentGuideCategory::Specification,
                "Ask {child_name} about one concrete moment of {subtopic}.",
                "问问{child_name}在{subtopic}中印象最深的一个时刻。",
                "What did you like most about {subtopic}?",
                "{subtopic}里你最喜欢什么？",
            ),
        ],
        free: vec![
            entry(
                "free-intention",
                ParentGuideCategory::Intention,
                "Ask {child_name} what they would like to talk about.",
                "问问{child_name}想聊什么。",
                "What shall we talk about today, {child_name}?",
                "{child_name}，今天我们聊点什么呢？",
            ),
            entry(
                "free-share",
                ParentGuideCategory::Share,
                "Start with something small from your own day and invite {child_name} in.",
                "先分享你自己一天里的小事，邀请{child_name}加入。",
                "I saw a big dog on my way home today. Did you see anything fun?",
                "我今天回家路上看到一只大狗。你有看到好玩的吗？",
            ),
            entry(
                "free-emotion",
                ParentGuideCategory::Emotion,
                "Ask {child_name} how they are feeling right now.",
                "问问{child_name}现在的心情。",
                "How do you feel today, {child_name}?",
                "{child_name}，你今天感觉怎么样？",
            ),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ChildGender, ParentType};
    use std::io::Write;

    fn dyad(locale: UserLocale) -> Dyad {
        Dyad {
            id: Uuid::new_v4(),
            child_name: "Mina".to_string(),
            parent_type: ParentType::Mother,
            child_gender: ChildGender::Girl,
            locale,
        }
    }

    #[test]
    fn test_guide_recommendation_substitutes_placeholders() {
        let factory = StaticGuideFactory::builtin();
        let topic =
            SessionTopicInfo::with_subtopic(TopicCategory::Plan, "the weekend picnic", None);
        let turn_id = Uuid::new_v4();

        let result = factory.guide_recommendation(&topic, &dyad(UserLocale::English), turn_id);

        assert_eq!(result.turn_id, turn_id);
        assert_eq!(result.guides.len(), 3);
        assert!(
            result
                .guides
                .iter()
                .any(|g| g.guide.contains("the weekend picnic"))
        );
        assert!(result.guides.iter().any(|g| g.guide.contains("Mina")));
        for guide in &result.guides {
            assert!(guide.static_key.is_some());
            assert!(!guide.is_generated());
            assert!(!guide.guide.contains("{subtopic}"));
            assert!(!guide.guide.contains("{child_name}"));
        }
    }

    #[test]
    fn test_canonical_locale_gets_no_localized_guides() {
        let factory = StaticGuideFactory::builtin();
        let topic = SessionTopicInfo::new(TopicCategory::Free);

        let result =
            factory.guide_recommendation(&topic, &dyad(UserLocale::English), Uuid::new_v4());

        assert!(result.guides.iter().all(|g| g.guide_localized.is_none()));
    }

    #[test]
    fn test_localized_guides_substitute_placeholders_too() {
        let factory = StaticGuideFactory::builtin();
        let topic = SessionTopicInfo::with_subtopic(TopicCategory::Recall, "去动物园", None);

        let result = factory.guide_recommendation(
            &topic,
            &dyad(UserLocale::SimplifiedChinese),
            Uuid::new_v4(),
        );

        let localized: Vec<&str> = result
            .guides
            .iter()
            .filter_map(|g| g.guide_localized.as_deref())
            .collect();
        assert_eq!(localized.len(), 3);
        assert!(localized.iter().any(|text| text.contains("去动物园")));
        assert!(localized.iter().all(|text| !text.contains("{subtopic}")));
    }

    #[test]
    fn test_example_message_follows_guide_key() {
        let factory = StaticGuideFactory::builtin();
        let topic = SessionTopicInfo::with_subtopic(TopicCategory::Plan, "the zoo trip", None);
        let dyad = dyad(UserLocale::English);
        let recommendation = factory.guide_recommendation(&topic, &dyad, Uuid::new_v4());
        let guide = &recommendation.guides[0];

        let example = factory
            .example_message(&topic, &dyad, guide, recommendation.id)
            .unwrap();

        assert_eq!(example.recommendation_id, recommendation.id);
        assert_eq!(example.guide_id, guide.id);
        assert!(example.message.contains("the zoo trip"));
        assert!(example.message_localized.is_none());
    }

    #[test]
    fn test_example_message_rejects_generated_guides() {
        let factory = StaticGuideFactory::builtin();
        let topic = SessionTopicInfo::new(TopicCategory::Free);
        let guide =
            ParentGuideElement::messaging(ParentGuideCategory::Share, "Share something small.");

        let result =
            factory.example_message(&topic, &dyad(UserLocale::English), &guide, Uuid::new_v4());

        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_reads_table_file() {
        let table = StaticGuideTable {
            plan: vec![entry(
                "plan-custom",
                ParentGuideCategory::Intention,
                "Ask {child_name} about {subtopic}.",
                "问问{child_name}关于{subtopic}。",
                "What about {subtopic}?",
                "{subtopic}怎么样？",
            )],
            recall: vec![],
            free: vec![],
        };
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(serde_json::to_string(&table).unwrap().as_bytes())
            .unwrap();

        let factory = StaticGuideFactory::from_path(file.path()).unwrap();
        let topic = SessionTopicInfo::with_subtopic(TopicCategory::Plan, "dinner", None);
        let result =
            factory.guide_recommendation(&topic, &dyad(UserLocale::English), Uuid::new_v4());

        assert_eq!(result.guides.len(), 1);
        assert_eq!(result.guides[0].static_key.as_deref(), Some("plan-custom"));
        assert_eq!(result.guides[0].guide, "Ask Mina about dinner.");
    }

    #[test]
    fn test_missing_category_entries_default_to_empty() {
        let factory = StaticGuideFactory::from_table(StaticGuideTable::default());
        let topic = SessionTopicInfo::new(TopicCategory::Recall);

        let result =
            factory.guide_recommendation(&topic, &dyad(UserLocale::English), Uuid::new_v4());

        assert!(result.guides.is_empty());
    }
}
