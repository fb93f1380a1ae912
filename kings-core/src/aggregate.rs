//! Cross-chapter entity aggregation.
//!
//! Folds the characters and places mentioned across an ordered sequence of
//! chapter summaries into one record per name. Characters and places are
//! disjoint namespaces; the same name may appear in both.

use crate::summary::ChapterSummary;
use serde::Serialize;
use std::collections::HashMap;

/// The merged cross-chapter record for one character or place name.
///
/// `name` is the merge key and never changes. Descriptions keep first-seen
/// order and are deduplicated by exact string equality; references are
/// deduplicated and sorted at finalize time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MergedEntity {
    pub name: String,
    pub descriptions: Vec<String>,
    pub references: Vec<String>,
}

impl MergedEntity {
    fn new(name: &str, description: &str, reference: &str) -> Self {
        Self {
            name: name.to_string(),
            descriptions: vec![description.to_string()],
            references: vec![reference.to_string()],
        }
    }

    /// Record another mention: append-if-absent to both lists.
    fn record(&mut self, description: &str, reference: &str) {
        if !self.descriptions.iter().any(|d| d == description) {
            self.descriptions.push(description.to_string());
        }
        if !self.references.iter().any(|r| r == reference) {
            self.references.push(reference.to_string());
        }
    }
}

/// The finalized, render-ready aggregate: entities sorted by name, each
/// entity's references sorted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateReport {
    pub characters: Vec<MergedEntity>,
    pub places: Vec<MergedEntity>,
}

/// Accumulates entity mentions across chapter summaries.
///
/// State is owned by the instance; a fresh aggregator starts empty.
#[derive(Debug, Default)]
pub struct EntityAggregator {
    characters: HashMap<String, MergedEntity>,
    places: HashMap<String, MergedEntity>,
}

impl EntityAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one chapter's mentions into the aggregate.
    ///
    /// Absorbing the same summary again is a no-op: every insertion is
    /// duplicate-checked.
    pub fn absorb(&mut self, summary: &ChapterSummary) {
        for mention in &summary.characters {
            upsert(
                &mut self.characters,
                &mention.name,
                &mention.description,
                &summary.chapter,
            );
        }
        for mention in &summary.places {
            upsert(
                &mut self.places,
                &mention.name,
                &mention.description,
                &summary.chapter,
            );
        }
    }

    /// Produce the sorted aggregate. Pure and repeatable: calling twice on
    /// the same absorbed state yields identical output.
    pub fn finalize(&self) -> AggregateReport {
        AggregateReport {
            characters: sorted_entities(&self.characters),
            places: sorted_entities(&self.places),
        }
    }
}

fn upsert(map: &mut HashMap<String, MergedEntity>, name: &str, description: &str, reference: &str) {
    match map.get_mut(name) {
        Some(entity) => entity.record(description, reference),
        None => {
            map.insert(
                name.to_string(),
                MergedEntity::new(name, description, reference),
            );
        }
    }
}

fn sorted_entities(map: &HashMap<String, MergedEntity>) -> Vec<MergedEntity> {
    let mut entities: Vec<MergedEntity> = map
        .values()
        .map(|entity| {
            let mut entity = entity.clone();
            entity.references.sort();
            entity
        })
        .collect();
    entities.sort_by(|a, b| a.name.cmp(&b.name));
    entities
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::EntityMention;

    fn mention(name: &str, description: &str) -> EntityMention {
        EntityMention {
            name: name.to_string(),
            description: description.to_string(),
        }
    }

    fn summary(
        chapter: &str,
        characters: Vec<EntityMention>,
        places: Vec<EntityMention>,
    ) -> ChapterSummary {
        ChapterSummary {
            chapter: chapter.to_string(),
            synopsis: String::new(),
            characters,
            places,
        }
    }

    #[test]
    fn test_first_mention_creates_entity() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary(
            "chapter 1",
            vec![mention("Elijah", "prophet")],
            vec![],
        ));

        let report = aggregator.finalize();
        assert_eq!(report.characters.len(), 1);
        assert_eq!(report.characters[0].name, "Elijah");
        assert_eq!(report.characters[0].descriptions, vec!["prophet"]);
        assert_eq!(report.characters[0].references, vec!["chapter 1"]);
    }

    #[test]
    fn test_repeat_mention_dedups_description_keeps_both_references() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary(
            "chapter 1",
            vec![mention("Elijah", "prophet")],
            vec![],
        ));
        aggregator.absorb(&summary(
            "chapter 2",
            vec![mention("Elijah", "prophet")],
            vec![],
        ));

        let report = aggregator.finalize();
        assert_eq!(report.characters[0].descriptions, vec!["prophet"]);
        assert_eq!(
            report.characters[0].references,
            vec!["chapter 1", "chapter 2"]
        );
    }

    #[test]
    fn test_new_description_appends_in_first_seen_order() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary(
            "chapter 1",
            vec![mention("Elijah", "the Tishbite")],
            vec![],
        ));
        aggregator.absorb(&summary(
            "chapter 2",
            vec![mention("Elijah", "prophet of the Lord")],
            vec![],
        ));

        let report = aggregator.finalize();
        assert_eq!(
            report.characters[0].descriptions,
            vec!["the Tishbite", "prophet of the Lord"]
        );
    }

    #[test]
    fn test_absorbing_same_summary_twice_is_idempotent() {
        let s = summary(
            "chapter 1",
            vec![mention("Ahab", "king of Israel")],
            vec![mention("Samaria", "capital city")],
        );

        let mut once = EntityAggregator::new();
        once.absorb(&s);

        let mut twice = EntityAggregator::new();
        twice.absorb(&s);
        twice.absorb(&s);

        assert_eq!(once.finalize(), twice.finalize());
    }

    #[test]
    fn test_characters_and_places_are_disjoint_namespaces() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary(
            "chapter 1",
            vec![mention("Jezreel", "a man")],
            vec![mention("Jezreel", "a valley")],
        ));

        let report = aggregator.finalize();
        assert_eq!(report.characters.len(), 1);
        assert_eq!(report.places.len(), 1);
        assert_eq!(report.characters[0].descriptions, vec!["a man"]);
        assert_eq!(report.places[0].descriptions, vec!["a valley"]);
    }

    #[test]
    fn test_finalize_sorts_entities_by_name_and_references_within() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary("chapter B", vec![mention("Zed", "z")], vec![]));
        aggregator.absorb(&summary("chapter A", vec![mention("Abe", "a")], vec![]));
        aggregator.absorb(&summary("chapter C", vec![mention("Zed", "z2")], vec![]));

        let report = aggregator.finalize();
        let names: Vec<&str> = report.characters.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Abe", "Zed"]);
        // Zed was seen in B then C; references come out sorted either way.
        assert_eq!(report.characters[1].references, vec!["chapter B", "chapter C"]);
    }

    #[test]
    fn test_finalize_is_pure_and_repeatable() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary(
            "chapter 1",
            vec![mention("Elisha", "disciple")],
            vec![],
        ));

        assert_eq!(aggregator.finalize(), aggregator.finalize());
    }

    #[test]
    fn test_absorb_order_invisible_after_finalize() {
        let chapters = [
            summary("chapter 1", vec![mention("A", "d1")], vec![]),
            summary("chapter 2", vec![mention("A", "d1"), mention("B", "d2")], vec![]),
            summary("chapter 3", vec![mention("B", "d2")], vec![]),
        ];

        let mut forward = EntityAggregator::new();
        for s in &chapters {
            forward.absorb(s);
        }

        let mut shuffled = EntityAggregator::new();
        shuffled.absorb(&chapters[2]);
        shuffled.absorb(&chapters[0]);
        shuffled.absorb(&chapters[1]);

        assert_eq!(forward.finalize(), shuffled.finalize());
    }

    #[test]
    fn test_hebrew_names_sort_lexicographically() {
        let mut aggregator = EntityAggregator::new();
        aggregator.absorb(&summary(
            "מלכים א פרק יז",
            vec![mention("אליהו", "נביא"), mention("אחאב", "מלך ישראל")],
            vec![],
        ));

        let report = aggregator.finalize();
        let names: Vec<&str> = report.characters.iter().map(|e| e.name.as_str()).collect();
        // אחאב < אליהו: ח (U+05D7) sorts before ל (U+05DC).
        assert_eq!(names, vec!["אחאב", "אליהו"]);
    }
}
