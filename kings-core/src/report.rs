//! Markdown rendering of the finished report.
//!
//! Consumes the per-chapter synopsis sequence and the finalized aggregate;
//! performs no merging or sorting of its own. Layout concerns beyond plain
//! Markdown (right-to-left direction, styling) are out of scope.

use crate::aggregate::{AggregateReport, MergedEntity};
use crate::summary::ChapterSummary;

const DEFAULT_TITLE: &str = "ספר מלכים - סיכומי פרקים";

/// Renders chapter summaries and the entity cross-reference as Markdown.
pub struct ReportAssembler {
    title: String,
}

impl ReportAssembler {
    pub fn new() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Render the full document: title, chapter synopses in input order,
    /// then the character and place cross-references.
    pub fn assemble(&self, summaries: &[ChapterSummary], aggregate: &AggregateReport) -> String {
        let mut doc = String::new();

        doc.push_str(&format!("# {}\n", self.title));

        for summary in summaries {
            doc.push_str(&format!("\n## {}\n\n", summary.chapter));
            doc.push_str(summary.synopsis.trim_end());
            doc.push('\n');
        }

        self.push_entity_section(&mut doc, "דמויות", &aggregate.characters);
        self.push_entity_section(&mut doc, "מקומות", &aggregate.places);

        doc
    }

    fn push_entity_section(&self, doc: &mut String, heading: &str, entities: &[MergedEntity]) {
        if entities.is_empty() {
            return;
        }

        doc.push_str(&format!("\n## {heading}\n\n"));
        for entity in entities {
            doc.push_str(&format!(
                "- **{}**: {} ({})\n",
                entity.name,
                entity.descriptions.join("; "),
                entity.references.join(", ")
            ));
        }
    }
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summary::EntityMention;

    fn sample_summary() -> ChapterSummary {
        ChapterSummary {
            chapter: "מלכים א פרק א".to_string(),
            synopsis: "דוד המלך זקן ושלמה נמשח למלך.".to_string(),
            characters: vec![EntityMention {
                name: "דוד".to_string(),
                description: "מלך ישראל".to_string(),
            }],
            places: vec![],
        }
    }

    fn sample_aggregate() -> AggregateReport {
        AggregateReport {
            characters: vec![MergedEntity {
                name: "דוד".to_string(),
                descriptions: vec!["מלך ישראל".to_string(), "זקן ובא בימים".to_string()],
                references: vec![
                    "מלכים א פרק א".to_string(),
                    "מלכים א פרק ב".to_string(),
                ],
            }],
            places: vec![],
        }
    }

    #[test]
    fn test_document_structure() {
        let doc = ReportAssembler::new().assemble(&[sample_summary()], &sample_aggregate());

        assert!(doc.starts_with("# ספר מלכים - סיכומי פרקים\n"));
        assert!(doc.contains("## מלכים א פרק א\n"));
        assert!(doc.contains("דוד המלך זקן ושלמה נמשח למלך."));
        assert!(doc.contains("## דמויות\n"));
        assert!(doc.contains(
            "- **דוד**: מלך ישראל; זקן ובא בימים (מלכים א פרק א, מלכים א פרק ב)\n"
        ));
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let doc = ReportAssembler::new().assemble(
            &[sample_summary()],
            &AggregateReport {
                characters: vec![],
                places: vec![],
            },
        );

        assert!(!doc.contains("## דמויות"));
        assert!(!doc.contains("## מקומות"));
    }

    #[test]
    fn test_custom_title() {
        let doc = ReportAssembler::new()
            .with_title("מלכים ב")
            .assemble(&[], &AggregateReport { characters: vec![], places: vec![] });
        assert!(doc.starts_with("# מלכים ב\n"));
    }

    #[test]
    fn test_chapters_render_in_input_order() {
        let mut second = sample_summary();
        second.chapter = "מלכים א פרק ב".to_string();

        let doc = ReportAssembler::new().assemble(
            &[sample_summary(), second],
            &AggregateReport { characters: vec![], places: vec![] },
        );

        let first_pos = doc.find("## מלכים א פרק א").unwrap();
        let second_pos = doc.find("## מלכים א פרק ב").unwrap();
        assert!(first_pos < second_pos);
    }
}
