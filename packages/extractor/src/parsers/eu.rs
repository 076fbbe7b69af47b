//! Profiles for European Banking Authority guidelines.

use serde_json::{Map, Value};

use super::profile::{JurisdictionProfile, MainSectionRule, StartPage, ValidationRules};
use crate::config::PARSER_VERSION;
use crate::segmentation::{
    ClauseGrammar, ContentCleaning, EndRule, FixedMapping, LineFilter, Numbering, PageTextCleaner,
    SectionRules, StartRule, TocGuard,
};
use crate::types::{ClauseType, RegulationCountry, SectionTarget};

/// Subsection heading endings in section 8 of EBA/GL/2020/06.
const EBA_SUBSECTIONS: &[(&str, &str)] = &[
    (
        "credit risk monitoring framework",
        "General provisions for the credit risk monitoring framework",
    ),
    (
        "monitoring framework",
        "General provisions for the credit risk monitoring framework",
    ),
    ("exposures and borrowers", "Monitoring of credit exposures and borrowers"),
    ("credit exposures and borrowers", "Monitoring of credit exposures and borrowers"),
    ("review of borrowers", "Regular credit review of borrowers"),
    ("credit review of borrowers", "Regular credit review of borrowers"),
    ("of covenants", "Monitoring of covenants"),
    ("monitoring of covenants", "Monitoring of covenants"),
    (
        "early warning indicators/watch lists in credit monitoring",
        "Use of early warning indicators/watch lists in credit monitoring",
    ),
    (
        "watch lists in credit monitoring",
        "Use of early warning indicators/watch lists in credit monitoring",
    ),
    (
        "escalation process on triggered EWIs",
        "Follow-up and escalation process on triggered EWIs",
    ),
    (
        "process on triggered EWIs",
        "Follow-up and escalation process on triggered EWIs",
    ),
];

/// EBA Guidelines on loan origination and monitoring (EBA/GL/2020/06).
///
/// Paragraphs are numbered consecutively across the whole document and are
/// all treated as rules.
#[must_use]
pub fn eba_gl_2020_06_profile() -> JurisdictionProfile {
    let cleaner = PageTextCleaner::new(vec![
        LineFilter::prefix("EBA/GL/2020/06"),
        LineFilter::ContainsShorterThan {
            needle: "European Banking Authority".to_string(),
            max_len: 50,
        },
        LineFilter::ShortPageNumber { max_len: 15 },
        LineFilter::contains("www.eba.europa.eu"),
        LineFilter::prefix("Publication"),
    ]);

    let mut additional_info = Map::new();
    additional_info.insert("document_type".to_string(), Value::from("EBA GL 2020/06"));
    additional_info.insert(
        "guidance_title".to_string(),
        Value::from("Guidelines on loan origination and monitoring"),
    );

    JurisdictionProfile {
        parser_name: "EUEBAGl202006Parser".to_string(),
        document_type: "EU_EBA_GL_2020_06".to_string(),
        country: RegulationCountry::Eu,
        version: Some(PARSER_VERSION.to_string()),
        parser_version: PARSER_VERSION.to_string(),
        default_file_path: "data/regulations/eu/eba/EBA GL 2020 06 Final Report on GL on loan origination and monitoring.pdf".into(),
        default_sections: vec![SectionTarget::new("8", "Monitoring framework")],
        start_page: StartPage::Fixed(1),
        validation: ValidationRules::new(
            20,
            10,
            &["EBA/GL/2020/06", "Guidelines", "European Banking Authority"],
        )
        .with_lowercase_markers(&["loan origination and monitoring"]),
        cleaner: Some(cleaner),
        sections: SectionRules::new(StartRule::TitledOptionalDot, EndRule::NextSection)
            // "8 Monitoring framework" also appears in the table of contents
            .with_toc_guard(TocGuard::new("8", 50, "240.")),
        grammar: ClauseGrammar::new(
            Numbering::Paragraph {
                min_digits: 2,
                max_digits: 3,
            },
            ClauseType::Rule,
        )
        .with_terminators([r"^Annex", r"^\d+\s+—", r"^{next}\.\s+"])
        .with_cleaning(ContentCleaning::DropNoise),
        main_section: MainSectionRule::SectionTitle,
        subsection: Box::new(FixedMapping::new(10, false, EBA_SUBSECTIONS)),
        annotate_clauses: false,
        additional_info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::{ClauseSegmenter, SectionLocator, SubsectionQuery};
    use crate::types::PageText;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toc_entry_is_skipped() {
        let profile = eba_gl_2020_06_profile();
        let pages = vec![
            PageText::new(3, "Contents\n8 Monitoring framework\n9 Annexes"),
            PageText::new(
                60,
                "8. Monitoring framework\n240. Institutions should have a robust framework\n241. The framework should cover all exposures",
            ),
            PageText::new(61, "242. Institutions should monitor\nAnnex 1 Templates"),
        ];
        let span = SectionLocator::new(&profile.sections)
            .locate(&pages, "8", "Monitoring framework")
            .unwrap()
            .unwrap();
        assert_eq!(span.pages, vec![60, 61]);

        let clauses = ClauseSegmenter::new(&profile.grammar).segment(&span.text, "8").unwrap();
        let ids: Vec<&str> = clauses.iter().map(|c| c.clause_id.as_str()).collect();
        assert_eq!(ids, vec!["240", "241", "242"]);
        assert!(clauses.iter().all(|c| c.clause_type == ClauseType::Rule));
        assert_eq!(clauses[2].content, "Institutions should monitor");
    }

    #[test]
    fn test_subsection_mapping_ignores_case() {
        let profile = eba_gl_2020_06_profile();
        let text = "240. text\nRegular Credit Review of Borrowers\n250. The review";
        let offset = text.find("250.").unwrap();
        let found = profile.subsection.subsection_name(&SubsectionQuery {
            section_text: text,
            offset,
        });
        assert_eq!(found.as_deref(), Some("Regular credit review of borrowers"));
    }

    #[test]
    fn test_cleaner_keeps_body_text() {
        let cleaner = eba_gl_2020_06_profile().cleaner.unwrap();
        let page = "EBA/GL/2020/06\nEuropean Banking Authority\n57\n240. Institutions should";
        assert_eq!(cleaner.clean(page), "240. Institutions should");
        let long = "The European Banking Authority expects institutions to apply these guidelines";
        assert_eq!(cleaner.clean(long), long);
    }
}
