//! Profiles for UK Financial Conduct Authority documents.

use serde_json::{Map, Value};

use super::profile::{JurisdictionProfile, MainSectionRule, StartPage, ValidationRules};
use crate::config::PARSER_VERSION;
use crate::segmentation::{
    ClauseGrammar, ContentCleaning, EndRule, FixedMapping, HeadingScan, LineFilter, Numbering,
    PageTextCleaner, SectionRules, StartRule,
};
use crate::types::{ClauseType, RegulationCountry, SectionTarget};

/// Line endings of FG21/1 subsection headings and the full headings they
/// belong to. Wrapped headings only keep their last line next to the clause.
const FG21_SUBSECTIONS: &[(&str, &str)] = &[
    ("This Guidance", "This Guidance"),
    ("Our Principles for Businesses", "Our Principles for Businesses"),
    ("Treating Customers Fairly", "Treating Customers Fairly"),
    (
        "Monitoring firms’ treatment of vulnerable customers",
        "Monitoring firms’ treatment of vulnerable customers",
    ),
    (
        "that exist in the firm’s target market and customer base",
        "Understanding the nature and scale of characteristics of vulnerability that exist in the firm’s target market and customer base",
    ),
    (
        "consumer experience and outcomes",
        "Understanding the impact of vulnerability on the needs of consumers in their target market and customer base, by asking themselves what types of harm or disadvantage their customers may be vulnerable to, and how this might affect the consumer experience and outcomes",
    ),
    (
        "Examples of harm and disadvantage that firms should be alert to",
        "Examples of harm and disadvantage that firms should be alert to",
    ),
    (
        "Embedding the fair treatment of vulnerable consumers across",
        "Embedding the fair treatment of vulnerable consumers across the workforce",
    ),
    (
        "recognise and respond to a range of characteristics of vulnerability",
        "Ensuring frontline staff have the necessary skills and capability to recognise and respond to a range of characteristics of vulnerability",
    ),
    ("Encouraging disclosure", "Encouraging disclosure"),
    (
        "Recording and accessing information about consumers’ needs",
        "Recording and accessing information about consumers’ needs",
    ),
    (
        "dealing with vulnerable consumers",
        "Offering practical and emotional support to frontline staff dealing with vulnerable consumers",
    ),
    ("Product and service design", "Product and service design"),
    (
        "consumers",
        "Considering if features of products or services exploit vulnerable consumers",
    ),
    (
        "inflexibility that could result in harmful impacts",
        "Designing products and services that meet evolving needs and avoiding inflexibility that could result in harmful impacts",
    ),
    (
        "Designing sales processes that meet consumers’ needs",
        "Designing sales processes that meet consumers’ needs",
    ),
    (
        "and service design process",
        "Taking vulnerable consumers into account at all stages of the product and service design process",
    ),
    ("Idea generation", "Idea generation"),
    ("Development", "Development"),
    ("Testing", "Testing"),
    ("Launch", "Launch"),
    ("Review", "Review"),
    (
        "Products sold through intermediaries in distribution chains",
        "Products sold through intermediaries in distribution chains",
    ),
    ("Customer service", "Customer service"),
    (
        "vulnerable consumers to disclose their needs",
        "Setting up systems and processes in ways that support and enable vulnerable consumers to disclose their needs",
    ),
    (
        "needs of vulnerable consumers",
        "Delivering appropriate customer service that responds flexibly to the needs of vulnerable consumers",
    ),
    (
        "Telling consumers about the support available to them",
        "Telling consumers about the support available to them",
    ),
    (
        "Supporting decision-making and third party representation",
        "Supporting decision-making and third party representation",
    ),
    ("Third party representation", "Third party representation"),
    ("Specialist Support", "Specialist Support"),
    (
        "good customer service",
        "Putting in place systems and processes that support the delivery of good customer service",
    ),
    ("Communications", "Communications"),
    (
        "services are presented in ways that are understandable for consumers",
        "Ensuring all communications and information about products and services are presented in ways that are understandable for consumers",
    ),
    (
        "account of their needs",
        "Considering how to communicate with vulnerable consumers, taking account of their needs",
    ),
    (
        "needs of vulnerable consumers are not met",
        "Implementing appropriate processes to evaluate where the needs of vulnerable consumers are not met",
    ),
    ("Management information", "Management information"),
];

/// FCA Consumer Credit sourcebook (CONC).
///
/// Clauses carry their own R/G letter. CONC pages are segmented as
/// extracted; running headers are left in and skipped by the heading scan.
#[must_use]
pub fn conc_profile() -> JurisdictionProfile {
    JurisdictionProfile {
        parser_name: "UKFCACoNCParser".to_string(),
        document_type: "UK_FCA_CONC".to_string(),
        country: RegulationCountry::Uk,
        version: None,
        parser_version: PARSER_VERSION.to_string(),
        default_file_path: "data/regulations/uk/fca/CONC.pdf".into(),
        default_sections: vec![
            SectionTarget::new("5.2A", "Creditworthiness assessment"),
            SectionTarget::new("2.10", "Mental capacity guidance"),
            SectionTarget::new("7", "Arrears, default and recovery (including repossessions)"),
        ],
        start_page: StartPage::Configured,
        validation: ValidationRules::new(10, 5, &["CONC", "Consumer Credit"]),
        cleaner: None,
        sections: SectionRules::new(StartRule::Titled, EndRule::Heading)
            // Chapter 7 has no usable title line; its first subsection marks the start
            .with_anchor("7", r"^\s*7\.1\s+Application")
            .with_run_to_next_top_level("7"),
        grammar: ClauseGrammar::new(Numbering::Typed, ClauseType::Unknown)
            .with_cleaning(ContentCleaning::TrimLines),
        main_section: MainSectionRule::HeadingLookup,
        subsection: Box::new(HeadingScan::new(10, "CONC")),
        annotate_clauses: false,
        additional_info: Map::new(),
    }
}

/// FCA Finalised Guidance FG21/1 on the fair treatment of vulnerable customers.
#[must_use]
pub fn fg21_profile() -> JurisdictionProfile {
    let cleaner = PageTextCleaner::new(vec![
        LineFilter::prefix("FG21/1 Financial Conduct Authority"),
        LineFilter::ContainsAll(vec![
            "Financial Conduct Authority".to_string(),
            "Chapter".to_string(),
        ]),
        LineFilter::ShortPageNumber { max_len: 15 },
        LineFilter::exact("Pubref:007407"),
        LineFilter::contains("www.handbook.fca.org.uk"),
        LineFilter::prefix("Release"),
        LineFilter::prefix("n Release"),
    ]);

    let mut additional_info = Map::new();
    additional_info.insert("document_type".to_string(), Value::from("FG21/1"));
    additional_info.insert(
        "guidance_title".to_string(),
        Value::from("Fair treatment of vulnerable customers"),
    );

    JurisdictionProfile {
        parser_name: "UKFCAFg21Parser".to_string(),
        document_type: "UK_FCA_FG21".to_string(),
        country: RegulationCountry::Uk,
        version: Some(PARSER_VERSION.to_string()),
        parser_version: PARSER_VERSION.to_string(),
        default_file_path: "data/regulations/uk/fca/fg21-1.pdf".into(),
        default_sections: vec![
            SectionTarget::new("1", "Introduction"),
            SectionTarget::new("2", "Understanding the needs of vulnerable consumers"),
            SectionTarget::new("3", "Skills and capability of staff"),
            SectionTarget::new("4", "Taking practical action"),
            SectionTarget::new("5", "Monitoring and evaluation"),
            SectionTarget::new("Appendix1", "GDPR and DPA 2018 considerations"),
            SectionTarget::new("Appendix2", "Other obligations relevant to vulnerable consumers"),
        ],
        start_page: StartPage::Fixed(3),
        validation: ValidationRules::new(10, 5, &["FG21/1", "Finalised Guidance"])
            .with_lowercase_markers(&["vulnerable customers"]),
        cleaner: Some(cleaner),
        sections: SectionRules::new(StartRule::Chapter, EndRule::NextChapter),
        grammar: ClauseGrammar::new(Numbering::Dotted, ClauseType::Guidance)
            .with_type_suffix()
            .with_terminators([r"^Chapter\s+\d+", r"^Appendix"])
            .with_cleaning(ContentCleaning::DropNoise)
            .with_appendix_prefix("Appendix"),
        main_section: MainSectionRule::SectionTitle,
        subsection: Box::new(FixedMapping::new(5, true, FG21_SUBSECTIONS)),
        annotate_clauses: true,
        additional_info,
    }
}
