//! End-to-end validation with the real runners, local schema fixtures and an
//! HTML checker endpoint that cannot be reached.

mod common;

use common::test_helpers::{
    NITF_BODY, SchemaFixtures, UNREACHABLE_CHECKER, XHTML_WITH_BAD_MICRODATA,
    XHTML_WITH_MICRODATA, wrapper_with_content,
};
use newsml_validator::{
    Config, MediaType, Outcome, StandardName, ValidationOrchestrator, negotiate, render,
};

fn config(schemas: &SchemaFixtures) -> Config {
    let mut config = Config::default();
    config.schemas.newsml = Some(schemas.newsml_location());
    config.schemas.nitf = Some(schemas.nitf_location());
    config.network.html_validator_url = Some(UNREACHABLE_CHECKER.to_string());
    config.network.timeout_seconds = 2;
    config.network.retry_attempts = 0;
    config.validation.max_concurrent_runs = Some(4);
    config
}

fn story() -> String {
    let a1 = format!("{XHTML_WITH_MICRODATA}{NITF_BODY}");
    wrapper_with_content(&[("A1", a1.as_str()), ("A2", "")])
}

#[tokio::test]
async fn test_full_report_with_every_standard() {
    let schemas = SchemaFixtures::new();
    let orchestrator = ValidationOrchestrator::from_config(&config(&schemas)).unwrap();

    let report = orchestrator
        .run_param(story().as_bytes(), None)
        .await
        .unwrap();

    let summary: Vec<_> = report
        .iter()
        .map(|r| (r.standard, r.guid.as_deref(), r.outcome))
        .collect();
    assert_eq!(
        summary,
        vec![
            (StandardName::NewsML, None, Outcome::Passed),
            (StandardName::HTML, Some("A1"), Outcome::Inconclusive),
            (StandardName::HTML, Some("A2"), Outcome::NotApplicable),
            (StandardName::Microdata, Some("A1"), Outcome::Passed),
            (StandardName::Microdata, Some("A2"), Outcome::NotApplicable),
            (StandardName::NITF, Some("A1"), Outcome::Passed),
            (StandardName::NITF, Some("A2"), Outcome::NotApplicable),
        ]
    );

    let microdata = &report.results[3];
    assert_eq!(microdata.items.len(), 1);
    assert_eq!(
        microdata.items[0].item_type,
        vec!["http://schema.org/NewsArticle"]
    );
}

#[tokio::test]
async fn test_findings_are_attributed_to_the_offending_item() {
    let schemas = SchemaFixtures::new();
    let orchestrator = ValidationOrchestrator::from_config(&config(&schemas)).unwrap();
    let xml = wrapper_with_content(&[
        ("good", XHTML_WITH_MICRODATA),
        ("bad", XHTML_WITH_BAD_MICRODATA),
    ]);

    let report = orchestrator
        .run_param(xml.as_bytes(), Some("Microdata"))
        .await
        .unwrap();

    assert_eq!(report.len(), 2);
    assert_eq!(report.results[0].guid.as_deref(), Some("good"));
    assert_eq!(report.results[0].outcome, Outcome::Passed);
    assert_eq!(report.results[1].guid.as_deref(), Some("bad"));
    assert_eq!(report.results[1].outcome, Outcome::Failed);
}

#[tokio::test]
async fn test_wrapper_schema_violation_fails() {
    let schemas = SchemaFixtures::new();
    let orchestrator = ValidationOrchestrator::from_config(&config(&schemas)).unwrap();
    // newsItem without the required guid
    let xml = r#"<newsMessage xmlns="http://iptc.org/std/nar/2006-10-01/"><itemSet><newsItem/></itemSet></newsMessage>"#;

    let report = orchestrator
        .run_param(xml.as_bytes(), Some("NewsML"))
        .await
        .unwrap();

    assert_eq!(report.len(), 1);
    assert_eq!(report.results[0].outcome, Outcome::Failed);
    assert!(report.results[0].error_count() >= 1);
}

#[tokio::test]
async fn test_missing_schemas_are_inconclusive() {
    let mut config = Config::default();
    config.schemas.newsml = Some("/nonexistent/newsml.xsd".to_string());
    config.validation.max_concurrent_runs = Some(2);
    let orchestrator = ValidationOrchestrator::from_config(&config).unwrap();
    let xml = wrapper_with_content(&[("A1", NITF_BODY)]);

    let report = orchestrator
        .run_param(xml.as_bytes(), Some("NewsML,NITF"))
        .await
        .unwrap();

    let outcomes: Vec<_> = report.iter().map(|r| r.outcome).collect();
    assert_eq!(outcomes, vec![Outcome::Inconclusive, Outcome::Inconclusive]);
    assert!(report.iter().all(|r| r.note.is_some()));
}

#[tokio::test]
async fn test_report_renders_in_negotiated_media_type() {
    let schemas = SchemaFixtures::new();
    let orchestrator = ValidationOrchestrator::from_config(&config(&schemas)).unwrap();

    let report = orchestrator
        .run_param(story().as_bytes(), Some("NewsML,Microdata"))
        .await
        .unwrap();

    let headers = [("Host", "localhost"), ("accept", "application/xml")];
    let media_type = negotiate::select(negotiate::accept_header(headers));
    assert_eq!(media_type, MediaType::Xml);

    let xml = render(&report, media_type).unwrap();
    assert!(xml.contains("<validationReport>"));
    assert_eq!(xml.matches("<validation>").count(), 3);
    assert!(xml.contains("http://schema.org/NewsArticle"));

    let json = render(&report, negotiate::select(None)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["validation"].as_array().unwrap().len(), 3);
    assert_eq!(value["validation"][1]["item"][0]["property"][0]["name"], "headline");
}
