// tests/pipeline_scenarios.rs
//
// End-to-end scoring/routing/dedupe against the shipped config/sourcing.toml.

use std::path::Path;

use vc_lead_sourcing::{CandidateRecord, Classification, Pipeline, SignalConfig};

fn shipped_config() -> SignalConfig {
    let p = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/sourcing.toml");
    SignalConfig::from_path(&p).expect("shipped config loads")
}

fn pipeline() -> Pipeline {
    Pipeline::new(shipped_config())
}

fn rec(title: &str) -> CandidateRecord {
    CandidateRecord::new(title, "").with_url("http://example.com")
}

#[test]
fn chile_post_revenue_is_a_lead() {
    let out = pipeline().evaluate(&rec("Startup post-revenue in Chile"));
    assert_eq!(out.score, 6);
    assert_eq!(out.classification, Classification::Lead);
    assert!(out.signals.geo && out.signals.post_revenue);
}

#[test]
fn post_revenue_without_geo_goes_to_review() {
    let out = pipeline().evaluate(&rec("Post-revenue startup expanding"));
    assert_eq!(out.score, 3);
    assert_eq!(out.classification, Classification::Review);
}

#[test]
fn exclusion_term_forces_drop() {
    let out = pipeline().evaluate(&rec("Idea stage project in Chile"));
    assert_eq!(out.classification, Classification::Drop);
    assert!(out.excluded);
}

#[test]
fn fintech_penalty_still_meets_threshold() {
    let out = pipeline().evaluate(&rec("Fintech post-revenue in Brazil"));
    assert_eq!(out.score, 4);
    assert_eq!(out.classification, Classification::Lead);
}

#[test]
fn same_url_keeps_the_higher_score() {
    let out = pipeline().run(vec![
        // geo + female = 5 (review)
        CandidateRecord::new("Female founder startup in Chile", "").with_url("http://same"),
        // geo + post-revenue + enterprise = 7 (lead)
        CandidateRecord::new("Post-revenue B2B startup in Chile", "").with_url("http://same"),
    ]);
    assert_eq!(out.leads.len(), 1);
    assert_eq!(out.leads[0].score, 7);
    assert!(out.review.is_empty());
    assert_eq!(out.stats.duplicates_removed, 1);
}

#[cfg(feature = "fuzzy")]
#[test]
fn fuzzy_company_match_keeps_most_recent() {
    let out = pipeline().run(vec![
        rec("Startup post-revenue in Chile")
            .with_company("Acme Inc")
            .with_timestamp("2024-01-01"),
        CandidateRecord::new("Startup post-revenue in Chile", "")
            .with_url("http://other.example.com")
            .with_company("ACME, Inc.")
            .with_timestamp("2024-01-02"),
    ]);
    assert_eq!(out.leads.len(), 1);
    assert_eq!(out.leads[0].record.timestamp(), "2024-01-02");
    assert_eq!(out.leads[0].record.company(), "ACME, Inc.");
}

#[test]
fn scores_stay_within_bounds() {
    let p = pipeline();
    let everything = rec(
        "Post-revenue B2B SaaS enterprise in Chile, Brazil and Mexico, female founder, recurring revenue",
    );
    let penalty_only = rec("Fintech neobank");
    // 3 + 3 + 1 + 2; every positive category at once
    assert_eq!(p.evaluate(&everything).score, 9);
    assert_eq!(p.evaluate(&penalty_only).score, 0);
    assert_eq!(p.evaluate(&penalty_only).classification, Classification::Drop);
}

#[test]
fn every_excluded_record_is_dropped() {
    let p = pipeline();
    for title in [
        "Hackathon winners post-revenue in Chile",
        "Pre-revenue SaaS in Mexico",
        "Looking for co-founder, enterprise B2B in Peru",
    ] {
        let out = p.evaluate(&rec(title));
        assert_eq!(out.classification, Classification::Drop, "{title}");
        assert!(out.excluded, "{title}");
    }
}

#[test]
fn rerunning_survivors_is_idempotent() {
    let p = pipeline();
    let first = p.run(vec![
        rec("Startup post-revenue in Chile").with_timestamp("2024-01-01"),
        CandidateRecord::new("Post-revenue startup expanding", "").with_url("http://b"),
        CandidateRecord::new("Startup in Peru raises seed", "").with_url("http://c"),
        CandidateRecord::new("Startup in Peru raises seed", "").with_url("http://c"),
        CandidateRecord::new("Weather report", "").with_url("http://d"),
    ]);
    assert_eq!(first.stats.duplicates_removed, 1);

    let again: Vec<CandidateRecord> = first
        .leads
        .iter()
        .chain(first.review.iter())
        .map(|r| r.record.clone())
        .collect();
    let second = p.run(again);
    assert_eq!(second.leads, first.leads);
    assert_eq!(second.review, first.review);
    assert_eq!(second.stats.duplicates_removed, 0);
}

#[test]
fn exact_matcher_config_disables_fuzzy_company_match() {
    let mut cfg = shipped_config();
    cfg.dedupe.matcher = vc_lead_sourcing::config::MatcherKind::Exact;
    let out = Pipeline::new(cfg).run(vec![
        CandidateRecord::new("Startup post-revenue in Chile", "")
            .with_url("http://a")
            .with_company("Acme Inc"),
        CandidateRecord::new("Startup post-revenue in Chile", "")
            .with_url("http://b")
            .with_company("ACME, Inc."),
    ]);
    assert_eq!(out.leads.len(), 2);
}
