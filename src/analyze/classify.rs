//! Classifier: routes a scored record to lead / review / drop.
//!
//! Precedence (first match wins):
//! 1. exclusion term in title + snippet → drop, whatever the score
//! 2. post-revenue AND geo AND score >= min_score_to_append → lead
//! 3. score >= min_score_to_review → review
//! 4. drop
//!
//! Auto-accepting needs two independent signals (revenue + geography); a single
//! strong keyword only reaches review.

use super::signals;
use crate::config::SignalConfig;
use crate::record::{Classification, ClassifiedRecord, ScoredRecord};

pub fn classify(scored: ScoredRecord, cfg: &SignalConfig) -> ClassifiedRecord {
    let ScoredRecord {
        record,
        score,
        signals: hits,
    } = scored;

    let excluded = signals::is_excluded(&record.title, &record.snippet, &cfg.exclude_terms);

    let classification = if excluded {
        Classification::Drop
    } else if hits.post_revenue && hits.geo && score >= cfg.min_score_to_append {
        Classification::Lead
    } else if score >= cfg.min_score_to_review {
        Classification::Review
    } else {
        Classification::Drop
    };

    ClassifiedRecord {
        record,
        score,
        signals: hits,
        classification,
        excluded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::scoring::score_record;
    use crate::analyze::test_support::config;
    use crate::record::CandidateRecord;

    fn run(title: &str) -> ClassifiedRecord {
        let cfg = config();
        let r = CandidateRecord::new(title, "").with_url("http://example.com");
        classify(score_record(&r, &cfg), &cfg)
    }

    #[test]
    fn lead_routing() {
        let c = run("Startup post-revenue in Chile");
        assert_eq!(c.classification, Classification::Lead);
        assert_eq!(c.score, 6);
    }

    #[test]
    fn review_missing_geo() {
        assert_eq!(run("Post-revenue startup expanding").classification, Classification::Review);
    }

    #[test]
    fn review_missing_postrevenue() {
        assert_eq!(run("Startup in Chile raises seed").classification, Classification::Review);
    }

    #[test]
    fn excluded_term_drop() {
        let c = run("Idea stage project in Chile");
        assert_eq!(c.classification, Classification::Drop);
        assert!(c.excluded);
    }

    #[test]
    fn exclusion_overrides_qualifying_score() {
        let c = run("Post-revenue hackathon winner in Chile");
        assert_eq!(c.score, 6);
        assert_eq!(c.classification, Classification::Drop);
    }

    #[test]
    fn fintech_penalty_meets_threshold_exactly() {
        let c = run("Fintech post-revenue in Brazil");
        assert_eq!(c.score, 4);
        assert_eq!(c.classification, Classification::Lead);
    }

    #[test]
    fn low_score_drops() {
        let c = run("Some unrelated news");
        assert_eq!(c.score, 0);
        assert_eq!(c.classification, Classification::Drop);
        assert!(!c.excluded);
    }

    #[test]
    fn both_signals_below_append_threshold_is_review() {
        let mut cfg = config();
        cfg.min_score_to_append = 7;
        let r = CandidateRecord::new("Startup post-revenue in Chile", "");
        let c = classify(score_record(&r, &cfg), &cfg);
        assert_eq!(c.classification, Classification::Review);
    }
}
