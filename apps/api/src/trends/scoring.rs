//! Relevance scoring: word-overlap heuristic between a free-text briefing and
//! each trend, plus the auto-selection policy built on top of it.
//!
//! Pure functions, no I/O. Token matching is substring containment against the
//! concatenated record text, so short tokens can match inside longer words.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::trends::models::TrendRecord;

/// How many trends auto-selection pre-picks.
pub const AUTO_SELECT_LIMIT: usize = 6;
/// Bonus when the full trend name appears in the query.
const NAME_BONUS: u32 = 2;

/// Word characters, Latin-1 accented letters, and apostrophes.
static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\w\u{00C0}-\u{00FF}']+").expect("static word pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedTrend {
    pub name: String,
    pub score: u32,
}

/// Distinct lowercase tokens of `text`.
pub fn tokenize(text: &str) -> HashSet<String> {
    let lowered = text.to_lowercase();
    WORD_RE
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Scores one record against a query.
///
/// One point per distinct query token found in the lowercased record text,
/// plus `NAME_BONUS` if the lowercased name is contained in the lowercased query.
pub fn score(record: &TrendRecord, query: &str) -> u32 {
    let query = query.to_lowercase();
    let bag = record.fields().join(" ").to_lowercase();

    let overlap = tokenize(&query)
        .iter()
        .filter(|token| bag.contains(token.as_str()))
        .count() as u32;

    let bonus = if query.contains(&record.name.to_lowercase()) {
        NAME_BONUS
    } else {
        0
    };

    overlap + bonus
}

/// Scores every record and sorts by descending score. Ties keep load order.
pub fn rank(records: &[TrendRecord], query: &str) -> Vec<RankedTrend> {
    let mut ranked: Vec<RankedTrend> = records
        .iter()
        .map(|record| RankedTrend {
            name: record.name.clone(),
            score: score(record, query),
        })
        .collect();

    // sort_by is stable, which is what keeps ties in load order
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked
}

/// Pre-selects trends for a briefing.
///
/// Takes the top `AUTO_SELECT_LIMIT` distinct names by rank and keeps those
/// with a positive score. When none qualify, falls back to the first
/// `AUTO_SELECT_LIMIT` distinct names in load order. A repeated name keeps
/// its best-ranked entry and counts once toward the limit.
pub fn auto_select(records: &[TrendRecord], query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let scored: Vec<String> = rank(records, query)
        .into_iter()
        .filter(|r| seen.insert(r.name.clone()))
        .take(AUTO_SELECT_LIMIT)
        .filter(|r| r.score > 0)
        .map(|r| r.name)
        .collect();

    if !scored.is_empty() {
        return scored;
    }

    let mut seen = HashSet::new();
    records
        .iter()
        .map(|r| r.name.as_str())
        .filter(|name| seen.insert(*name))
        .take(AUTO_SELECT_LIMIT)
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trend(name: &str, description: &str) -> TrendRecord {
        TrendRecord {
            name: name.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_tokenize_keeps_accents_and_apostrophes() {
        let tokens = tokenize("Saúde, bem-estar e D'Ávila 2025!");
        for expected in ["saúde", "bem", "estar", "e", "d'ávila", "2025"] {
            assert!(tokens.contains(expected), "missing {expected}: {tokens:?}");
        }
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_tokenize_deduplicates() {
        assert_eq!(tokenize("ia IA Ia ia").len(), 1);
    }

    #[test]
    fn test_score_example_from_catalog() {
        let record = trend("IA Preditiva", "previsão de demanda");
        let s = score(&record, "quero usar ia preditiva");
        // "ia" and "preditiva" overlap, and the full name is in the query
        assert!(s >= 3, "score was {s}");
        assert_eq!(s, 4);
    }

    #[test]
    fn test_score_empty_query_is_zero_for_named_record() {
        assert_eq!(score(&trend("Metaverso", "mundos virtuais"), ""), 0);
    }

    #[test]
    fn test_score_empty_name_always_gets_bonus() {
        assert_eq!(score(&TrendRecord::default(), ""), 2);
    }

    #[test]
    fn test_score_counts_distinct_tokens_once() {
        let record = trend("Telemedicina", "consultas remotas");
        assert_eq!(score(&record, "consultas consultas CONSULTAS"), 1);
    }

    #[test]
    fn test_score_grows_with_more_matching_tokens() {
        let record = trend("Telemedicina", "consultas remotas por vídeo");
        let one = score(&record, "consultas");
        let two = score(&record, "consultas remotas");
        let three = score(&record, "consultas remotas vídeo");
        assert!(one < two && two < three);
    }

    #[test]
    fn test_score_matches_substrings_inside_longer_words() {
        // "ia" is found inside "fisioterapia"
        assert_eq!(score(&trend("Fisioterapia", ""), "ia"), 1);
    }

    #[test]
    fn test_score_is_case_insensitive() {
        let record = trend("Social Commerce", "VENDAS pelo INSTAGRAM");
        assert_eq!(score(&record, "instagram vendas"), 2);
    }

    #[test]
    fn test_rank_ties_keep_load_order() {
        let records = vec![trend("A", "x"), trend("B", "x y"), trend("C", "x")];
        let ranked = rank(&records, "x y");
        let names: Vec<&str> = ranked.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn test_auto_select_takes_top_six_by_score() {
        let records: Vec<TrendRecord> = (0..8)
            .map(|i| {
                let words: Vec<String> = (0..=i).map(|w| format!("w{w}")).collect();
                trend(&format!("T{i}"), &words.join(" "))
            })
            .collect();
        let query = "w0 w1 w2 w3 w4 w5 w6 w7";

        let selected = auto_select(&records, query);
        assert_eq!(selected, vec!["T7", "T6", "T5", "T4", "T3", "T2"]);
    }

    #[test]
    fn test_auto_select_ties_broken_by_load_order() {
        let records: Vec<TrendRecord> = (0..8).map(|i| trend(&format!("T{i}"), "alvo")).collect();
        let selected = auto_select(&records, "alvo");
        assert_eq!(selected, vec!["T0", "T1", "T2", "T3", "T4", "T5"]);
    }

    #[test]
    fn test_auto_select_keeps_only_positive_scores() {
        let records = vec![
            trend("Alfa", "nada"),
            trend("Beta", "clínica"),
            trend("Gama", "nada"),
            trend("Delta", "instagram"),
        ];
        let selected = auto_select(&records, "clínica instagram");
        assert_eq!(selected, vec!["Beta", "Delta"]);
    }

    #[test]
    fn test_auto_select_falls_back_to_load_order_when_nothing_scores() {
        let records: Vec<TrendRecord> = (0..9).map(|i| trend(&format!("T{i}"), "abc")).collect();
        let selected = auto_select(&records, "zzz");
        assert_eq!(selected, vec!["T0", "T1", "T2", "T3", "T4", "T5"]);
    }

    #[test]
    fn test_auto_select_fallback_on_small_dataset() {
        let records = vec![trend("A", ""), trend("B", "")];
        assert_eq!(auto_select(&records, ""), vec!["A", "B"]);
    }

    #[test]
    fn test_auto_select_empty_dataset_is_empty() {
        assert!(auto_select(&[], "qualquer coisa").is_empty());
        assert!(auto_select(&[], "").is_empty());
    }

    #[test]
    fn test_auto_select_collapses_duplicate_names() {
        let records = vec![trend("A", "alvo"), trend("A", "alvo"), trend("B", "alvo")];
        assert_eq!(auto_select(&records, "alvo"), vec!["A", "B"]);
    }

    #[test]
    fn test_auto_select_limit_counts_distinct_names() {
        let records: Vec<TrendRecord> = ["A", "A", "B", "C", "D", "E", "F"]
            .iter()
            .map(|n| trend(n, "x"))
            .collect();
        assert_eq!(
            auto_select(&records, "x"),
            vec!["A", "B", "C", "D", "E", "F"]
        );
    }

    #[test]
    fn test_auto_select_fallback_counts_distinct_names() {
        let records: Vec<TrendRecord> = ["T0", "T0", "T1", "T2", "T3", "T4", "T5", "T6"]
            .iter()
            .map(|n| trend(n, "abc"))
            .collect();
        assert_eq!(
            auto_select(&records, "zzz"),
            vec!["T0", "T1", "T2", "T3", "T4", "T5"]
        );
    }
}
