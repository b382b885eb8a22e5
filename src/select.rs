//! Relevance selection — picks which saved snippets matter for a query.
//!
//! Delegates the actual ranking to the oracle: the prompt enumerates every
//! snippet by index and the completion is expected to be an index list.
//! Histories small enough to fit the result bound skip the oracle entirely.
//! Failures propagate — the engine owns the unranked fallback.

use tracing::debug;

use crate::error::AppError;
use crate::oracle::OracleProvider;
use crate::parse;
use crate::prompts;
use crate::store::Snippet;

/// Default bound on selected snippets.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// Return up to `max_results` snippets, most relevant first.
///
/// When the history has `max_results` or fewer snippets, all of them are
/// returned in original order without an oracle round trip — this
/// short-circuit is load-bearing, not cosmetic: it is what keeps small
/// histories free of external calls.
///
/// Otherwise the oracle ranks by index.  Out-of-range indices in the
/// completion are silently dropped (the oracle is allowed to be sloppy);
/// the result is truncated to `max_results` after validation.  Every
/// returned snippet is a clone drawn from `snippets` — nothing is
/// fabricated.
pub async fn select_relevant(
    oracle: &OracleProvider,
    query: &str,
    snippets: &[Snippet],
    max_results: usize,
) -> Result<Vec<Snippet>, AppError> {
    if snippets.len() <= max_results {
        debug!(
            count = snippets.len(),
            "history fits result bound, skipping relevance ranking"
        );
        return Ok(snippets.to_vec());
    }

    let prompt = prompts::relevance_prompt(query, snippets, max_results);
    let completion = oracle.complete(&prompt).await?;
    let indices = parse::parse_relevance_indices(&completion)?;

    let selected: Vec<Snippet> = indices
        .into_iter()
        .filter_map(|i| usize::try_from(i).ok())
        .filter(|&i| i < snippets.len())
        .map(|i| snippets[i].clone())
        .take(max_results)
        .collect();

    debug!(selected = selected.len(), total = snippets.len(), "relevance ranking complete");
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::DummyProvider;

    fn history(n: usize) -> Vec<Snippet> {
        (0..n)
            .map(|i| Snippet::test_fixture(&format!("s{i}"), vec![], vec![]))
            .collect()
    }

    fn dummy_oracle() -> (DummyProvider, OracleProvider) {
        let dummy = DummyProvider::new();
        let oracle = OracleProvider::Dummy(dummy.clone());
        (dummy, oracle)
    }

    #[tokio::test]
    async fn small_history_short_circuits_without_oracle_call() {
        let (dummy, oracle) = dummy_oracle();
        let snippets = history(3);
        let selected = select_relevant(&oracle, "query", &snippets, 5)
            .await
            .expect("select");
        assert_eq!(selected, snippets, "all snippets, original order");
        assert_eq!(dummy.calls(), 0, "oracle must not be consulted");
    }

    #[tokio::test]
    async fn ranks_by_returned_indices() {
        let (dummy, oracle) = dummy_oracle();
        dummy.enqueue("```json\n[4, 1, 0]\n```");
        let snippets = history(6);
        let selected = select_relevant(&oracle, "query", &snippets, 5)
            .await
            .expect("select");
        let ids: Vec<&str> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s4", "s1", "s0"]);
        assert_eq!(dummy.calls(), 1);
    }

    #[tokio::test]
    async fn out_of_range_indices_are_dropped() {
        let (dummy, oracle) = dummy_oracle();
        dummy.enqueue("[99, 2, -3, 5]");
        let snippets = history(6);
        let selected = select_relevant(&oracle, "query", &snippets, 5)
            .await
            .expect("select");
        let ids: Vec<&str> = selected.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s2", "s5"]);
    }

    #[tokio::test]
    async fn result_is_truncated_to_max_results() {
        let (dummy, oracle) = dummy_oracle();
        dummy.enqueue("[0, 1, 2, 3, 4, 5, 6]");
        let snippets = history(8);
        let selected = select_relevant(&oracle, "query", &snippets, 5)
            .await
            .expect("select");
        assert_eq!(selected.len(), 5);
    }

    #[tokio::test]
    async fn malformed_completion_propagates_parse_error() {
        let (dummy, oracle) = dummy_oracle();
        dummy.enqueue("these snippets look nice");
        let err = select_relevant(&oracle, "query", &history(6), 5)
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[tokio::test]
    async fn oracle_failure_propagates() {
        let (dummy, oracle) = dummy_oracle();
        dummy.enqueue_error(crate::oracle::OracleError::EmptyCompletion);
        let err = select_relevant(&oracle, "query", &history(6), 5)
            .await
            .expect_err("should fail");
        assert!(matches!(err, AppError::Oracle(_)));
    }
}
