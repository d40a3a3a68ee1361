//! Client-side intent classification.

use regex::Regex;
use std::sync::OnceLock;

static STATS_PATTERN: OnceLock<Regex> = OnceLock::new();

fn stats_pattern() -> &'static Regex {
    STATS_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?i)similar cases|how (do|did)|statistics|usually turn out|outcome|dismissed|convicted|acquitted",
        )
        .expect("stats intent pattern is valid")
    })
}

/// Whether the user is asking about outcomes of similar cases.
///
/// Drives the "analyzing" placeholder and the `wantsStats` request flag.
pub fn wants_stats(text: &str) -> bool {
    stats_pattern().is_match(text)
}
