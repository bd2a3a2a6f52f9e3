/// How many of a requirement set were found in one candidate text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchCount {
    pub matched: usize,
    pub total: usize,
}

impl MatchCount {
    pub fn percentage(&self) -> f64 {
        coverage_percentage(self.matched, self.total)
    }
}

/// Count the requirements that occur verbatim somewhere in `text`.
///
/// Each requirement is a presence test: exact, case- and whitespace-sensitive
/// substring containment. Duplicated requirements are counted once per entry,
/// and their position in the candidate does not matter.
pub fn match_requirements<S: AsRef<str>>(text: &str, requirements: &[S]) -> MatchCount {
    let matched = requirements
        .iter()
        .filter(|req| text.contains(req.as_ref()))
        .count();
    MatchCount {
        matched,
        total: requirements.len(),
    }
}

/// `matched / total * 100`, or `0.0` when there is nothing to match.
pub fn coverage_percentage(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (matched.min(total) as f64 / total as f64) * 100.0
}
