use std::path::{Path, PathBuf};

use crate::backend::TextBackend;
use crate::corpus::{DocumentStore, has_extension};
use crate::matching::match_requirements;
use crate::requirements::extract_requirements;
use crate::{
    ComparisonResult, ComparisonRun, Config, CoreError, DEFAULT_EXTENSION, FailurePolicy,
    ProgressEvent, SkippedCandidate,
};

/// Knobs for a single comparison.
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Candidate extension, without the leading dot.
    pub extension: String,
    pub failure_policy: FailurePolicy,
    pub include_reference: bool,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            extension: DEFAULT_EXTENSION.to_string(),
            failure_policy: FailurePolicy::Skip,
            include_reference: true,
        }
    }
}

impl From<&Config> for CompareOptions {
    fn from(config: &Config) -> Self {
        Self {
            extension: config.extension.clone(),
            failure_policy: config.failure_policy,
            include_reference: config.include_reference,
        }
    }
}

/// How a candidate is recognised as the reference itself.
enum ReferenceId<'r> {
    /// Held by the store under this document name.
    Stored(&'r str),
    /// Outside the store; matched by canonical path.
    File(PathBuf),
}

/// Scores every candidate in a document store against one reference
/// document's requirements.
pub struct Comparator<'a> {
    backend: &'a dyn TextBackend,
    store: &'a dyn DocumentStore,
    options: CompareOptions,
}

impl<'a> Comparator<'a> {
    pub fn new(backend: &'a dyn TextBackend, store: &'a dyn DocumentStore) -> Self {
        Self {
            backend,
            store,
            options: CompareOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompareOptions) -> Self {
        self.options = options;
        self
    }

    /// Compare a reference document held by the store against the corpus.
    pub fn compare(
        &self,
        reference: &str,
        progress: impl Fn(ProgressEvent),
    ) -> Result<ComparisonRun, CoreError> {
        self.check_reference_name(reference)?;
        let path = self.store.resolve(reference)?;
        self.compare_resolved(reference, &path, ReferenceId::Stored(reference), progress)
    }

    /// Compare a reference document at an arbitrary path against the corpus.
    /// The file name stands in for the reference's document name; a candidate
    /// counts as the reference only if it resolves to the same file.
    pub fn compare_file(
        &self,
        path: &Path,
        progress: impl Fn(ProgressEvent),
    ) -> Result<ComparisonRun, CoreError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        self.check_reference_name(&name)?;
        if !path.is_file() {
            return Err(CoreError::NotFound(path.display().to_string()));
        }
        let canonical = std::fs::canonicalize(path)
            .map_err(|e| CoreError::io(format!("failed to resolve {}", path.display()), e))?;
        self.compare_resolved(&name, path, ReferenceId::File(canonical), progress)
    }

    fn check_reference_name(&self, reference: &str) -> Result<(), CoreError> {
        if reference.trim().is_empty() {
            return Err(CoreError::InvalidInput(
                "no reference document selected".to_string(),
            ));
        }
        if !has_extension(reference, &self.options.extension) {
            return Err(CoreError::InvalidInput(format!(
                "{reference} is not a .{} document",
                self.options.extension
            )));
        }
        Ok(())
    }

    fn compare_resolved(
        &self,
        reference: &str,
        path: &Path,
        id: ReferenceId<'_>,
        progress: impl Fn(ProgressEvent),
    ) -> Result<ComparisonRun, CoreError> {
        let reference_text =
            self.backend
                .extract_text(path)
                .map_err(|source| CoreError::Extraction {
                    document: reference.to_string(),
                    source,
                })?;
        let requirements = extract_requirements(&reference_text);

        let candidates: Vec<String> = self
            .store
            .list()?
            .into_iter()
            .filter(|name| has_extension(name, &self.options.extension))
            .filter(|name| self.options.include_reference || !self.is_reference(name, &id))
            .collect();
        let total = candidates.len();

        tracing::info!(
            reference,
            requirements = requirements.len(),
            candidates = total,
            "starting comparison"
        );
        progress(ProgressEvent::Started {
            reference: reference.to_string(),
            requirements: requirements.len(),
            candidates: total,
        });

        let mut results = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (index, name) in candidates.into_iter().enumerate() {
            progress(ProgressEvent::Checking {
                index,
                total,
                name: name.clone(),
            });

            let text = match self.candidate_text(&name) {
                Ok(text) => text,
                Err(err) => match self.options.failure_policy {
                    FailurePolicy::Abort => return Err(err),
                    FailurePolicy::Skip => {
                        tracing::warn!(candidate = %name, error = %err, "skipping candidate");
                        progress(ProgressEvent::Skipped {
                            index,
                            total,
                            name: name.clone(),
                            error: err.to_string(),
                        });
                        skipped.push(SkippedCandidate {
                            filename: name,
                            error: err.to_string(),
                        });
                        continue;
                    }
                },
            };

            let count = match_requirements(&text, &requirements);
            let result = ComparisonResult::new(name, count);
            tracing::debug!(
                candidate = %result.document_name,
                matched = result.matched_count,
                total = result.total_requirements,
                "scored candidate"
            );
            progress(ProgressEvent::Result {
                index,
                total,
                result: result.clone(),
            });
            results.push(result);
        }

        tracing::info!(
            reference,
            scored = results.len(),
            skipped = skipped.len(),
            "comparison complete"
        );
        Ok(ComparisonRun::new(
            reference,
            requirements.len(),
            results,
            skipped,
        ))
    }

    fn is_reference(&self, name: &str, id: &ReferenceId<'_>) -> bool {
        match id {
            ReferenceId::Stored(reference) => name == *reference,
            ReferenceId::File(canonical) => self
                .store
                .resolve(name)
                .ok()
                .and_then(|p| std::fs::canonicalize(p).ok())
                .is_some_and(|p| p == *canonical),
        }
    }

    fn candidate_text(&self, name: &str) -> Result<String, CoreError> {
        let path = self.store.resolve(name)?;
        self.backend
            .extract_text(&path)
            .map_err(|source| CoreError::Extraction {
                document: name.to_string(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MemoryStore, MockBackend};
    use std::sync::Mutex;

    fn corpus() -> (MockBackend, MemoryStore) {
        let backend = MockBackend::new()
            .with_text("ref.pdf", "Req A\nReq B\n\nReq A\n")
            .with_text("one.pdf", "...contains Req A somewhere...")
            .with_text("two.pdf", "Req B and Req A")
            .with_text("notes.txt", "Req A Req B");
        let store = MemoryStore::new(["two.pdf", "notes.txt", "ref.pdf", "one.pdf"]);
        (backend, store)
    }

    #[test]
    fn scores_candidates_in_listing_order() {
        let (backend, store) = corpus();
        let run = Comparator::new(&backend, &store)
            .compare("ref.pdf", |_| {})
            .unwrap();

        assert_eq!(run.reference, "ref.pdf");
        assert_eq!(run.requirements, 3);
        let names: Vec<_> = run.results.iter().map(|r| r.document_name.as_str()).collect();
        assert_eq!(names, vec!["two.pdf", "ref.pdf", "one.pdf"]);

        let one = &run.results[2];
        assert_eq!((one.matched_count, one.total_requirements), (2, 3));
        assert!((one.match_percentage - 66.67).abs() < 0.01);

        let two = &run.results[0];
        assert_eq!(two.matched_count, 3);
        assert_eq!(two.match_percentage, 100.0);
        assert!(run.skipped.is_empty());
    }

    #[test]
    fn exclude_reference_drops_self_comparison() {
        let (backend, store) = corpus();
        let run = Comparator::new(&backend, &store)
            .with_options(CompareOptions {
                include_reference: false,
                ..CompareOptions::default()
            })
            .compare("ref.pdf", |_| {})
            .unwrap();
        assert!(run.results.iter().all(|r| r.document_name != "ref.pdf"));
        assert_eq!(run.results.len(), 2);
    }

    #[test]
    fn requirement_count_survives_when_every_candidate_fails() {
        let backend = MockBackend::new()
            .with_text("ref.pdf", "Req A\nReq B")
            .with_failure("bad.pdf", "encrypted");
        let store = MemoryStore::new(["bad.pdf", "ref.pdf"]);
        let run = Comparator::new(&backend, &store)
            .with_options(CompareOptions {
                include_reference: false,
                ..CompareOptions::default()
            })
            .compare("ref.pdf", |_| {})
            .unwrap();
        assert!(run.results.is_empty());
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.requirements, 2);
    }

    #[test]
    fn empty_reference_scores_zero() {
        let backend = MockBackend::new()
            .with_text("ref.pdf", "")
            .with_text("a.pdf", "whatever");
        let store = MemoryStore::new(["ref.pdf", "a.pdf"]);
        let run = Comparator::new(&backend, &store)
            .compare("ref.pdf", |_| {})
            .unwrap();
        for r in &run.results {
            assert_eq!((r.matched_count, r.total_requirements), (0, 0));
            assert_eq!(r.match_percentage, 0.0);
        }
    }

    #[test]
    fn rejects_bad_reference_selection() {
        let (backend, store) = corpus();
        let cmp = Comparator::new(&backend, &store);
        assert!(matches!(cmp.compare("", |_| {}), Err(CoreError::InvalidInput(_))));
        assert!(matches!(cmp.compare("  ", |_| {}), Err(CoreError::InvalidInput(_))));
        assert!(matches!(
            cmp.compare("notes.txt", |_| {}),
            Err(CoreError::InvalidInput(_))
        ));
        assert!(matches!(
            cmp.compare("missing.pdf", |_| {}),
            Err(CoreError::NotFound(_))
        ));
        assert_eq!(backend.call_count(), 0);
    }

    #[test]
    fn reference_extraction_failure_is_fatal() {
        let backend = MockBackend::new()
            .with_failure("ref.pdf", "encrypted")
            .with_text("a.pdf", "x");
        let store = MemoryStore::new(["ref.pdf", "a.pdf"]);
        let err = Comparator::new(&backend, &store)
            .compare("ref.pdf", |_| {})
            .unwrap_err();
        match err {
            CoreError::Extraction { document, .. } => assert_eq!(document, "ref.pdf"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn skip_policy_records_failed_candidates() {
        let backend = MockBackend::new()
            .with_text("ref.pdf", "Req A")
            .with_failure("bad.pdf", "corrupt xref table")
            .with_text("good.pdf", "Req A");
        let store = MemoryStore::new(["bad.pdf", "good.pdf", "ref.pdf"]);

        let events = Mutex::new(Vec::new());
        let run = Comparator::new(&backend, &store)
            .compare("ref.pdf", |e| events.lock().unwrap().push(e))
            .unwrap();

        assert_eq!(run.results.len(), 2);
        assert_eq!(run.skipped.len(), 1);
        assert_eq!(run.skipped[0].filename, "bad.pdf");
        assert!(run.skipped[0].error.contains("corrupt xref table"));

        let events = events.into_inner().unwrap();
        assert!(matches!(
            events.first(),
            Some(ProgressEvent::Started { candidates: 3, requirements: 1, .. })
        ));
        assert!(events.iter().any(|e| matches!(
            e,
            ProgressEvent::Skipped { index: 0, total: 3, name, .. } if name == "bad.pdf"
        )));
        let result_events = events
            .iter()
            .filter(|e| matches!(e, ProgressEvent::Result { .. }))
            .count();
        assert_eq!(result_events, 2);
    }

    #[test]
    fn abort_policy_fails_the_run() {
        let backend = MockBackend::new()
            .with_text("ref.pdf", "Req A")
            .with_failure("bad.pdf", "corrupt")
            .with_text("good.pdf", "Req A");
        let store = MemoryStore::new(["bad.pdf", "good.pdf", "ref.pdf"]);
        let err = Comparator::new(&backend, &store)
            .with_options(CompareOptions {
                failure_policy: FailurePolicy::Abort,
                ..CompareOptions::default()
            })
            .compare("ref.pdf", |_| {})
            .unwrap_err();
        assert!(matches!(err, CoreError::Extraction { ref document, .. } if document == "bad.pdf"));
    }

    #[test]
    fn bounds_hold_for_every_result() {
        let (backend, store) = corpus();
        let run = Comparator::new(&backend, &store)
            .compare("ref.pdf", |_| {})
            .unwrap();
        for r in &run.results {
            assert!(r.matched_count <= r.total_requirements);
            assert!((0.0..=100.0).contains(&r.match_percentage));
        }
    }
}
