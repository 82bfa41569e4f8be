//! The sentence evolution state machine.
//!
//! One sentence exists at a time. A proposed replacement is accepted only
//! if it appends exactly one word to the current sentence and does not end
//! in terminal punctuation. The empty sentence bootstraps: the first
//! non-empty proposal is accepted at any word count.

use crate::error::LedgerError;
use crate::store::SentenceStore;

const TERMINAL_PUNCTUATION: [char; 3] = ['.', '!', '?'];

/// Owns the single current sentence and enforces the evolution invariant.
///
/// Near-simultaneous proposals are last-write-wins; callers wanting
/// stronger ordering must hold their own exclusive guard around `propose`.
pub struct SentenceLedger {
    store: SentenceStore,
    current: String,
}

impl SentenceLedger {
    /// Open the ledger, restoring the persisted sentence if one exists.
    pub fn open(store: SentenceStore) -> Self {
        let current = store.load();
        Self { store, current }
    }

    /// The current sentence; empty string means "no sentence yet".
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Validate `candidate` against the current sentence and accept it.
    ///
    /// Validation order:
    /// 1. trimmed candidate must be non-empty
    /// 2. word count must equal the current count + 1 (skipped when the
    ///    current sentence is empty: bootstrap)
    /// 3. must not end in `.`, `!` or `?`
    ///
    /// On success the candidate is persisted before this returns; a persist
    /// failure leaves the in-memory sentence unchanged.
    pub fn propose(&mut self, candidate: &str) -> Result<String, LedgerError> {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            return Err(LedgerError::EmptyInput);
        }

        let got = candidate.split_whitespace().count();
        let prev = self.current.split_whitespace().count();
        if prev > 0 && got != prev + 1 {
            return Err(LedgerError::WordCountMismatch {
                expected: prev + 1,
                got,
            });
        }

        if candidate.ends_with(TERMINAL_PUNCTUATION) {
            return Err(LedgerError::TrailingPunctuation);
        }

        self.store.save(candidate)?;
        self.current = candidate.to_string();
        Ok(self.current.clone())
    }

    /// Discard the sentence and its persisted file. The next `propose`
    /// behaves as the bootstrap case.
    pub fn reset(&mut self) -> Result<(), LedgerError> {
        self.store.clear()?;
        self.current.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LedgerError;
    use crate::store::SentenceStore;

    fn ledger(dir: &tempfile::TempDir) -> SentenceLedger {
        SentenceLedger::open(SentenceStore::open(dir.path()))
    }

    #[test]
    fn bootstrap_accepts_any_word_count() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        let accepted = l.propose("down the rabbit hole").expect("bootstrap");
        assert_eq!(accepted, "down the rabbit hole");
        assert_eq!(l.current(), "down the rabbit hole");
    }

    #[test]
    fn accepts_exactly_one_appended_word() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        l.propose("the rabbit hole").expect("bootstrap");

        let accepted = l.propose("the rabbit hole goes").expect("append one word");
        assert_eq!(accepted, "the rabbit hole goes");
    }

    #[test]
    fn rejects_wrong_word_count_with_counts() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        l.propose("the rabbit hole goes").expect("bootstrap");

        let err = l.propose("the rabbit hole goes way deeper").unwrap_err();
        match err {
            LedgerError::WordCountMismatch { expected, got } => {
                assert_eq!(expected, 5);
                assert_eq!(got, 6);
            }
            other => panic!("expected WordCountMismatch, got {other:?}"),
        }
        assert_eq!(l.current(), "the rabbit hole goes");
    }

    #[test]
    fn rejects_trailing_punctuation_and_keeps_state() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        l.propose("the rabbit hole goes").expect("bootstrap");

        for bad in ["the rabbit hole goes deep.",
                    "the rabbit hole goes deep!",
                    "the rabbit hole goes deep?"] {
            let err = l.propose(bad).unwrap_err();
            assert!(matches!(err, LedgerError::TrailingPunctuation), "{bad}");
        }
        assert_eq!(l.current(), "the rabbit hole goes");
    }

    #[test]
    fn rejects_empty_and_whitespace_only_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        assert!(matches!(l.propose("").unwrap_err(), LedgerError::EmptyInput));
        assert!(matches!(l.propose("   \t\n ").unwrap_err(), LedgerError::EmptyInput));
    }

    #[test]
    fn word_count_collapses_whitespace_runs() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        l.propose("the   rabbit\t hole").expect("bootstrap");
        // current is 3 words despite the messy separators
        l.propose("the rabbit hole goes").expect("append");
    }

    #[test]
    fn bootstrap_still_rejects_punctuation() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        let err = l.propose("hello!").unwrap_err();
        assert!(matches!(err, LedgerError::TrailingPunctuation));
        assert_eq!(l.current(), "");
    }

    #[test]
    fn accepted_sentence_survives_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        {
            let mut l = ledger(&dir);
            l.propose("curiouser and curiouser").expect("bootstrap");
        }
        let l = ledger(&dir);
        assert_eq!(l.current(), "curiouser and curiouser");
    }

    #[test]
    fn reset_returns_ledger_to_bootstrap() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        l.propose("the rabbit hole goes").expect("bootstrap");
        l.reset().expect("reset");

        assert_eq!(l.current(), "");
        // any word count is accepted again
        l.propose("a completely different opening line").expect("bootstrap again");
    }

    #[test]
    fn spec_scenario_walkthrough() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut l = ledger(&dir);
        l.propose("the rabbit hole").expect("bootstrap");

        let accepted = l.propose("the rabbit hole goes").expect("valid append");
        assert_eq!(accepted, "the rabbit hole goes");

        let err = l.propose("the rabbit hole goes deep.").unwrap_err();
        assert!(matches!(err, LedgerError::TrailingPunctuation));
        assert_eq!(l.current(), "the rabbit hole goes");

        let err = l.propose("the rabbit hole goes way deeper").unwrap_err();
        assert!(matches!(err, LedgerError::WordCountMismatch { expected: 5, got: 6 }));
        assert_eq!(l.current(), "the rabbit hole goes");
    }
}
