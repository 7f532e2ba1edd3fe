//! Order-preserving, address-keyed set of candidates.
//!
//! Responders repeat themselves: they answer every service type they own,
//! and they re-announce. The set keeps the first candidate seen for each
//! address and silently drops later ones without merging fields.

use std::collections::HashSet;

use crate::domain::candidate::Candidate;

/// Candidates in first-seen order, unique by address.
#[derive(Debug, Default)]
pub struct CandidateSet {
    seen: HashSet<String>,
    entries: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `candidate` unless its address is already present.
    ///
    /// Returns `true` if the candidate was added.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        if !self.seen.insert(candidate.address().to_string()) {
            return false;
        }
        self.entries.push(candidate);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Candidate> {
        self.entries.iter()
    }

    /// Consumes the set, returning candidates in insertion order.
    pub fn into_vec(self) -> Vec<Candidate> {
        self.entries
    }
}
