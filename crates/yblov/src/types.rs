use serde::{Deserialize, Serialize};

/// One row of the index page: a municipality and the link to its detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityRef {
    pub code: String,
    pub name: String,
    pub detail_url: String,
}

/// The three headline counts from the overview table of a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryCounts {
    pub registered: u64,
    pub envelopes: u64,
    pub valid: u64,
}

/// Votes per party, kept in first-seen document order.
///
/// The entry order of the first municipality processed doubles as the
/// canonical CSV column order for the whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyVotes {
    entries: Vec<(String, u64)>,
}

impl PartyVotes {
    /// Inserts or updates a party. A repeated name keeps its original
    /// position and takes the new count.
    pub fn insert(&mut self, name: String, votes: u64) {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = votes,
            None => self.entries.push((name, votes)),
        }
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Everything extracted from one municipality detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityResults {
    pub summary: SummaryCounts,
    pub votes: PartyVotes,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn party_votes_keep_insertion_order() {
        let mut votes = PartyVotes::default();
        votes.insert("B".to_string(), 2);
        votes.insert("A".to_string(), 1);
        votes.insert("C".to_string(), 3);

        assert_eq!(votes.names().collect::<Vec<_>>(), vec!["B", "A", "C"]);
        assert_eq!(votes.get("A"), Some(1));
        assert_eq!(votes.get("missing"), None);
    }

    #[test]
    fn repeated_party_updates_in_place() {
        let mut votes = PartyVotes::default();
        votes.insert("A".to_string(), 1);
        votes.insert("B".to_string(), 2);
        votes.insert("A".to_string(), 9);

        assert_eq!(votes.len(), 2);
        assert_eq!(votes.names().collect::<Vec<_>>(), vec!["A", "B"]);
        assert_eq!(votes.get("A"), Some(9));
    }
}
