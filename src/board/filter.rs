use crate::market::asset::Asset;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    term: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyCause {
    NoData,    // nothing loaded yet
    NoMatches, // data loaded, term matches none of it
}

impl FilterState {
    pub fn new(raw: &str) -> Self {
        Self {
            term: raw.trim().to_lowercase(),
        }
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn is_empty(&self) -> bool {
        self.term.is_empty()
    }

    pub fn apply<'a>(&self, snapshot: &'a [Asset]) -> Vec<&'a Asset> {
        if self.is_empty() {
            return snapshot.iter().collect();
        }
        snapshot.iter().filter(|a| a.matches(&self.term)).collect()
    }

    pub fn empty_cause(&self, visible_len: usize) -> Option<EmptyCause> {
        match (visible_len, self.is_empty()) {
            (0, true) => Some(EmptyCause::NoData),
            (0, false) => Some(EmptyCause::NoMatches),
            _ => None,
        }
    }
}
