/// Where the scanner currently is relative to a token.
///
/// Offsets are byte positions into the scanned group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Outside,
    Unquoted { start: usize },
    Quoted { start: usize },
}

/// Only the first double-quoted region of a group is captured as a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuoteCapture {
    Open,
    Held(String),
    Spent,
}

impl QuoteCapture {
    pub fn is_open(&self) -> bool {
        matches!(self, QuoteCapture::Open)
    }

    /// Hand out the captured token once, leaving the capture spent.
    pub fn take_held(&mut self) -> Option<String> {
        match std::mem::replace(self, QuoteCapture::Spent) {
            QuoteCapture::Held(token) => Some(token),
            _ => None,
        }
    }
}
