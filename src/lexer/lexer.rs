use super::token::{QuoteCapture, ScanState};

/// Lazy argument scanner over one command group.
///
/// Unquoted runs of non-whitespace are yielded in order. The first
/// double-quoted region is captured verbatim and yielded last. A quote that
/// never closes is scanned again as an ordinary character.
pub struct Tokens<'a> {
    input: &'a str,
    pos: usize,
    capture: QuoteCapture,
}

impl<'a> Tokens<'a> {
    pub fn new(input: &'a str) -> Self {
        Tokens {
            input,
            pos: 0,
            capture: QuoteCapture::Open,
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    // A quote met inside a word only splits it when it opens a real region.
    fn opens_quote(&self, ch: char) -> bool {
        ch == '"' && self.capture.is_open() && self.input[self.pos + 1..].contains('"')
    }
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let mut state = ScanState::Outside;
        loop {
            match (state, self.peek()) {
                (ScanState::Outside, None) => return self.capture.take_held(),
                (ScanState::Outside, Some(ch)) if ch.is_whitespace() => {
                    self.pos += ch.len_utf8();
                }
                (ScanState::Outside, Some('"')) if self.capture.is_open() => {
                    self.pos += 1;
                    state = ScanState::Quoted { start: self.pos };
                }
                (ScanState::Outside, Some(_)) => {
                    state = ScanState::Unquoted { start: self.pos };
                }
                (ScanState::Unquoted { start }, None) => {
                    return Some(self.input[start..].to_string());
                }
                (ScanState::Unquoted { start }, Some(ch))
                    if ch.is_whitespace() || self.opens_quote(ch) =>
                {
                    return Some(self.input[start..self.pos].to_string());
                }
                (ScanState::Unquoted { .. }, Some(ch)) => {
                    self.pos += ch.len_utf8();
                }
                (ScanState::Quoted { start }, Some('"')) => {
                    self.capture = QuoteCapture::Held(self.input[start..self.pos].to_string());
                    self.pos += 1;
                    state = ScanState::Outside;
                }
                (ScanState::Quoted { .. }, Some(ch)) => {
                    self.pos += ch.len_utf8();
                }
                (ScanState::Quoted { start }, None) => {
                    // Unmatched quote: rewind onto it and rescan it as plain text.
                    self.capture = QuoteCapture::Spent;
                    self.pos = start - 1;
                    state = ScanState::Outside;
                }
            }
        }
    }
}
