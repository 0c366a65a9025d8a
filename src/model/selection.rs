use crate::config;

/// A tagged byte range. `mark` is where the selection was anchored and
/// `caret` where it was extended to, so `mark` may be past `caret`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selection {
    pub mark: u64,
    pub caret: u64,
    pub color: config::Color,
}

impl Selection {
    pub fn new(mark: u64, caret: u64, color: config::Color) -> Self {
        Selection { mark, caret, color }
    }

    /// (begin, end), both inclusive.
    pub fn span(&self) -> (u64, u64) {
        (std::cmp::min(self.mark, self.caret), std::cmp::max(self.mark, self.caret))
    }

    pub fn len(&self) -> u64 {
        let (begin, end) = self.span();
        end - begin + 1
    }

    pub fn includes(&self, addr: u64) -> bool {
        let (begin, end) = self.span();
        (begin..=end).contains(&addr)
    }
}
