//! Live cache entities and their token inventories.

use std::collections::VecDeque;

use geocoin_core::{CellCoord, Token};

/// Container of tokens materialized for a single cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cache {
    cell: CellCoord,
    tokens: VecDeque<Token>,
}

impl Cache {
    /// Creates a cache holding `token_count` tokens minted in `cell` with
    /// serials `0..token_count`.
    #[must_use]
    pub fn new(cell: CellCoord, token_count: u32) -> Self {
        Self {
            cell,
            tokens: (0..token_count).map(|serial| Token::new(cell, serial)).collect(),
        }
    }

    /// Cell that owns the cache.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Tokens held by the cache, head first.
    pub fn tokens(&self) -> impl ExactSizeIterator<Item = &Token> {
        self.tokens.iter()
    }

    /// Number of tokens held by the cache.
    #[must_use]
    pub fn token_count(&self) -> u32 {
        u32::try_from(self.tokens.len()).unwrap_or(u32::MAX)
    }

    /// Reports whether the cache holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Removes the head token, if any.
    pub fn take_token(&mut self) -> Option<Token> {
        self.tokens.pop_front()
    }

    /// Appends a token to the back of the inventory.
    pub fn put_token(&mut self, token: Token) {
        self.tokens.push_back(token);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_cache_mints_sequential_serials() {
        let cell = CellCoord::new(2, -3);
        let cache = Cache::new(cell, 3);
        let serials: Vec<u32> = cache.tokens().map(Token::serial).collect();
        assert_eq!(serials, vec![0, 1, 2]);
        assert!(cache.tokens().all(|token| token.origin() == cell));
    }

    #[test]
    fn tokens_leave_in_fifo_order() {
        let mut cache = Cache::new(CellCoord::new(0, 0), 2);
        let foreign = Token::new(CellCoord::new(9, 9), 4);
        cache.put_token(foreign);

        assert_eq!(cache.take_token().map(|t| t.serial()), Some(0));
        assert_eq!(cache.take_token().map(|t| t.serial()), Some(1));
        assert_eq!(cache.take_token(), Some(foreign));
        assert_eq!(cache.take_token(), None);
        assert!(cache.is_empty());
    }
}
