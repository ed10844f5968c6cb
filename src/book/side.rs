//! One side of an order book

use super::PriceLevel;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// Which side of the book a level belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Bid,
    Ask,
}

/// An ordered set of price levels for one side of the book.
///
/// Backed by a map keyed by price so per-level upserts and deletes stay
/// sublinear at any depth. Invariants: no duplicate prices, no zero-size
/// levels. Traversal order is best-first: descending prices for bids,
/// ascending for asks.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    levels: BTreeMap<Decimal, Decimal>,
}

impl BookSide {
    /// Create an empty side
    pub fn new(side: Side) -> Self {
        Self {
            side,
            levels: BTreeMap::new(),
        }
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Discard all levels
    pub fn clear(&mut self) {
        self.levels.clear();
    }

    /// Replace the entire side with the given levels (snapshot path).
    /// Zero-size rows are dropped rather than stored.
    pub fn replace(&mut self, levels: &[(Decimal, Decimal)]) {
        self.levels.clear();
        for &(price, size) in levels {
            if !size.is_zero() {
                self.levels.insert(price, size);
            }
        }
    }

    /// Apply one `(price, size)` update (delta path): size zero removes
    /// the level (a no-op if absent), anything else upserts it.
    pub fn apply(&mut self, price: Decimal, size: Decimal) {
        if size.is_zero() {
            self.levels.remove(&price);
        } else {
            self.levels.insert(price, size);
        }
    }

    /// Size at a given price, if the level exists
    pub fn size_at(&self, price: Decimal) -> Option<Decimal> {
        self.levels.get(&price).copied()
    }

    /// Best level: highest bid or lowest ask
    pub fn best(&self) -> Option<(Decimal, Decimal)> {
        match self.side {
            Side::Bid => self.levels.iter().next_back(),
            Side::Ask => self.levels.iter().next(),
        }
        .map(|(&p, &s)| (p, s))
    }

    /// Materialize the side in traversal order with cumulative totals
    /// computed by a single forward scan.
    pub fn levels(&self) -> Vec<PriceLevel> {
        let ordered: Vec<(Decimal, Decimal)> = match self.side {
            Side::Bid => self.levels.iter().rev().map(|(&p, &s)| (p, s)).collect(),
            Side::Ask => self.levels.iter().map(|(&p, &s)| (p, s)).collect(),
        };

        let mut total = Decimal::ZERO;
        ordered
            .into_iter()
            .map(|(price, size)| {
                total += size;
                PriceLevel { price, size, total }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_bid_traversal_is_descending() {
        let mut side = BookSide::new(Side::Bid);
        side.replace(&[(dec!(99), dec!(3)), (dec!(100), dec!(2)), (dec!(98), dec!(1))]);

        let levels = side.levels();
        let prices: Vec<_> = levels.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(100), dec!(99), dec!(98)]);
    }

    #[test]
    fn test_ask_traversal_is_ascending() {
        let mut side = BookSide::new(Side::Ask);
        side.replace(&[(dec!(102), dec!(3)), (dec!(101), dec!(2)), (dec!(103), dec!(1))]);

        let levels = side.levels();
        let prices: Vec<_> = levels.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(101), dec!(102), dec!(103)]);
    }

    #[test]
    fn test_cumulative_totals_forward_scan() {
        let mut side = BookSide::new(Side::Bid);
        side.replace(&[(dec!(100), dec!(2)), (dec!(99), dec!(3)), (dec!(98), dec!(5))]);

        let levels = side.levels();
        let totals: Vec<_> = levels.iter().map(|l| l.total).collect();
        assert_eq!(totals, vec![dec!(2), dec!(5), dec!(10)]);
    }

    #[test]
    fn test_replace_drops_zero_sizes() {
        let mut side = BookSide::new(Side::Ask);
        side.replace(&[(dec!(101), dec!(1)), (dec!(102), dec!(0))]);
        assert_eq!(side.len(), 1);
        assert!(side.size_at(dec!(102)).is_none());
    }

    #[test]
    fn test_apply_upsert_and_update() {
        let mut side = BookSide::new(Side::Bid);
        side.apply(dec!(100), dec!(2));
        assert_eq!(side.size_at(dec!(100)), Some(dec!(2)));

        side.apply(dec!(100), dec!(7));
        assert_eq!(side.size_at(dec!(100)), Some(dec!(7)));
        assert_eq!(side.len(), 1);
    }

    #[test]
    fn test_apply_zero_removes() {
        let mut side = BookSide::new(Side::Bid);
        side.apply(dec!(100), dec!(2));
        side.apply(dec!(100), dec!(0));
        assert!(side.is_empty());
    }

    #[test]
    fn test_apply_zero_for_absent_price_is_noop() {
        let mut side = BookSide::new(Side::Bid);
        side.apply(dec!(100), dec!(2));

        side.apply(dec!(55), dec!(0));
        assert_eq!(side.len(), 1);
        assert_eq!(side.size_at(dec!(100)), Some(dec!(2)));
    }

    #[test]
    fn test_no_duplicate_prices_across_rescale() {
        // 100 and 100.0 are the same price; the map must hold one level.
        let mut side = BookSide::new(Side::Bid);
        side.apply(dec!(100), dec!(2));
        side.apply(dec!(100.0), dec!(3));
        assert_eq!(side.len(), 1);
        assert_eq!(side.size_at(dec!(100)), Some(dec!(3)));
    }

    #[test]
    fn test_best_bid_and_ask() {
        let mut bids = BookSide::new(Side::Bid);
        bids.replace(&[(dec!(99), dec!(3)), (dec!(100), dec!(2))]);
        assert_eq!(bids.best(), Some((dec!(100), dec!(2))));

        let mut asks = BookSide::new(Side::Ask);
        asks.replace(&[(dec!(102), dec!(3)), (dec!(101), dec!(2))]);
        assert_eq!(asks.best(), Some((dec!(101), dec!(2))));

        assert_eq!(BookSide::new(Side::Bid).best(), None);
    }
}
