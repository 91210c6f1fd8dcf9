use serde::{Deserialize, Serialize};

use crate::types::Signature;

/// Position range `[start, end)` of the slot-sorted history treated as "early".
///
/// Index 0 is normally the mint/initialisation transaction, so the default
/// window starts at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyWindow {
    pub start: usize,
    pub end: usize,
}

impl Default for EarlyWindow {
    fn default() -> Self {
        Self { start: 1, end: 500 }
    }
}

impl EarlyWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sort by slot ascending (stable) and keep the in-window positions.
    /// Lists shorter than the window simply yield fewer items.
    pub fn select(&self, mut signatures: Vec<Signature>) -> Vec<Signature> {
        signatures.sort_by_key(|s| s.slot);
        signatures
            .into_iter()
            .skip(self.start)
            .take(self.len())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(slots: &[u64]) -> Vec<Signature> {
        slots
            .iter()
            .map(|slot| Signature::new(format!("sig-{}", slot), *slot))
            .collect()
    }

    #[test]
    fn test_six_hundred_signatures_yield_indices_one_to_499() {
        let slots: Vec<u64> = (0..600).collect();
        let selected = EarlyWindow::default().select(history(&slots));

        assert_eq!(selected.len(), 499);
        assert_eq!(selected.first().unwrap().slot, 1);
        assert_eq!(selected.last().unwrap().slot, 499);
        assert!(selected.iter().all(|s| s.slot != 0));
    }

    #[test]
    fn test_unsorted_input_is_sorted_before_windowing() {
        let selected = EarlyWindow::default().select(history(&[5, 3, 4]));
        let slots: Vec<u64> = selected.iter().map(|s| s.slot).collect();
        assert_eq!(slots, vec![4, 5]);
    }

    #[test]
    fn test_short_lists_do_not_panic() {
        assert!(EarlyWindow::default().select(Vec::new()).is_empty());
        assert!(EarlyWindow::default().select(history(&[7])).is_empty());
    }

    #[test]
    fn test_descending_page_order_is_reversed() {
        let newest_first: Vec<u64> = (0..10).rev().collect();
        let selected = EarlyWindow::new(1, 4).select(history(&newest_first));
        let slots: Vec<u64> = selected.iter().map(|s| s.slot).collect();
        assert_eq!(slots, vec![1, 2, 3]);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let window = EarlyWindow::new(10, 5);
        assert!(window.is_empty());
        assert!(window.select(history(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12])).is_empty());
    }
}
