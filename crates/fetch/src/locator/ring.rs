//! Fixed-size memory of recent search deltas.

/// The last [`DeltaRing::CAPACITY`] signed time deltas observed by the locator.
///
/// Slots start out as zero, so a first delta of zero already counts as seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DeltaRing {
    slots: [i64; Self::CAPACITY],
    next: usize,
}

impl DeltaRing {
    /// Number of deltas remembered.
    pub(crate) const CAPACITY: usize = 7;

    /// Returns `true` if `delta` is one of the remembered deltas.
    pub(crate) fn contains(&self, delta: i64) -> bool {
        self.slots.contains(&delta)
    }

    /// Remembers `delta`, evicting the oldest entry.
    pub(crate) const fn push(&mut self, delta: i64) {
        self.slots[self.next] = delta;
        self.next = (self.next + 1) % Self::CAPACITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_slots_are_zero() {
        let ring = DeltaRing::default();
        assert!(ring.contains(0));
        assert!(!ring.contains(13));
    }

    #[test]
    fn test_evicts_oldest() {
        let mut ring = DeltaRing::default();
        for delta in 1..=7 {
            ring.push(delta);
        }
        assert!(!ring.contains(0));
        assert!((1..=7).all(|delta| ring.contains(delta)));

        ring.push(8);
        assert!(!ring.contains(1));
        assert!(ring.contains(2));
        assert!(ring.contains(8));
    }
}
