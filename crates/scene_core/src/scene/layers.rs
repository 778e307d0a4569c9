//! Visibility/pick channels

use serde::{Deserialize, Serialize};

/// 32 membership channels packed in a bit mask.
///
/// A node is rendered by a camera (or hit by a raycaster) only when the two
/// masks share at least one channel. New nodes belong to channel 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layers {
    /// Raw membership bits
    pub mask: u32,
}

impl Default for Layers {
    fn default() -> Self {
        Self { mask: 1 }
    }
}

const fn bit(channel: u32) -> u32 {
    match 1u32.checked_shl(channel) {
        Some(b) => b,
        None => 0,
    }
}

impl Layers {
    /// Membership in channel 0 only
    #[must_use]
    pub const fn new() -> Self {
        Self { mask: 1 }
    }

    /// Membership from a raw mask
    #[must_use]
    pub const fn from_mask(mask: u32) -> Self {
        Self { mask }
    }

    /// Membership in exactly `channel`
    pub fn set(&mut self, channel: u32) -> &mut Self {
        self.mask = bit(channel);
        self
    }

    /// Join `channel`
    pub fn enable(&mut self, channel: u32) -> &mut Self {
        self.mask |= bit(channel);
        self
    }

    /// Join every channel
    pub fn enable_all(&mut self) -> &mut Self {
        self.mask = u32::MAX;
        self
    }

    /// Flip membership of `channel`
    pub fn toggle(&mut self, channel: u32) -> &mut Self {
        self.mask ^= bit(channel);
        self
    }

    /// Leave `channel`
    pub fn disable(&mut self, channel: u32) -> &mut Self {
        self.mask &= !bit(channel);
        self
    }

    /// Leave every channel
    pub fn disable_all(&mut self) -> &mut Self {
        self.mask = 0;
        self
    }

    /// Whether the two sets share a channel
    #[must_use]
    pub const fn test(&self, other: &Self) -> bool {
        self.mask & other.mask != 0
    }

    /// Whether `channel` is enabled
    #[must_use]
    pub const fn is_enabled(&self, channel: u32) -> bool {
        self.mask & bit(channel) != 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_channel_zero() {
        let layers = Layers::default();
        assert!(layers.is_enabled(0));
        assert!(!layers.is_enabled(1));
    }

    #[test]
    fn test_channel_operations() {
        let mut a = Layers::new();
        a.set(3);
        assert_eq!(a.mask, 0b1000);

        let mut b = Layers::new();
        assert!(!a.test(&b));
        b.enable(3);
        assert!(a.test(&b));

        b.toggle(3).disable(0);
        assert_eq!(b.mask, 0);
        b.enable_all();
        assert!(b.is_enabled(31));
        b.disable_all();
        assert!(!b.test(&Layers::from_mask(u32::MAX)));
    }

    #[test]
    fn test_out_of_range_channel_is_ignored() {
        let mut layers = Layers::new();
        layers.enable(40);
        assert_eq!(layers.mask, 1);
        assert!(!layers.is_enabled(40));
    }
}
