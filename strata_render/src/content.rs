// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Content kinds and their per-kind placement rules.

/// A fractional point inside an item's bounds (`0..=1` on each axis, origin
/// top-left).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// Horizontal fraction.
    pub x: f64,
    /// Vertical fraction.
    pub y: f64,
}

impl Anchor {
    /// Center of the top edge.
    pub const TOP_CENTER: Self = Self { x: 0.5, y: 0.0 };
    /// Center of the bounds.
    pub const CENTER: Self = Self { x: 0.5, y: 0.5 };
    /// Center of the bottom edge.
    pub const BOTTOM_CENTER: Self = Self { x: 0.5, y: 1.0 };
}

/// What an item shows. The layout engine never sees this; it only matters
/// when turning attributes into draw transforms.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// A text bubble.
    #[default]
    Text,
    /// A still image or sticker.
    Image,
    /// A video or animated image.
    Video,
    /// A voice message.
    Audio,
    /// A link preview card.
    Link,
    /// A centered system notice ("joined", "renamed the chat", ...).
    System,
    /// The typing indicator.
    Typing,
}

impl ContentKind {
    /// Point the item scales about.
    ///
    /// Bubbles grow from their bottom edge so they stay attached to the
    /// stack's baseline; media scales about its center; notices hang from
    /// their top edge.
    #[must_use]
    pub const fn anchor(self) -> Anchor {
        match self {
            Self::Text | Self::Audio | Self::Link => Anchor::BOTTOM_CENTER,
            Self::Image | Self::Video => Anchor::CENTER,
            Self::System | Self::Typing => Anchor::TOP_CENTER,
        }
    }

    /// Whether the item is drawn while it recedes behind the frontmost slot.
    ///
    /// The typing indicator only makes sense in focus.
    #[must_use]
    pub const fn shows_when_receding(self) -> bool {
        match self {
            Self::Text | Self::Image | Self::Video | Self::Audio | Self::Link | Self::System => {
                true
            }
            Self::Typing => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bubbles_anchor_to_their_baseline() {
        assert_eq!(ContentKind::Text.anchor(), Anchor::BOTTOM_CENTER);
        assert_eq!(ContentKind::Link.anchor(), Anchor::BOTTOM_CENTER);
        assert_eq!(ContentKind::Image.anchor(), Anchor::CENTER);
        assert_eq!(ContentKind::System.anchor(), Anchor::TOP_CENTER);
    }

    #[test]
    fn only_typing_hides_when_receding() {
        assert!(ContentKind::Video.shows_when_receding());
        assert!(!ContentKind::Typing.shows_when_receding());
    }
}
