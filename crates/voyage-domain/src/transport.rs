//! Transport module - kinds of transit and the user's preference over them

use std::fmt;

/// Kind of transport a route segment uses
///
/// Only [`TransportKind::Train`], [`TransportKind::Plane`] and
/// [`TransportKind::Bus`] can be preferred by the user; the others only show
/// up in search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TransportKind {
    /// Intercity or suburban bus
    Bus,

    /// Any rail service
    Train,

    /// Scheduled flight
    Plane,

    /// Ferry or river boat
    Ship,

    /// Walking transfer
    Walk,
}

impl TransportKind {
    /// Kinds the user can express a preference for, in diversification order
    pub const PREFERABLE: [TransportKind; 3] =
        [TransportKind::Train, TransportKind::Plane, TransportKind::Bus];

    /// Get the wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportKind::Bus => "bus",
            TransportKind::Train => "train",
            TransportKind::Plane => "plane",
            TransportKind::Ship => "ship",
            TransportKind::Walk => "walk",
        }
    }

    /// Parse a kind from its wire name (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "bus" => Some(TransportKind::Bus),
            "train" | "suburban" => Some(TransportKind::Train),
            "plane" => Some(TransportKind::Plane),
            "ship" | "water" => Some(TransportKind::Ship),
            "walk" => Some(TransportKind::Walk),
            _ => None,
        }
    }

    /// Whether the user can select this kind as a preference
    pub fn is_preferable(&self) -> bool {
        Self::PREFERABLE.contains(self)
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TransportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid transport kind: {}", s))
    }
}

/// Selection flags over the preferable transport kinds
///
/// All kinds start unselected. When nothing is selected, no filtering of
/// search results takes place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportPreference {
    train: bool,
    plane: bool,
    bus: bool,
}

impl TransportPreference {
    /// Preference with every kind unselected
    pub fn new() -> Self {
        Self::default()
    }

    /// Preference with exactly the given kinds selected
    pub fn only(kinds: &[TransportKind]) -> Self {
        let mut pref = Self::new();
        for kind in kinds {
            pref.set(*kind, true);
        }
        pref
    }

    /// Whether the kind is selected. Non-preferable kinds are never selected.
    pub fn is_selected(&self, kind: TransportKind) -> bool {
        match kind {
            TransportKind::Train => self.train,
            TransportKind::Plane => self.plane,
            TransportKind::Bus => self.bus,
            TransportKind::Ship | TransportKind::Walk => false,
        }
    }

    /// Set the flag for a kind; ignored for non-preferable kinds
    pub fn set(&mut self, kind: TransportKind, selected: bool) {
        match kind {
            TransportKind::Train => self.train = selected,
            TransportKind::Plane => self.plane = selected,
            TransportKind::Bus => self.bus = selected,
            TransportKind::Ship | TransportKind::Walk => {}
        }
    }

    /// True when at least one kind is selected
    pub fn any_selected(&self) -> bool {
        self.train || self.plane || self.bus
    }

    /// Selected kinds in diversification order
    pub fn selected(&self) -> Vec<TransportKind> {
        TransportKind::PREFERABLE
            .iter()
            .copied()
            .filter(|kind| self.is_selected(*kind))
            .collect()
    }

    /// Whether a segment of this kind survives the preference filter
    pub fn admits(&self, kind: TransportKind) -> bool {
        !self.any_selected() || self.is_selected(kind)
    }

    /// Flags as `(kind, selected)` pairs, in diversification order
    pub fn flags(&self) -> [(TransportKind, bool); 3] {
        [
            (TransportKind::Train, self.train),
            (TransportKind::Plane, self.plane),
            (TransportKind::Bus, self.bus),
        ]
    }
}
