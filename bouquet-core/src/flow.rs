//! The four-stage creation flow.
//!
//! ```text
//! Pick(0) ──next*──▶ Customize(1) ──next──▶ Write(2) ──next──▶ Share(3)
//!    ◀──back──           ◀──back──             ◀──back──
//! ```
//!
//! `*` leaving `Pick` requires [`SessionStore::can_proceed`]. Navigation
//! never touches the composition.

use serde::{Deserialize, Serialize};

use crate::session::SessionStore;

/// One step of the creation flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Choose 6 to 10 flowers.
    #[default]
    Pick,
    /// Shuffle the arrangement and pick greenery.
    Customize,
    /// Write the card.
    Write,
    /// Preview, download and share.
    Share,
}

impl Stage {
    /// All stages in order.
    pub const ALL: [Self; 4] = [Self::Pick, Self::Customize, Self::Write, Self::Share];

    /// Zero-based position of this stage.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Pick => 0,
            Self::Customize => 1,
            Self::Write => 2,
            Self::Share => 3,
        }
    }

    /// Human-readable stage title.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pick => "Pick Flowers",
            Self::Customize => "Customize Bouquet",
            Self::Write => "Write Card",
            Self::Share => "Share",
        }
    }

    /// Whether this is the terminal stage.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Share)
    }

    const fn following(self) -> Self {
        match self {
            Self::Pick => Self::Customize,
            Self::Customize => Self::Write,
            Self::Write | Self::Share => Self::Share,
        }
    }

    const fn preceding(self) -> Self {
        match self {
            Self::Pick | Self::Customize => Self::Pick,
            Self::Write => Self::Customize,
            Self::Share => Self::Write,
        }
    }
}

/// Linear stepper over [`Stage`]s.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationFlow {
    stage: Stage,
}

impl CreationFlow {
    /// Start at [`Stage::Pick`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The active stage.
    #[must_use]
    pub const fn stage(&self) -> Stage {
        self.stage
    }

    /// Whether `next` would move forward.
    #[must_use]
    pub fn can_advance(&self, session: &SessionStore) -> bool {
        match self.stage {
            Stage::Pick => session.can_proceed(),
            Stage::Customize | Stage::Write => true,
            Stage::Share => false,
        }
    }

    /// Whether `back` would move backward.
    #[must_use]
    pub const fn can_go_back(&self) -> bool {
        !matches!(self.stage, Stage::Pick)
    }

    /// Advance one stage if allowed; returns the resulting stage.
    pub fn next(&mut self, session: &SessionStore) -> Stage {
        if self.can_advance(session) {
            let from = self.stage;
            self.stage = from.following();
            tracing::debug!("Flow {} -> {}", from.label(), self.stage.label());
        } else {
            tracing::debug!(
                "Flow advance blocked at {} ({} flowers)",
                self.stage.label(),
                session.total_flowers()
            );
        }
        self.stage
    }

    /// Step back one stage (stays at `Pick`); returns the resulting stage.
    pub fn back(&mut self) -> Stage {
        let from = self.stage;
        self.stage = from.preceding();
        if from != self.stage {
            tracing::debug!("Flow {} <- {}", self.stage.label(), from.label());
        }
        self.stage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{FlowerCatalogEntry, SizeClass};
    use crate::session::EntryParams;

    fn ready_session() -> SessionStore {
        let mut session = SessionStore::begin(EntryParams::default());
        let rose = FlowerCatalogEntry::new(1, "rose", SizeClass::Medium);
        for _ in 0..6 {
            session.add_flower(&rose);
        }
        session
    }

    #[test]
    fn stage_indices_and_labels() {
        for (i, stage) in Stage::ALL.iter().enumerate() {
            assert_eq!(stage.index(), i);
            assert!(!stage.label().is_empty());
        }
        assert!(Stage::Share.is_terminal());
        assert!(!Stage::Write.is_terminal());
    }

    #[test]
    fn pick_is_gated() {
        let session = SessionStore::begin(EntryParams::default());
        let mut flow = CreationFlow::new();
        assert!(!flow.can_advance(&session));
        assert_eq!(flow.next(&session), Stage::Pick);
    }

    #[test]
    fn later_stages_are_not_gated() {
        let mut session = ready_session();
        let mut flow = CreationFlow::new();
        assert_eq!(flow.next(&session), Stage::Customize);

        // Dropping below the minimum after Pick does not block progress.
        session.remove_flower(crate::catalog::FlowerId(1));
        assert_eq!(flow.next(&session), Stage::Write);
        assert_eq!(flow.next(&session), Stage::Share);
    }

    #[test]
    fn share_is_terminal() {
        let session = ready_session();
        let mut flow = CreationFlow::new();
        for _ in 0..10 {
            flow.next(&session);
        }
        assert_eq!(flow.stage(), Stage::Share);
        assert!(!flow.can_advance(&session));
    }

    #[test]
    fn back_stops_at_pick() {
        let mut flow = CreationFlow::new();
        assert!(!flow.can_go_back());
        assert_eq!(flow.back(), Stage::Pick);

        let session = ready_session();
        flow.next(&session);
        assert!(flow.can_go_back());
        assert_eq!(flow.back(), Stage::Pick);
    }
}
