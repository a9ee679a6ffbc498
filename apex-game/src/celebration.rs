//! Post-race reward announcements followed by a narrative decision.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::decision::{Decision, DecisionCatalog, DecisionChoice};
use crate::profile::TrophyKind;
use crate::session::SessionError;

/// A reward announcement. Only DOTD, WDC and WCC are ever queued.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Celebration {
    pub kind: TrophyKind,
    pub cash: f64,
    pub skill_points: u32,
    pub tech_points: u32,
}

/// Rewards in trigger order.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CelebrationQueue {
    pending: VecDeque<Celebration>,
}

impl CelebrationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, celebration: Celebration) {
        self.pending.push_back(celebration);
    }

    pub fn pop(&mut self) -> Option<Celebration> {
        self.pending.pop_front()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<TrophyKind> {
        self.pending.iter().map(|c| c.kind).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Celebration> {
        self.pending.iter()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PostRaceStage {
    Celebrating(Celebration),
    Deciding(Decision),
    Hub,
}

/// Celebrations one at a time, then one decision, then back to the hub.
#[derive(Debug, Clone, PartialEq)]
pub struct PostRaceFlow {
    stage: PostRaceStage,
    queue: CelebrationQueue,
}

impl PostRaceFlow {
    pub fn new<R: Rng + ?Sized>(
        mut queue: CelebrationQueue,
        catalog: &DecisionCatalog,
        rng: &mut R,
    ) -> Self {
        let stage = match queue.pop() {
            Some(first) => PostRaceStage::Celebrating(first),
            None => Self::decision_stage(catalog, rng),
        };
        Self { stage, queue }
    }

    #[must_use]
    pub const fn stage(&self) -> &PostRaceStage {
        &self.stage
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.stage, PostRaceStage::Hub)
    }

    #[must_use]
    pub fn remaining_celebrations(&self) -> usize {
        self.queue.len()
    }

    /// Dismiss the celebration on screen and show the next stage.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotCelebrating` when no celebration is showing.
    pub fn acknowledge<R: Rng + ?Sized>(
        &mut self,
        catalog: &DecisionCatalog,
        rng: &mut R,
    ) -> Result<&PostRaceStage, SessionError> {
        let PostRaceStage::Celebrating(_) = self.stage else {
            return Err(SessionError::NotCelebrating);
        };
        self.stage = match self.queue.pop() {
            Some(next) => PostRaceStage::Celebrating(next),
            None => Self::decision_stage(catalog, rng),
        };
        Ok(&self.stage)
    }

    /// Resolve the open decision and return to the hub. The caller folds the
    /// returned decision into the profile.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotDeciding` when no decision is open.
    pub fn decide(&mut self, choice: DecisionChoice) -> Result<(Decision, DecisionChoice), SessionError> {
        match std::mem::replace(&mut self.stage, PostRaceStage::Hub) {
            PostRaceStage::Deciding(decision) => Ok((decision, choice)),
            other => {
                self.stage = other;
                Err(SessionError::NotDeciding)
            }
        }
    }

    fn decision_stage<R: Rng + ?Sized>(catalog: &DecisionCatalog, rng: &mut R) -> PostRaceStage {
        catalog
            .draw(rng)
            .cloned()
            .map_or(PostRaceStage::Hub, PostRaceStage::Deciding)
    }
}
