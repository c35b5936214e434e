//! Winner advancement through an instantiated bracket.

use super::{
    errors::{BracketError, BracketResult, MatchStateViolation},
    shape::{BracketShape, Cohort, MATCH_ARITY},
};
use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt};

/// Opaque participant reference supplied by the registration collaborator
pub type ParticipantId = i64;

/// Address of a match: round and match number, both 1-indexed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MatchRef {
    pub round: u32,
    pub match_number: usize,
}

impl MatchRef {
    pub fn new(round: u32, match_number: usize) -> Self {
        Self {
            round,
            match_number,
        }
    }

    /// Match the winner of this one advances to, and the slot taken there
    pub fn next(&self) -> (MatchRef, usize) {
        let next = MatchRef::new(self.round + 1, self.match_number.div_ceil(MATCH_ARITY));
        let slot = (self.match_number - 1) % MATCH_ARITY;
        (next, slot)
    }
}

impl fmt::Display for MatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "round {} match {}", self.round, self.match_number)
    }
}

/// One four-seat match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub match_ref: MatchRef,
    pub slots: [Option<ParticipantId>; MATCH_ARITY],
    pub winner: Option<ParticipantId>,
}

impl Match {
    fn empty(match_ref: MatchRef) -> Self {
        Self {
            match_ref,
            slots: [None; MATCH_ARITY],
            winner: None,
        }
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(Option::is_some)
    }

    pub fn is_decided(&self) -> bool {
        self.winner.is_some()
    }

    /// Fully seated and waiting for a result
    pub fn is_ready(&self) -> bool {
        self.is_full() && !self.is_decided()
    }

    pub fn occupants(&self) -> impl Iterator<Item = ParticipantId> + '_ {
        self.slots.iter().flatten().copied()
    }

    pub fn contains(&self, participant: ParticipantId) -> bool {
        self.occupants().any(|p| p == participant)
    }

    /// Occupants other than the winner, in slot order (empty while undecided)
    pub fn losers(&self) -> Vec<ParticipantId> {
        match self.winner {
            Some(winner) => self.occupants().filter(|&p| p != winner).collect(),
            None => Vec::new(),
        }
    }
}

/// Matches of one round
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub label: String,
    pub matches: Vec<Match>,
}

impl Round {
    pub fn is_complete(&self) -> bool {
        self.matches.iter().all(Match::is_decided)
    }
}

/// Effect of a recorded winner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advancement {
    /// Winner seated in the next round
    Advanced {
        to: MatchRef,
        slot: usize,
        /// Next match is now fully seated
        ready: bool,
    },
    /// The Final was decided
    Champion(ParticipantId),
}

/// Participants of one finishing cohort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub cohort: Cohort,
    /// Bracket order: match number, then slot
    pub participants: Vec<ParticipantId>,
}

/// Final placement of every participant, best cohort first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standings {
    pub cohorts: Vec<Standing>,
}

impl Standings {
    pub fn champion(&self) -> Option<ParticipantId> {
        self.cohorts
            .first()
            .and_then(|standing| standing.participants.first().copied())
    }

    /// Cohort a participant finished in
    pub fn cohort_of(&self, participant: ParticipantId) -> Option<&Cohort> {
        self.cohorts
            .iter()
            .find(|standing| standing.participants.contains(&participant))
            .map(|standing| &standing.cohort)
    }
}

/// Instantiated bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bracket {
    shape: BracketShape,
    rounds: Vec<Round>,
}

impl Bracket {
    /// Create an empty bracket for `shape`
    pub fn new(shape: BracketShape) -> Self {
        let rounds = (1..=shape.rounds())
            .map(|number| Round {
                number,
                label: shape.round_label(number),
                matches: (1..=shape.matches_in_round(number).unwrap_or(0))
                    .map(|match_number| Match::empty(MatchRef::new(number, match_number)))
                    .collect(),
            })
            .collect();

        Self { shape, rounds }
    }

    /// Create a bracket with round 1 seated from `participants`.
    ///
    /// Participants fill round 1 in order: the first four take match 1, the
    /// next four match 2, and so on. The order is the caller's to choose.
    pub fn seeded(shape: BracketShape, participants: &[ParticipantId]) -> BracketResult<Self> {
        if participants.len() != shape.player_count() {
            return Err(BracketError::InvalidSeeding(format!(
                "expected {} participants, got {}",
                shape.player_count(),
                participants.len()
            )));
        }

        let mut seen = HashSet::with_capacity(participants.len());
        if let Some(duplicate) = participants.iter().find(|p| !seen.insert(**p)) {
            return Err(BracketError::InvalidSeeding(format!(
                "participant {duplicate} seeded twice"
            )));
        }

        let mut bracket = Self::new(shape);
        for (game, seats) in bracket.rounds[0]
            .matches
            .iter_mut()
            .zip(participants.chunks(MATCH_ARITY))
        {
            for (slot, participant) in game.slots.iter_mut().zip(seats) {
                *slot = Some(*participant);
            }
        }

        Ok(bracket)
    }

    pub fn shape(&self) -> &BracketShape {
        &self.shape
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        let index = usize::try_from(number).ok()?.checked_sub(1)?;
        self.rounds.get(index)
    }

    pub fn get(&self, match_ref: MatchRef) -> Option<&Match> {
        self.round(match_ref.round)?
            .matches
            .get(match_ref.match_number.checked_sub(1)?)
    }

    fn get_mut(&mut self, match_ref: MatchRef) -> Option<&mut Match> {
        let round = usize::try_from(match_ref.round).ok()?.checked_sub(1)?;
        self.rounds
            .get_mut(round)?
            .matches
            .get_mut(match_ref.match_number.checked_sub(1)?)
    }

    /// First round with an undecided match; `None` once the Final is decided
    pub fn active_round(&self) -> Option<u32> {
        self.rounds
            .iter()
            .find(|round| !round.is_complete())
            .map(|round| round.number)
    }

    /// Matches that are seated and waiting for a result
    pub fn ready_matches(&self) -> Vec<MatchRef> {
        self.rounds
            .iter()
            .flat_map(|round| round.matches.iter())
            .filter(|game| game.is_ready())
            .map(|game| game.match_ref)
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.active_round().is_none()
    }

    pub fn champion(&self) -> Option<ParticipantId> {
        self.rounds.last()?.matches.first()?.winner
    }

    /// Record the winner of a match and seat them in the next round.
    ///
    /// Validation happens before any write, so a rejected report leaves the
    /// bracket untouched.
    pub fn record_winner(
        &mut self,
        match_ref: MatchRef,
        winner: ParticipantId,
    ) -> BracketResult<Advancement> {
        let game = self.get(match_ref).ok_or(BracketError::match_state(
            match_ref,
            MatchStateViolation::UnknownMatch,
        ))?;

        if game.is_decided() {
            return Err(BracketError::match_state(
                match_ref,
                MatchStateViolation::AlreadyDecided,
            ));
        }

        if let Some(active) = self.active_round()
            && active != match_ref.round
        {
            return Err(BracketError::match_state(
                match_ref,
                MatchStateViolation::RoundNotActive { active },
            ));
        }

        if !game.is_full() {
            return Err(BracketError::match_state(
                match_ref,
                MatchStateViolation::NotReady,
            ));
        }

        if !game.contains(winner) {
            return Err(BracketError::match_state(
                match_ref,
                MatchStateViolation::NotAnOccupant(winner),
            ));
        }

        if let Some(game) = self.get_mut(match_ref) {
            game.winner = Some(winner);
        }

        if match_ref.round == self.shape.rounds() {
            log::debug!("Final decided, champion {winner}");
            return Ok(Advancement::Champion(winner));
        }

        let (to, slot) = match_ref.next();
        let next = self.get_mut(to).ok_or(BracketError::match_state(
            to,
            MatchStateViolation::UnknownMatch,
        ))?;
        next.slots[slot] = Some(winner);
        let ready = next.is_ready();

        log::debug!("{match_ref} won by {winner}, seated at {to} slot {slot}");
        Ok(Advancement::Advanced { to, slot, ready })
    }

    /// Finishing cohorts once the Final is decided
    pub fn standings(&self) -> Option<Standings> {
        let champion = self.champion()?;
        let mut cohorts = self.shape.cohorts().into_iter();

        let mut standings = Vec::with_capacity(self.rounds.len() + 1);
        standings.push(Standing {
            cohort: cohorts.next()?,
            participants: vec![champion],
        });

        for (round, cohort) in self.rounds.iter().rev().zip(cohorts) {
            standings.push(Standing {
                cohort,
                participants: round.matches.iter().flat_map(Match::losers).collect(),
            });
        }

        Some(Standings { cohorts: standings })
    }
}
