use tracing::{debug, info};

use crate::{
    core::errors::{LedgerError, Result},
    domain::{CombatActor, CombatPhase},
};

/// What the caller wants after a turn has been announced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnSignal {
    NextTurn,
    Finish,
}

/// Initiative-ordered combat.
///
/// Actors are gathered while [`CombatPhase::Forming`], ordered once by
/// [`CombatSession::start`], then cycled until [`CombatSession::finish`].
#[derive(Debug, Clone)]
pub struct CombatSession {
    actors: Vec<CombatActor>,
    phase: CombatPhase,
    cursor: usize,
    round: u32,
}

impl CombatSession {
    pub fn new() -> Self {
        Self {
            actors: Vec::new(),
            phase: CombatPhase::Forming,
            cursor: 0,
            round: 0,
        }
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn actors(&self) -> &[CombatActor] {
        &self.actors
    }

    pub fn add_actor(&mut self, name: &str, initiative: i32) -> Result<&CombatActor> {
        self.require(CombatPhase::Forming, "add actors")?;
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("actor name cannot be empty".into()));
        }
        self.actors.push(CombatActor::new(name, initiative));
        debug!(name, initiative, "actor joined combat");
        Ok(&self.actors[self.actors.len() - 1])
    }

    /// Orders actors by descending initiative. Ties go to the actor added
    /// last.
    pub fn start(&mut self) -> Result<&CombatActor> {
        self.require(CombatPhase::Forming, "start combat")?;
        if self.actors.is_empty() {
            return Err(LedgerError::InvalidState(
                "combat needs at least one actor".into(),
            ));
        }
        self.actors.sort_by_key(|actor| actor.initiative);
        self.actors.reverse();
        self.cursor = 0;
        self.round = 1;
        self.phase = CombatPhase::Active;
        info!(actors = self.actors.len(), "combat started");
        Ok(&self.actors[0])
    }

    pub fn current(&self) -> Option<&CombatActor> {
        match self.phase {
            CombatPhase::Active => self.actors.get(self.cursor),
            _ => None,
        }
    }

    /// Zero-based position of the current actor in turn order.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn next_turn(&mut self) -> Result<&CombatActor> {
        self.require(CombatPhase::Active, "advance the turn")?;
        self.cursor = (self.cursor + 1) % self.actors.len();
        if self.cursor == 0 {
            self.round += 1;
            debug!(round = self.round, "new combat round");
        }
        Ok(&self.actors[self.cursor])
    }

    pub fn finish(&mut self) -> Result<()> {
        self.require(CombatPhase::Active, "finish combat")?;
        self.phase = CombatPhase::Ended;
        info!(rounds = self.round, "combat finished");
        Ok(())
    }

    /// Hands the session to `await_signal` at the start of every turn and
    /// blocks on it for the next signal until combat ends. Starts combat first
    /// when still forming.
    pub fn run_turns<F, E>(&mut self, mut await_signal: F) -> std::result::Result<(), E>
    where
        F: FnMut(&CombatSession) -> std::result::Result<TurnSignal, E>,
        E: From<LedgerError>,
    {
        if self.phase == CombatPhase::Forming {
            self.start()?;
        }
        self.require(CombatPhase::Active, "run turns")?;
        loop {
            match await_signal(&*self)? {
                TurnSignal::NextTurn => {
                    self.next_turn()?;
                }
                TurnSignal::Finish => {
                    self.finish()?;
                    return Ok(());
                }
            }
        }
    }

    fn require(&self, phase: CombatPhase, action: &str) -> Result<()> {
        if self.phase == phase {
            Ok(())
        } else {
            Err(LedgerError::InvalidState(format!(
                "cannot {} while combat is {}",
                action, self.phase
            )))
        }
    }
}

impl Default for CombatSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(session: &CombatSession) -> Vec<&str> {
        session.actors().iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn higher_initiative_goes_first_and_wraps() {
        let mut session = CombatSession::new();
        session.add_actor("Goblin", 5).unwrap();
        session.add_actor("Fighter", 10).unwrap();
        session.add_actor("Rogue", 15).unwrap();
        assert_eq!(session.start().unwrap().name, "Rogue");
        assert_eq!(names(&session), vec!["Rogue", "Fighter", "Goblin"]);

        assert_eq!(session.next_turn().unwrap().name, "Fighter");
        assert_eq!(session.next_turn().unwrap().name, "Goblin");
        assert_eq!(session.round(), 1);
        assert_eq!(session.next_turn().unwrap().name, "Rogue");
        assert_eq!(session.round(), 2);
    }

    #[test]
    fn ties_favour_the_latest_arrival() {
        let mut session = CombatSession::new();
        session.add_actor("Wizard", 12).unwrap();
        session.add_actor("Cleric", 12).unwrap();
        session.add_actor("Ogre", 3).unwrap();
        session.start().unwrap();
        assert_eq!(names(&session), vec!["Cleric", "Wizard", "Ogre"]);
    }

    #[test]
    fn wrong_phase_calls_are_rejected() {
        let mut session = CombatSession::new();
        assert!(matches!(session.next_turn(), Err(LedgerError::InvalidState(_))));
        assert!(matches!(session.finish(), Err(LedgerError::InvalidState(_))));
        assert!(matches!(session.start(), Err(LedgerError::InvalidState(_))));

        session.add_actor("Bard", 8).unwrap();
        session.start().unwrap();
        assert!(matches!(session.add_actor("Late", 1), Err(LedgerError::InvalidState(_))));
        assert!(matches!(session.start(), Err(LedgerError::InvalidState(_))));

        session.finish().unwrap();
        assert_eq!(session.phase(), CombatPhase::Ended);
        assert!(session.current().is_none());
        assert!(matches!(session.next_turn(), Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn run_turns_follows_signals_until_finish() {
        let mut session = CombatSession::new();
        session.add_actor("A", 1).unwrap();
        session.add_actor("B", 2).unwrap();
        let mut seen = Vec::new();
        let result: std::result::Result<(), LedgerError> = session.run_turns(|turn| {
            let actor = turn.current().expect("active combat has a current actor");
            seen.push(actor.name.clone());
            Ok(if seen.len() < 4 {
                TurnSignal::NextTurn
            } else {
                TurnSignal::Finish
            })
        });
        result.unwrap();
        assert_eq!(seen, vec!["B", "A", "B", "A"]);
        assert_eq!(session.phase(), CombatPhase::Ended);
        assert_eq!(session.round(), 2);
    }
}
