//! Event sink for replays and UIs.
//!
//! The engine reports what happens but never reads anything back: every
//! method returns a result that the call site logs and drops.

use serde::{Deserialize, Serialize};

use crate::error::SpectatorError;
use crate::limits::Team;
use crate::state::BoardMinion;
use crate::types::{CardId, EntityId};

pub type SpectatorResult = Result<(), SpectatorError>;

/// Simplified view of a minion for battle replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinionView {
    pub entity_id: EntityId,
    pub card_id: CardId,
    pub attack: i32,
    pub health: i32,
    pub taunt: bool,
    pub divine_shield: bool,
    pub poisonous: bool,
    pub reborn: bool,
}

impl From<&BoardMinion> for MinionView {
    fn from(minion: &BoardMinion) -> Self {
        Self {
            entity_id: minion.entity_id,
            card_id: minion.card_id.clone(),
            attack: minion.attack,
            health: minion.health,
            taunt: minion.taunt,
            divine_shield: minion.divine_shield,
            poisonous: minion.poisonous,
            reborn: minion.reborn,
        }
    }
}

/// The minions one board lost in a death pass, with the positions they
/// left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeathBatch {
    pub positions: Vec<u32>,
    pub dead: Vec<MinionView>,
}

impl DeathBatch {
    pub fn is_empty(&self) -> bool {
        self.dead.is_empty()
    }
}

pub trait Spectator {
    fn register_start_of_combat(
        &mut self,
        _player_board: &[MinionView],
        _opponent_board: &[MinionView],
    ) -> SpectatorResult {
        Ok(())
    }

    fn register_attack(
        &mut self,
        _team: Team,
        _attacker: &MinionView,
        _defender: &MinionView,
    ) -> SpectatorResult {
        Ok(())
    }

    fn register_damage_dealt(
        &mut self,
        _source: Option<EntityId>,
        _target: &MinionView,
        _damage: i32,
    ) -> SpectatorResult {
        Ok(())
    }

    fn register_minions_spawn(
        &mut self,
        _team: Team,
        _source: Option<EntityId>,
        _spawned: &[MinionView],
        _board: &[MinionView],
    ) -> SpectatorResult {
        Ok(())
    }

    fn register_dead_entities(
        &mut self,
        _player: &DeathBatch,
        _opponent: &DeathBatch,
    ) -> SpectatorResult {
        Ok(())
    }

    fn register_power_target(&mut self, _source: EntityId, _target: EntityId) -> SpectatorResult {
        Ok(())
    }

    /// The winning side's hero hits the loser at the end of combat.
    fn register_hero_attack(&mut self, _team: Team, _damage: u32) -> SpectatorResult {
        Ok(())
    }
}

/// Logs and drops a sink failure.
pub(crate) fn swallow(result: SpectatorResult) {
    if let Err(e) = result {
        crate::log::warn(&format!("ignoring spectator failure: {e}"));
    }
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSpectator;

impl Spectator for NoopSpectator {}

/// Events generated during combat for replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum CombatEvent {
    #[serde(rename_all = "camelCase")]
    StartOfCombat {
        player_board: Vec<MinionView>,
        opponent_board: Vec<MinionView>,
    },
    #[serde(rename_all = "camelCase")]
    Attack {
        team: Team,
        attacker: MinionView,
        defender: MinionView,
    },
    #[serde(rename_all = "camelCase")]
    Damage {
        source: Option<EntityId>,
        target: MinionView,
        damage: i32,
    },
    #[serde(rename_all = "camelCase")]
    Spawn {
        team: Team,
        source: Option<EntityId>,
        spawned: Vec<MinionView>,
        new_board_state: Vec<MinionView>,
    },
    #[serde(rename_all = "camelCase")]
    MinionDeath {
        player: DeathBatch,
        opponent: DeathBatch,
    },
    #[serde(rename_all = "camelCase")]
    PowerTarget { source: EntityId, target: EntityId },
    #[serde(rename_all = "camelCase")]
    HeroAttack { team: Team, damage: u32 },
}

/// Records every notification in order.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<CombatEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_events(self) -> Vec<CombatEvent> {
        self.events
    }
}

impl Spectator for EventLog {
    fn register_start_of_combat(
        &mut self,
        player_board: &[MinionView],
        opponent_board: &[MinionView],
    ) -> SpectatorResult {
        self.events.push(CombatEvent::StartOfCombat {
            player_board: player_board.to_vec(),
            opponent_board: opponent_board.to_vec(),
        });
        Ok(())
    }

    fn register_attack(
        &mut self,
        team: Team,
        attacker: &MinionView,
        defender: &MinionView,
    ) -> SpectatorResult {
        self.events.push(CombatEvent::Attack {
            team,
            attacker: attacker.clone(),
            defender: defender.clone(),
        });
        Ok(())
    }

    fn register_damage_dealt(
        &mut self,
        source: Option<EntityId>,
        target: &MinionView,
        damage: i32,
    ) -> SpectatorResult {
        self.events.push(CombatEvent::Damage {
            source,
            target: target.clone(),
            damage,
        });
        Ok(())
    }

    fn register_minions_spawn(
        &mut self,
        team: Team,
        source: Option<EntityId>,
        spawned: &[MinionView],
        board: &[MinionView],
    ) -> SpectatorResult {
        self.events.push(CombatEvent::Spawn {
            team,
            source,
            spawned: spawned.to_vec(),
            new_board_state: board.to_vec(),
        });
        Ok(())
    }

    fn register_dead_entities(&mut self, player: &DeathBatch, opponent: &DeathBatch) -> SpectatorResult {
        self.events.push(CombatEvent::MinionDeath {
            player: player.clone(),
            opponent: opponent.clone(),
        });
        Ok(())
    }

    fn register_power_target(&mut self, source: EntityId, target: EntityId) -> SpectatorResult {
        self.events.push(CombatEvent::PowerTarget { source, target });
        Ok(())
    }

    fn register_hero_attack(&mut self, team: Team, damage: u32) -> SpectatorResult {
        self.events.push(CombatEvent::HeroAttack { team, damage });
        Ok(())
    }
}
