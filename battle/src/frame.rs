//! The state of one in-flight combat.
//!
//! Entities live in an arena keyed by [`EntityId`]; each board is an ordered
//! list of ids. Dead entities stay in the arena after they leave their board,
//! so ledger entries and kill credit still resolve, while every position is
//! looked up fresh. Nothing holds an index across a nested resolution.

use std::collections::BTreeMap;

use crate::cards::CardCatalog;
use crate::limits::{BattleLimits, Team};
use crate::rng::BattleRng;
use crate::spectator::{swallow, DeathBatch, MinionView, Spectator};
use crate::state::{BoardMinion, CombatContext, PlayerContext, BOARD_SIZE};
use crate::types::{CardAbility, CardDefinition, EntityId, Mechanic, SelfEffect, Tribe};

pub struct CombatFrame<'a> {
    minions: BTreeMap<EntityId, BoardMinion>,
    boards: [Vec<EntityId>; 2],
    heroes: [PlayerContext; 2],
    pub catalog: &'a dyn CardCatalog,
    pub context: CombatContext,
    pub rng: &'a mut dyn BattleRng,
    pub spectator: &'a mut dyn Spectator,
    pub limits: BattleLimits,
    /// Whether aura buffs are currently applied to both boards.
    pub(crate) auras_active: bool,
}

impl<'a> CombatFrame<'a> {
    pub fn new(
        player: (Vec<BoardMinion>, PlayerContext),
        opponent: (Vec<BoardMinion>, PlayerContext),
        catalog: &'a dyn CardCatalog,
        rng: &'a mut dyn BattleRng,
        spectator: &'a mut dyn Spectator,
        limits: BattleLimits,
    ) -> Self {
        let (player_board, player_hero) = player;
        let (opponent_board, opponent_hero) = opponent;
        let context = CombatContext::new(
            player_board
                .iter()
                .chain(opponent_board.iter())
                .map(|m| &m.entity_id),
        );

        let mut frame = Self {
            minions: BTreeMap::new(),
            boards: [Vec::new(), Vec::new()],
            heroes: [player_hero, opponent_hero],
            catalog,
            context,
            rng,
            spectator,
            limits,
            auras_active: false,
        };

        for (team, board) in [(Team::Player, player_board), (Team::Opponent, opponent_board)] {
            for minion in board {
                if frame.minions.contains_key(&minion.entity_id) {
                    crate::log::invariant_violation(&format!(
                        "entity id {} appears twice at combat start",
                        minion.entity_id
                    ));
                    continue;
                }
                if frame.boards[team.index()].len() >= BOARD_SIZE {
                    crate::log::invariant_violation(&format!("{team} board starts above capacity"));
                    continue;
                }
                frame.boards[team.index()].push(minion.entity_id);
                frame.minions.insert(minion.entity_id, minion);
            }
        }
        frame
    }

    // ==========================================
    // CATALOG ACCESS
    // ==========================================

    pub fn definition(&self, card_id: &str) -> Option<&'a CardDefinition> {
        let catalog: &'a dyn CardCatalog = self.catalog;
        catalog.lookup(card_id)
    }

    /// Definition of an entity's card. Unknown cards are logged once per lookup.
    pub fn definition_of(&self, id: EntityId) -> Option<&'a CardDefinition> {
        let card_id = &self.minions.get(&id)?.card_id;
        let definition = self.definition(card_id);
        if definition.is_none() {
            crate::log::data_error(card_id, "ability lookup");
        }
        definition
    }

    pub fn abilities_of(&self, id: EntityId) -> &'a [CardAbility] {
        self.definition_of(id)
            .map(|d| d.abilities.as_slice())
            .unwrap_or(&[])
    }

    pub fn has_mechanic(&self, id: EntityId, mechanic: Mechanic) -> bool {
        self.definition_of(id)
            .map_or(false, |d| d.has_mechanic(mechanic))
    }

    /// Every ability on `team`'s board with its holder, left to right.
    pub fn board_abilities(&self, team: Team) -> Vec<(EntityId, &'a CardAbility)> {
        self.board(team)
            .iter()
            .flat_map(|&id| self.abilities_of(id).iter().map(move |a| (id, a)))
            .collect()
    }

    pub fn hero_abilities(&self, team: Team) -> &'a [CardAbility] {
        let Some(power) = self.hero(team).hero_power_id.as_deref() else {
            return &[];
        };
        match self.definition(power) {
            Some(definition) => definition.abilities.as_slice(),
            None => {
                crate::log::data_error(power, "hero power lookup");
                &[]
            }
        }
    }

    pub fn tribe_of(&self, id: EntityId) -> Tribe {
        self.definition_of(id).map_or(Tribe::None, |d| d.tribe)
    }

    /// Tier used by the end-of-combat damage formula.
    pub fn tech_level(&self, id: EntityId) -> u32 {
        self.definition_of(id).map_or(0, |d| d.tier)
    }

    // ==========================================
    // BOARDS
    // ==========================================

    pub fn board(&self, team: Team) -> &[EntityId] {
        &self.boards[team.index()]
    }

    /// Owned copy of a board's ordering, safe to iterate while mutating.
    pub fn board_ids(&self, team: Team) -> Vec<EntityId> {
        self.boards[team.index()].clone()
    }

    pub fn len(&self, team: Team) -> usize {
        self.boards[team.index()].len()
    }

    pub fn is_empty(&self, team: Team) -> bool {
        self.boards[team.index()].is_empty()
    }

    pub fn room(&self, team: Team) -> usize {
        BOARD_SIZE.saturating_sub(self.len(team))
    }

    pub fn position(&self, team: Team, id: EntityId) -> Option<usize> {
        self.boards[team.index()].iter().position(|&other| other == id)
    }

    pub fn is_on_board(&self, team: Team, id: EntityId) -> bool {
        self.position(team, id).is_some()
    }

    /// Any entity this combat has seen, on a board or not.
    pub fn minion(&self, id: EntityId) -> Option<&BoardMinion> {
        self.minions.get(&id)
    }

    pub fn minion_mut(&mut self, id: EntityId) -> Option<&mut BoardMinion> {
        self.minions.get_mut(&id)
    }

    /// The entity if it is still on `team`'s board.
    pub fn live(&self, team: Team, id: EntityId) -> Option<&BoardMinion> {
        if self.is_on_board(team, id) {
            self.minions.get(&id)
        } else {
            None
        }
    }

    pub fn minions_on(&self, team: Team) -> impl Iterator<Item = &BoardMinion> + '_ {
        let minions = &self.minions;
        self.boards[team.index()]
            .iter()
            .filter_map(move |id| minions.get(id))
    }

    pub fn snapshot(&self, team: Team) -> Vec<BoardMinion> {
        self.minions_on(team).cloned().collect()
    }

    pub fn views(&self, team: Team) -> Vec<MinionView> {
        self.minions_on(team).map(MinionView::from).collect()
    }

    pub fn view(&self, id: EntityId) -> Option<MinionView> {
        self.minions.get(&id).map(MinionView::from)
    }

    /// Places `minion` at `index` (clamped) unless the board is full.
    pub fn insert(&mut self, team: Team, index: usize, minion: BoardMinion) -> bool {
        let board = &mut self.boards[team.index()];
        if board.len() >= BOARD_SIZE {
            return false;
        }
        if self.minions.contains_key(&minion.entity_id) {
            crate::log::invariant_violation(&format!(
                "entity id {} allocated twice",
                minion.entity_id
            ));
            return false;
        }
        let index = index.min(board.len());
        board.insert(index, minion.entity_id);
        self.minions.insert(minion.entity_id, minion);
        true
    }

    /// Splices out every dead entity, returning the positions they leave on
    /// the shrunk board alongside their ids.
    pub fn remove_dead(&mut self, team: Team) -> (Vec<usize>, Vec<EntityId>) {
        let mut positions = Vec::new();
        let mut dead = Vec::new();
        let mut kept = Vec::with_capacity(self.len(team));
        for &id in &self.boards[team.index()] {
            let is_dead = self.minions.get(&id).map_or(true, BoardMinion::is_dead);
            if is_dead {
                positions.push(kept.len());
                dead.push(id);
            } else {
                kept.push(id);
            }
        }
        self.boards[team.index()] = kept;
        (positions, dead)
    }

    // ==========================================
    // HEROES
    // ==========================================

    pub fn hero(&self, team: Team) -> &PlayerContext {
        &self.heroes[team.index()]
    }

    pub fn hero_mut(&mut self, team: Team) -> &mut PlayerContext {
        &mut self.heroes[team.index()]
    }

    pub fn into_parts(self) -> ([Vec<BoardMinion>; 2], [PlayerContext; 2]) {
        let boards = [self.snapshot(Team::Player), self.snapshot(Team::Opponent)];
        (boards, self.heroes)
    }

    // ==========================================
    // STAT CHANGES
    // ==========================================

    /// Stat change on a live entity. Dead entities are left untouched.
    pub fn buff(&mut self, id: EntityId, attack: i32, health: i32) {
        if let Some(minion) = self.minions.get_mut(&id) {
            minion.modify_stats(attack, health);
        }
    }

    pub fn grant_divine_shield(&mut self, id: EntityId) {
        if let Some(minion) = self.minions.get_mut(&id) {
            if minion.is_alive() {
                minion.divine_shield = true;
            }
        }
    }

    /// Resolves a [`SelfEffect`] for `holder`, which sits on `team`'s board.
    pub fn apply_self_effect(&mut self, team: Team, holder: EntityId, effect: &SelfEffect) {
        match effect {
            SelfEffect::GainStats { attack, health } => self.buff(holder, *attack, *health),
            SelfEffect::GainDivineShield => self.grant_divine_shield(holder),
            SelfEffect::GainCards { count } => self.hero_mut(team).add_cards(*count),
        }
    }

    // ==========================================
    // SPECTATOR
    // ==========================================

    pub fn notify_start_of_combat(&mut self) {
        let player = self.views(Team::Player);
        let opponent = self.views(Team::Opponent);
        swallow(self.spectator.register_start_of_combat(&player, &opponent));
    }

    pub fn notify_attack(&mut self, team: Team, attacker: EntityId, defender: EntityId) {
        if let (Some(a), Some(d)) = (self.view(attacker), self.view(defender)) {
            swallow(self.spectator.register_attack(team, &a, &d));
        }
    }

    pub fn notify_damage(&mut self, source: Option<EntityId>, target: EntityId, damage: i32) {
        if let Some(t) = self.view(target) {
            swallow(self.spectator.register_damage_dealt(source, &t, damage));
        }
    }

    pub fn notify_spawn(&mut self, team: Team, source: Option<EntityId>, spawned: &[EntityId]) {
        if spawned.is_empty() {
            return;
        }
        let spawned: Vec<MinionView> = spawned.iter().filter_map(|&id| self.view(id)).collect();
        let board = self.views(team);
        swallow(
            self.spectator
                .register_minions_spawn(team, source, &spawned, &board),
        );
    }

    pub fn notify_deaths(&mut self, player: &DeathBatch, opponent: &DeathBatch) {
        swallow(self.spectator.register_dead_entities(player, opponent));
    }

    pub fn notify_power_target(&mut self, source: EntityId, target: EntityId) {
        swallow(self.spectator.register_power_target(source, target));
    }

    pub fn notify_hero_attack(&mut self, team: Team, damage: u32) {
        swallow(self.spectator.register_hero_attack(team, damage));
    }

    // ==========================================
    // RANDOMNESS
    // ==========================================

    /// Uniform pick from `items` using the combat's random source.
    pub fn pick<T: Clone>(&mut self, items: &[T]) -> Option<T> {
        crate::rng::choose(&mut *self.rng, items)
    }

    pub fn coin_flip(&mut self) -> bool {
        self.rng.coin_flip()
    }
}
