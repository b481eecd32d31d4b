//! Match facade driving the simulation one explicit step at a time.
use std::collections::BTreeSet;

use bevy::prelude::*;
use log::{info, warn};

use crate::components::{OrbitalLink, PlayerId, Vitality};
use crate::config::SimConfig;
use crate::plugin::{ArenaPlugin, SimClock};
use crate::presentation::PresentationPlugin;
use crate::skills::{cast_skill, ActiveSkillEffect, CastError};
use crate::spawn::{spawn_arena, spawn_ball, BallSpec, SpawnError, SpawnedBall};

/// Result of a match at a given moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// At least two players still have a living combatant, or fewer than two
    /// players ever entered.
    InProgress,
    /// Only this player has a living combatant left.
    Winner(PlayerId),
    /// Every player has been eliminated.
    Draw,
}

/// Owns a Bevy [`App`] with the simulation and presentation plugins.
///
/// # Examples
///
/// ```
/// use arena_duel::{ArenaMatch, MatchOutcome};
/// use arena_duel::components::PlayerId;
/// use arena_duel::spawn::BallSpec;
/// use bevy::math::Vec2;
///
/// let mut arena = ArenaMatch::new();
/// arena
///     .spawn_arena(Vec2::ZERO, Vec2::new(960.0, 540.0))
///     .expect("valid arena");
/// arena
///     .spawn_ball(BallSpec {
///         player: Some(PlayerId(1)),
///         position: Vec2::new(240.0, 270.0),
///         ..BallSpec::default()
///     })
///     .expect("valid ball");
/// arena.advance(1.0 / 60.0);
/// assert_eq!(arena.outcome(), MatchOutcome::InProgress);
/// ```
pub struct ArenaMatch {
    app: App,
    players: BTreeSet<PlayerId>,
}

impl Default for ArenaMatch {
    fn default() -> Self {
        Self::new()
    }
}

impl ArenaMatch {
    /// Match using the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::build(ArenaPlugin::default())
    }

    /// Match using `config`.
    #[must_use]
    pub fn with_config(config: SimConfig) -> Self {
        Self::build(ArenaPlugin::with_config(config))
    }

    fn build(plugin: ArenaPlugin) -> Self {
        let mut app = App::new();
        app.add_plugins((plugin, PresentationPlugin));
        Self {
            app,
            players: BTreeSet::new(),
        }
    }

    /// Spawns the play-field rectangle.
    ///
    /// # Errors
    ///
    /// Returns [`SpawnError::InvalidArena`] for non-positive dimensions.
    pub fn spawn_arena(&mut self, origin: Vec2, size: Vec2) -> Result<Entity, SpawnError> {
        spawn_arena(self.app.world_mut(), origin, size)
    }

    /// Spawns a combatant and registers its player.
    ///
    /// # Errors
    ///
    /// Returns a [`SpawnError`] when the ball is invalid.
    pub fn spawn_ball(&mut self, spec: BallSpec) -> Result<SpawnedBall, SpawnError> {
        let player = spec.player;
        let spawned = spawn_ball(self.app.world_mut(), spec)?;
        if let Some(player) = player {
            self.players.insert(player);
        }
        Ok(spawned)
    }

    /// Advances the simulation by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if let Some(mut clock) = self.app.world_mut().get_resource_mut::<SimClock>() {
            clock.begin_frame(dt);
        } else {
            warn!("simulation clock missing; frame runs without time");
        }
        self.app.update();
    }

    /// Casts the skill in `slot` of `caster` at the current simulation time.
    ///
    /// # Errors
    ///
    /// Returns a [`CastError`] when the cast is refused; nothing changes in
    /// that case.
    pub fn cast_skill(
        &mut self,
        caster: Entity,
        slot: usize,
    ) -> Result<ActiveSkillEffect, CastError> {
        let now = self.elapsed();
        cast_skill(self.app.world_mut(), caster, slot, now)
    }

    /// Returns `true` while `entity` is alive in the world.
    #[must_use]
    pub fn entity_exists(&self, entity: Entity) -> bool {
        self.app.world().get_entity(entity).is_ok()
    }

    /// Seconds simulated so far.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.app
            .world()
            .get_resource::<SimClock>()
            .map_or(0.0, SimClock::now)
    }

    /// Decides the match from the players that still have a living
    /// combatant.
    pub fn outcome(&mut self) -> MatchOutcome {
        if self.players.len() < 2 {
            return MatchOutcome::InProgress;
        }
        let world = self.app.world_mut();
        let mut query =
            world.query_filtered::<(&PlayerId, &Vitality), Without<OrbitalLink>>();
        let alive: BTreeSet<PlayerId> = query
            .iter(world)
            .filter(|(_, vitality)| !vitality.is_dead())
            .map(|(player, _)| *player)
            .collect();

        let mut remaining = alive.iter();
        match (remaining.next(), remaining.next()) {
            (None, _) => MatchOutcome::Draw,
            (Some(player), None) => MatchOutcome::Winner(*player),
            (Some(_), Some(_)) => MatchOutcome::InProgress,
        }
    }

    /// Steps until the match is decided or `max_frames` steps have run.
    pub fn run_until_decided(&mut self, dt: f32, max_frames: u32) -> MatchOutcome {
        for frame in 0..max_frames {
            self.advance(dt);
            let outcome = self.outcome();
            if outcome != MatchOutcome::InProgress {
                info!("match decided after {} frames: {outcome:?}", frame + 1);
                return outcome;
            }
        }
        MatchOutcome::InProgress
    }

    /// The simulated world.
    #[must_use]
    pub fn world(&self) -> &World {
        self.app.world()
    }

    /// Mutable access to the simulated world.
    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }
}
