//! Fixed timestep simulation tick
//!
//! Core combat loop that advances the simulation deterministically. Within a
//! tick every actor reads the state committed at the end of the previous
//! tick; damage and spawns are collected as commands and applied once all
//! actors have run.

use glam::Vec2;

use super::projectile::ProjectileSpawn;
use super::state::{CombatCommand, CombatEvent, CombatState, GamePhase};
use crate::consts::*;

/// Input intent for a single tick (deterministic)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickInput {
    /// Desired movement, length clamped to 1
    pub move_vector: Vec2,
    /// Fire button held
    pub fire_held: bool,
    /// Edge: jump pressed this tick
    pub jump_pressed: bool,
    pub sprint_held: bool,
    /// Edge: cycle to next weapon
    pub switch_next_pressed: bool,
    /// Edge: cycle to previous weapon
    pub switch_prev_pressed: bool,
    /// Edge: talk / use
    pub interact_pressed: bool,
    /// Edge: pause toggle
    pub pause_pressed: bool,
}

impl TickInput {
    /// Reset edge-triggered fields (after every tick, consumed or not)
    pub fn clear_edges(&mut self) {
        self.jump_pressed = false;
        self.switch_next_pressed = false;
        self.switch_prev_pressed = false;
        self.interact_pressed = false;
        self.pause_pressed = false;
    }
}

/// Advance the combat state by one fixed timestep
pub fn tick(state: &mut CombatState, input: &TickInput, dt: f32) {
    // Handle pause toggle
    if input.pause_pressed {
        match state.phase() {
            GamePhase::Play => state.set_phase(GamePhase::Pause),
            GamePhase::Pause => state.set_phase(GamePhase::Play),
            _ => {}
        }
    }

    // Nothing is in the world yet
    if state.phase() == GamePhase::MainMenu {
        return;
    }

    let ctx = state.context();
    if !ctx.is_suspended() {
        state.time_ticks += 1;
        state.launch_pending();
    }

    state.rebuild_colliders();
    let target = state.player_target();

    let mut commands: Vec<CombatCommand> = Vec::new();
    let mut spawns: Vec<ProjectileSpawn> = Vec::new();

    // Player
    if !ctx.is_suspended() {
        if let Some(player) = state.player.as_mut() {
            player.update(
                dt,
                input,
                &state.collision,
                &mut state.rng,
                &mut spawns,
                &mut state.events,
            );
        }
        collect_pickups(state);
        if input.interact_pressed {
            interact(state);
        }
    }

    // Enemies run even while suspended so they halt in place
    for enemy in &mut state.enemies {
        if enemy.target.is_none() {
            enemy.target = target.map(|t| t.id);
        }
        let seen = target.filter(|t| enemy.target == Some(t.id));
        enemy.update(dt, &ctx, seen.as_ref(), &mut commands);
    }

    // Projectiles
    if !ctx.is_suspended() {
        for projectile in &mut state.projectiles {
            let Some(impact) = projectile.step(dt, &state.collision) else {
                continue;
            };
            if let Some(target) = impact.target {
                commands.push(CombatCommand::Damage {
                    source: impact.projectile,
                    target,
                    amount: impact.damage,
                });
            }
        }
    }

    // Apply this tick's side effects in a stable order
    for command in commands {
        match command {
            CombatCommand::Damage { target, amount, .. } => state.apply_damage(target, amount),
            CombatCommand::Spawn(spawn) => spawns.push(spawn),
        }
    }
    for spawn in spawns {
        state.queue_projectile(spawn);
    }

    remove_finished(state);

    if state.player.as_ref().is_some_and(|p| !p.is_alive()) {
        state.set_phase(GamePhase::GameOver);
    }

    state.normalize_order();
}

/// Heal pickups the player is touching are consumed
fn collect_pickups(state: &mut CombatState) {
    let Some(player) = state.player.as_mut().filter(|p| p.is_alive()) else {
        return;
    };

    let events = &mut state.events;
    state.pickups.retain(|pickup| {
        let reach = pickup.radius + player.body.radius;
        if player.body.position.distance_squared(pickup.position) > reach * reach {
            return true;
        }
        log::debug!("pickup {} healed player by {}", pickup.id, pickup.amount);
        player.heal(pickup.amount, events);
        false
    });
}

/// Closest giver in reach hands over its weapon
fn interact(state: &mut CombatState) {
    let Some(player) = state.player.as_mut().filter(|p| p.is_alive()) else {
        return;
    };

    let pos = player.body.position;
    let giver = state
        .givers
        .iter_mut()
        .filter(|g| !g.given && g.position.distance(pos) <= g.radius)
        .min_by(|a, b| {
            a.position
                .distance_squared(pos)
                .total_cmp(&b.position.distance_squared(pos))
        });

    if let Some(giver) = giver {
        giver.given = true;
        log::info!("giver {} granted {}", giver.id, giver.weapon.name);
        player
            .weapons
            .add_weapon(giver.weapon.clone(), true, &mut state.events);
        state.events.push(CombatEvent::WeaponGranted {
            weapon: giver.weapon.name.clone(),
        });
    }
}

/// Drop finished projectiles, expired corpses and broken props
fn remove_finished(state: &mut CombatState) {
    state.projectiles.retain(|p| p.is_flying());

    let events = &mut state.events;
    state.enemies.retain(|e| {
        if e.is_removable() {
            log::info!("enemy {} removed", e.id);
            events.push(CombatEvent::ActorRemoved(e.id));
            return false;
        }
        true
    });
    state.props.retain(|p| {
        if p.is_destroyed() {
            events.push(CombatEvent::ActorRemoved(p.id));
            return false;
        }
        true
    });
}

/// Fixed timestep accumulator for frame-driven hosts
#[derive(Debug, Clone, Default)]
pub struct FixedStepper {
    accumulator: f32,
}

impl FixedStepper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run as many `SIM_DT` ticks as `frame_dt` covers, at most
    /// `MAX_SUBSTEPS`. Edge-triggered input is cleared after every tick.
    /// Returns the number of ticks run.
    pub fn advance(&mut self, state: &mut CombatState, input: &mut TickInput, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() {
            self.accumulator += frame_dt.clamp(0.0, 0.1);
        }

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            tick(state, input, SIM_DT);
            input.clear_edges();
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Leftover time not yet simulated
    pub fn pending(&self) -> f32 {
        self.accumulator
    }
}
