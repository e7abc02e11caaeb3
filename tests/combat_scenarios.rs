//! End-to-end combat scenarios driven through `tick()`

use combat_sim::CombatConfig;
use combat_sim::consts::SIM_DT;
use combat_sim::sim::{
    Archetype, CategoryMask, Collider, CombatEvent, CombatState, EnemyState, EnemyStats, Faction,
    GamePhase, MeleeBehavior, PlayerConfig, ProjectileSpawn, Shape, TickInput, WeaponDefinition,
    tick,
};
use glam::Vec2;

const ARENA: &str = include_str!("../assets/arena.toml");

fn run(state: &mut CombatState, ticks: usize, input: &TickInput) {
    for _ in 0..ticks {
        tick(state, input, SIM_DT);
    }
}

fn idle(state: &mut CombatState, ticks: usize) {
    run(state, ticks, &TickInput::default());
}

fn duel() -> (CombatState, u32) {
    let mut state = CombatState::new(3);
    state.spawn_player(PlayerConfig::default(), Vec::new());
    let enemy = state.spawn_enemy(
        Vec2::new(6.0, 0.0),
        EnemyStats::default(),
        Archetype::Melee(MeleeBehavior::default()),
    );
    (state, enemy)
}

#[test]
fn enemy_hurt_recover_die_and_despawn() {
    let (mut state, id) = duel();

    state.apply_damage(id, 15);
    let enemy = state.enemy(id).unwrap();
    assert_eq!(enemy.state(), EnemyState::Hurt);
    assert_eq!(enemy.health().current(), 5);
    assert!(enemy.is_invulnerable());

    // Hurt window (0.2s): further hits bounce off
    idle(&mut state, 6);
    state.apply_damage(id, 10);
    assert_eq!(state.enemy(id).unwrap().health().current(), 5);

    idle(&mut state, 7);
    let enemy = state.enemy(id).unwrap();
    assert!(!enemy.is_invulnerable());
    // Player 6 units away: straight back into the chase
    assert_eq!(enemy.state(), EnemyState::Chase);

    state.apply_damage(id, 10);
    assert_eq!(state.enemy(id).unwrap().state(), EnemyState::Dead);
    assert_eq!(
        state
            .events()
            .iter()
            .filter(|e| **e == CombatEvent::ActorDied(id))
            .count(),
        1
    );

    // Corpse lingers for the destroy delay (1.5s), then leaves
    idle(&mut state, 80);
    assert!(state.enemy(id).is_some());
    idle(&mut state, 12);
    assert!(state.enemy(id).is_none());
    assert!(state.events().contains(&CombatEvent::ActorRemoved(id)));
}

#[test]
fn dialogue_freezes_hurt_timer() {
    let (mut state, id) = duel();
    state.apply_damage(id, 1);

    state.set_phase(GamePhase::Dialogue);
    idle(&mut state, 120);
    assert_eq!(state.enemy(id).unwrap().state(), EnemyState::Hurt);

    state.set_phase(GamePhase::Play);
    idle(&mut state, 13);
    assert_eq!(state.enemy(id).unwrap().state(), EnemyState::Chase);
}

#[test]
fn fast_projectile_does_not_tunnel() {
    let (mut state, id) = duel();
    // Thin wall between the player and the enemy
    state.add_obstacle(Collider::solid(Shape::Rect {
        min: Vec2::new(4.0, -2.0),
        max: Vec2::new(4.05, 2.0),
    }));

    // 10 units per tick
    state.queue_projectile(ProjectileSpawn {
        position: Vec2::new(1.0, 0.0),
        direction: Vec2::X,
        damage: 50,
        speed: 600.0,
        lifetime: 1.0,
        hit_mask: CategoryMask::ALL,
        owner: Faction::Player,
    });
    idle(&mut state, 3);

    assert!(state.projectiles.is_empty());
    assert_eq!(state.enemy(id).unwrap().health().current(), 20);
}

#[test]
fn shotgun_fan_is_symmetric() {
    let mut state = CombatState::new(3);
    state.spawn_player(
        PlayerConfig::default(),
        vec![WeaponDefinition {
            name: "Shotgun".into(),
            bullets_per_shot: 3,
            spread_angle: 30.0,
            ..Default::default()
        }],
    );

    let fire = TickInput {
        fire_held: true,
        ..Default::default()
    };
    tick(&mut state, &fire, SIM_DT);

    let mut angles: Vec<f32> = state
        .pending_spawns
        .iter()
        .map(|s| Vec2::X.angle_to(s.direction).to_degrees())
        .collect();
    angles.sort_by(f32::total_cmp);
    assert_eq!(angles.len(), 3);
    for (got, want) in angles.iter().zip([-15.0, 0.0, 15.0]) {
        assert!((got - want).abs() < 1e-3, "{got} vs {want}");
    }
}

#[test]
fn weapon_switch_wraps_through_ticks() {
    let mut state = CombatState::new(3);
    let loadout = ["A", "B", "C"]
        .into_iter()
        .map(|name| WeaponDefinition {
            name: name.into(),
            ..Default::default()
        })
        .collect();
    state.spawn_player(PlayerConfig::default(), loadout);

    let prev = TickInput {
        switch_prev_pressed: true,
        ..Default::default()
    };
    tick(&mut state, &prev, SIM_DT);
    let current = |s: &CombatState| s.player.as_ref().map(|p| p.weapons.current_index());
    assert_eq!(current(&state), Some(2));

    let next = TickInput {
        switch_next_pressed: true,
        ..Default::default()
    };
    tick(&mut state, &next, SIM_DT);
    assert_eq!(current(&state), Some(0));
    assert_eq!(
        state.drain_events(),
        vec![CombatEvent::WeaponSwitched, CombatEvent::WeaponSwitched]
    );
}

#[test]
fn arena_file_loads_cleanly() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/arena.toml");
    let config = CombatConfig::load(path).unwrap();
    assert!(config.validate().unwrap().is_empty());

    let state = CombatState::from_config(&config).unwrap();
    assert_eq!(state.enemies.len(), 2);
    assert_eq!(state.givers.len(), 1);
}

fn scripted(frame: usize) -> TickInput {
    TickInput {
        move_vector: if frame < 200 { Vec2::X } else { Vec2::ZERO },
        fire_held: frame % 20 < 10,
        interact_pressed: frame == 1,
        switch_next_pressed: frame == 90,
        jump_pressed: frame == 150,
        ..Default::default()
    }
}

fn play_arena() -> (String, Vec<CombatEvent>) {
    let config = CombatConfig::from_toml_str(ARENA).unwrap();
    let mut state = CombatState::from_config(&config).unwrap();
    let mut events = Vec::new();
    for frame in 0..400 {
        tick(&mut state, &scripted(frame), SIM_DT);
        events.extend(state.drain_events());
    }
    (serde_json::to_string(&state).unwrap(), events)
}

#[test]
fn same_seed_and_inputs_replay_identically() {
    let (a, events_a) = play_arena();
    let (b, events_b) = play_arena();
    assert_eq!(a, b);
    assert_eq!(events_a, events_b);
    assert!(events_a.iter().any(|e| matches!(e, CombatEvent::WeaponGranted { .. })));
}
