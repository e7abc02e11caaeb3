//! Combat Sim entry point
//!
//! Headless driver: loads an arena, plays a short scripted input sequence
//! through the fixed-step loop and logs every notification as JSON.
//!
//! ```text
//! RUST_LOG=info combat-sim [assets/arena.toml]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use combat_sim::consts::SIM_DT;
    use combat_sim::sim::{CombatState, FixedStepper, GamePhase, TickInput};
    use combat_sim::{CombatConfig, ConfigResult};
    use glam::Vec2;

    const DEFAULT_ARENA: &str = "assets/arena.toml";
    /// Demo length in frames (8 seconds at 60 Hz)
    const DEMO_FRAMES: u32 = 8 * 60;

    /// Frame index of a scripted moment
    fn at(seconds: f32) -> u32 {
        (seconds * 60.0) as u32
    }

    /// Intent for `frame`: grab the giver's weapon, advance while shooting,
    /// swap back, pause briefly, jump, then stand and watch.
    fn scripted_input(frame: u32) -> TickInput {
        let mut input = TickInput::default();
        let t = frame as f32 * SIM_DT;

        input.interact_pressed = frame == at(0.1);
        input.switch_prev_pressed = frame == at(1.5);
        input.pause_pressed = frame == at(2.5) || frame == at(3.0);
        input.jump_pressed = frame == at(3.5);

        if t < 2.5 || (3.0..5.0).contains(&t) {
            input.move_vector = Vec2::X;
            input.fire_held = true;
        }
        // Tap rhythm for semi-automatic weapons
        if (3.0..5.0).contains(&t) {
            input.fire_held = frame % 12 < 6;
        }
        input.sprint_held = (1.0..2.0).contains(&t);
        input
    }

    pub fn run() -> ConfigResult<()> {
        let path = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_ARENA.to_string());
        let config = CombatConfig::load(&path)?;
        let mut state = CombatState::from_config(&config)?;
        let mut stepper = FixedStepper::new();

        for frame in 0..DEMO_FRAMES {
            let mut input = scripted_input(frame);
            stepper.advance(&mut state, &mut input, SIM_DT);

            for event in state.drain_events() {
                match serde_json::to_string(&event) {
                    Ok(json) => log::info!("t={} {json}", state.time_ticks),
                    Err(e) => log::warn!("unserializable event {event:?}: {e}"),
                }
            }

            if state.phase() == GamePhase::GameOver {
                log::info!("player down at frame {frame}");
                break;
            }
        }

        let player = state.player.as_ref();
        println!(
            "ticks={} phase={:?} player_hp={} enemies={} projectiles={}",
            state.time_ticks,
            state.phase(),
            player.map_or(0, |p| p.health().current()),
            state.enemies.len(),
            state.projectiles.len()
        );
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Combat Sim (headless) starting...");

    if let Err(e) = headless::run() {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Library-only on the web; hosts drive `combat_sim::sim::tick` directly
}
