//! Game controller
//!
//! Owns the [`GameState`], the seeded RNG and every timer handle. Timer fires
//! and input actions all funnel through [`Game`], so the simulation is only
//! ever mutated from one place. Every phase transition cancels the timers it
//! no longer needs before arming new ones; a fire from a handle the controller
//! no longer holds is dropped.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::FRAME_MS;
use crate::platform::{InputAction, Scheduler, TimerId, TimerKind, VirtualClock};
use crate::sim::{self, Arena, GameEvent, GamePhase, GameState};
use crate::tuning::Tuning;

/// Live timer handles, one slot per purpose
#[derive(Debug, Default, Clone, Copy)]
struct Timers {
    frame: Option<TimerId>,
    spawn: Option<TimerId>,
    level_up: Option<TimerId>,
    /// Intro poll or retry countdown, never both
    phase: Option<TimerId>,
}

impl Timers {
    fn slot(&mut self, kind: TimerKind) -> &mut Option<TimerId> {
        match kind {
            TimerKind::Frame => &mut self.frame,
            TimerKind::Spawn => &mut self.spawn,
            TimerKind::LevelUp => &mut self.level_up,
            TimerKind::Intro | TimerKind::Countdown => &mut self.phase,
        }
    }
}

pub struct Game {
    pub state: GameState,
    tuning: Tuning,
    rng: Pcg32,
    timers: Timers,
    /// Time spent in the first-load intro poll
    intro_elapsed_ms: f64,
    breathing: bool,
    events: Vec<GameEvent>,
}

impl Game {
    pub fn new(seed: u64, arena: Arena, tuning: Tuning) -> Self {
        Self {
            state: GameState::new(seed, arena, &tuning),
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            timers: Timers::default(),
            intro_elapsed_ms: 0.0,
            breathing: true,
            events: Vec::new(),
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Enable or disable the player's breathing animation
    pub fn set_breathing(&mut self, enabled: bool) {
        self.breathing = enabled;
    }

    /// Take the notifications queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// True while frames are advancing the simulation
    pub fn is_running(&self) -> bool {
        self.state.phase == GamePhase::Playing && !self.state.is_frozen()
    }

    /// First entry point after page load: show the intro
    pub fn boot(&mut self, sched: &mut dyn Scheduler) {
        log::info!("Booting (seed {})", self.state.seed);
        self.start_intro(sched);
    }

    /// Dispatch a fired timer
    pub fn handle_timer(&mut self, id: TimerId, kind: TimerKind, sched: &mut dyn Scheduler) {
        if *self.timers.slot(kind) != Some(id) {
            log::debug!("Ignoring stale {:?} timer {:?}", kind, id);
            return;
        }
        match kind {
            TimerKind::Frame => {
                self.timers.frame = None;
                self.on_frame(sched);
            }
            TimerKind::Spawn => {
                if !self.state.is_frozen() {
                    sim::spawn_object(&mut self.state, &mut self.rng);
                }
            }
            TimerKind::LevelUp => self.on_level_up(sched),
            TimerKind::Intro => self.poll_intro(sched),
            TimerKind::Countdown => self.tick_countdown(sched),
        }
    }

    /// Apply a player command
    pub fn apply(&mut self, action: InputAction, sched: &mut dyn Scheduler) {
        match action {
            InputAction::Move(direction) => sim::set_player_velocity(
                &mut self.state,
                direction,
                self.tuning.player_move_speed,
            ),
            InputAction::Stop => sim::stop_player(&mut self.state),
            InputAction::Pause => {
                self.pause(sched);
            }
            InputAction::Resume => {
                self.resume(sched);
            }
            InputAction::Retry => {
                self.retry(sched);
            }
        }
    }

    /// Freeze play: cancel the frame loop, spawn and level-up timers.
    ///
    /// Returns `false` (and does nothing) unless a run is actively playing.
    pub fn pause(&mut self, sched: &mut dyn Scheduler) -> bool {
        if !self.is_running() {
            log::debug!("Pause ignored in {:?}", self.state.phase);
            return false;
        }
        self.cancel(sched, TimerKind::Frame);
        self.cancel(sched, TimerKind::Spawn);
        self.cancel(sched, TimerKind::LevelUp);
        self.state.paused = true;
        self.events.push(GameEvent::Paused);
        log::info!("Paused");
        true
    }

    /// Restart the frame loop and both periodic timers. Only acts while paused.
    pub fn resume(&mut self, sched: &mut dyn Scheduler) -> bool {
        if !self.state.paused {
            log::debug!("Resume ignored: not paused");
            return false;
        }
        self.state.paused = false;
        self.arm_play_timers(sched);
        self.events.push(GameEvent::Resumed);
        log::info!("Resumed");
        true
    }

    /// Reset after game over and go back through the countdown (or the intro
    /// if play never started). Ignored in any other phase.
    pub fn retry(&mut self, sched: &mut dyn Scheduler) -> bool {
        if !self.state.game_over {
            log::debug!("Retry ignored in {:?}", self.state.phase);
            return false;
        }
        self.cancel_all(sched);
        self.state.reset_for_retry(&self.tuning);
        self.events.push(GameEvent::LivesChanged(self.state.lives));
        self.events.push(GameEvent::LevelChanged(self.state.level));
        log::info!("Retry");

        if self.state.game_started {
            self.start_countdown(sched);
        } else {
            self.start_intro(sched);
        }
        true
    }

    /// Canvas resized
    pub fn resize(&mut self, width: f32, height: f32) {
        self.state.resize(Arena::new(width, height));
    }

    /// Drive the controller from a [`VirtualClock`] for `ms` milliseconds
    pub fn run_for(&mut self, clock: &mut VirtualClock, ms: f64) {
        let until = clock.now_ms() + ms;
        while let Some((id, kind)) = clock.pop_due(until) {
            self.handle_timer(id, kind, clock);
        }
        clock.advance_to(until);
    }

    fn on_frame(&mut self, sched: &mut dyn Scheduler) {
        let outcome = sim::tick(&mut self.state, &self.tuning, self.breathing);
        if outcome.collisions.hits > 0 {
            self.events.push(GameEvent::LivesChanged(self.state.lives));
        }
        if outcome.game_over {
            self.end_run(sched);
            return;
        }
        if self.is_running() {
            self.request_frame(sched);
        }
    }

    fn on_level_up(&mut self, sched: &mut dyn Scheduler) {
        if self.state.is_frozen() || !sim::level_up(&mut self.state, &self.tuning) {
            return;
        }
        self.events.push(GameEvent::LevelChanged(self.state.level));
        // The new period only takes effect on a fresh timer
        self.cancel(sched, TimerKind::Spawn);
        self.timers.spawn =
            Some(sched.schedule_repeating(self.state.spawn_interval_ms, TimerKind::Spawn));
    }

    fn end_run(&mut self, sched: &mut dyn Scheduler) {
        self.cancel_all(sched);
        let level = self.state.level;
        let end_screen = level == self.tuning.max_level;
        log::info!(
            "Game over at level {} after {} ticks{}",
            level,
            self.state.time_ticks,
            if end_screen { " (final level)" } else { "" }
        );
        self.events.push(GameEvent::PhaseChanged(GamePhase::GameOver));
        self.events.push(GameEvent::GameOver { level, end_screen });
    }

    fn start_intro(&mut self, sched: &mut dyn Scheduler) {
        self.cancel(sched, TimerKind::Intro);
        self.intro_elapsed_ms = 0.0;
        self.set_phase(GamePhase::Intro);
        self.timers.phase =
            Some(sched.schedule_repeating(self.tuning.phase_poll_ms, TimerKind::Intro));
    }

    fn poll_intro(&mut self, sched: &mut dyn Scheduler) {
        self.intro_elapsed_ms += self.tuning.phase_poll_ms;
        let intro = self.tuning.intro_duration_ms;
        let total = intro + self.tuning.countdown_duration_ms;

        if self.intro_elapsed_ms < intro {
            self.set_phase(GamePhase::Intro);
        } else if self.intro_elapsed_ms < total {
            self.set_phase(GamePhase::Countdown);
            let remaining = ((total - self.intro_elapsed_ms) / 1000.0).ceil() as u32;
            self.set_countdown(remaining);
        } else {
            self.cancel(sched, TimerKind::Intro);
            self.start_game(sched);
        }
    }

    fn start_countdown(&mut self, sched: &mut dyn Scheduler) {
        self.cancel(sched, TimerKind::Countdown);
        self.set_phase(GamePhase::Countdown);
        self.set_countdown(self.tuning.countdown_start);
        self.timers.phase =
            Some(sched.schedule_repeating(self.tuning.phase_poll_ms, TimerKind::Countdown));
    }

    fn tick_countdown(&mut self, sched: &mut dyn Scheduler) {
        let next = self.state.countdown.saturating_sub(1);
        self.set_countdown(next);
        if next == 0 {
            self.cancel(sched, TimerKind::Countdown);
            self.start_game(sched);
        }
    }

    fn start_game(&mut self, sched: &mut dyn Scheduler) {
        self.state.game_started = true;
        self.set_phase(GamePhase::Playing);
        sim::spawn_object(&mut self.state, &mut self.rng);
        self.arm_play_timers(sched);
    }

    /// (Re)create the spawn and level-up timers and make sure a frame is pending
    fn arm_play_timers(&mut self, sched: &mut dyn Scheduler) {
        self.cancel(sched, TimerKind::Spawn);
        self.cancel(sched, TimerKind::LevelUp);
        self.timers.spawn =
            Some(sched.schedule_repeating(self.state.spawn_interval_ms, TimerKind::Spawn));
        self.timers.level_up =
            Some(sched.schedule_repeating(self.tuning.level_up_interval_ms, TimerKind::LevelUp));
        self.request_frame(sched);
    }

    fn request_frame(&mut self, sched: &mut dyn Scheduler) {
        if self.timers.frame.is_none() {
            self.timers.frame = Some(sched.schedule_once(FRAME_MS, TimerKind::Frame));
        }
    }

    fn cancel(&mut self, sched: &mut dyn Scheduler, kind: TimerKind) {
        if let Some(id) = self.timers.slot(kind).take() {
            sched.cancel(id);
        }
    }

    fn cancel_all(&mut self, sched: &mut dyn Scheduler) {
        for kind in [
            TimerKind::Frame,
            TimerKind::Spawn,
            TimerKind::LevelUp,
            TimerKind::Intro,
        ] {
            self.cancel(sched, kind);
        }
    }

    fn set_phase(&mut self, phase: GamePhase) {
        if self.state.phase != phase {
            log::info!("Phase {:?} -> {:?}", self.state.phase, phase);
            self.state.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    fn set_countdown(&mut self, value: u32) {
        self.state.countdown = value;
        self.events.push(GameEvent::CountdownChanged(value));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::Direction;

    const START_MS: f64 = 13000.0;

    fn booted(tuning: Tuning, width: f32) -> (Game, VirtualClock) {
        let mut clock = VirtualClock::new();
        let mut game = Game::new(42, Arena::new(width, 600.0), tuning);
        game.boot(&mut clock);
        (game, clock)
    }

    /// Lives high enough that nothing ends the run by accident
    fn immortal() -> Tuning {
        Tuning {
            initial_lives: 1_000_000,
            ..Default::default()
        }
    }

    fn playing(tuning: Tuning, width: f32) -> (Game, VirtualClock) {
        let (mut game, mut clock) = booted(tuning, width);
        game.run_for(&mut clock, START_MS);
        assert_eq!(game.state.phase, GamePhase::Playing);
        (game, clock)
    }

    fn play_timers(clock: &VirtualClock) -> (usize, usize, usize) {
        (
            clock.scheduled(TimerKind::Frame),
            clock.scheduled(TimerKind::Spawn),
            clock.scheduled(TimerKind::LevelUp),
        )
    }

    #[test]
    fn test_intro_then_countdown_then_play() {
        let (mut game, mut clock) = booted(immortal(), 800.0);
        assert_eq!(game.state.phase, GamePhase::Intro);

        game.run_for(&mut clock, 9999.0);
        assert_eq!(game.state.phase, GamePhase::Intro);
        assert!(game.state.objects.is_empty());

        game.run_for(&mut clock, 1.0);
        assert_eq!(game.state.phase, GamePhase::Countdown);
        assert_eq!(game.state.countdown, 3);

        game.run_for(&mut clock, 2000.0);
        assert_eq!(game.state.countdown, 1);

        game.run_for(&mut clock, 1000.0);
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert!(game.state.game_started);
        assert_eq!(game.state.objects.len(), 1);
        assert_eq!(clock.scheduled(TimerKind::Intro), 0);
        assert_eq!(play_timers(&clock), (1, 1, 1));

        let events = game.drain_events();
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::Countdown)));
        assert!(events.contains(&GameEvent::CountdownChanged(2)));
        assert!(events.contains(&GameEvent::PhaseChanged(GamePhase::Playing)));
    }

    #[test]
    fn test_frames_run_at_display_rate() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        game.run_for(&mut clock, 1000.0);
        assert!((59..=60).contains(&game.state.time_ticks));
        assert_eq!(clock.scheduled(TimerKind::Frame), 1);
    }

    #[test]
    fn test_spawn_cadence() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        let spawned_before = game.state.next_entity_id();
        game.run_for(&mut clock, 4500.0);
        // Three more spawns at 1500 ms each; ids are allocated in order
        assert_eq!(game.state.next_entity_id(), spawned_before + 4);
    }

    #[test]
    fn test_level_up_restarts_spawn_timer() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        game.run_for(&mut clock, 15000.0);
        assert_eq!(game.state.level, 2);
        assert!((game.state.spawn_interval_ms - 1050.0).abs() < 1e-9);
        assert!((game.state.object_speed - 5.5).abs() < 1e-6);
        assert_eq!(clock.scheduled(TimerKind::Spawn), 1);
        assert!(game.drain_events().contains(&GameEvent::LevelChanged(2)));

        // The replacement timer runs at the shorter period
        let before = game.state.next_entity_id();
        game.run_for(&mut clock, 4201.0);
        assert_eq!(game.state.next_entity_id(), before + 5);
    }

    #[test]
    fn test_level_capped() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        game.run_for(&mut clock, 15000.0 * 12.0);
        assert_eq!(game.state.level, 10);
        assert!((game.state.object_speed - 17.5).abs() < 1e-4);
        assert!((game.state.spawn_interval_ms - 1500.0 * 0.7f64.powi(9)).abs() < 1e-6);
    }

    #[test]
    fn test_pause_freezes_everything() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        game.apply(InputAction::Move(Direction::Right), &mut clock);
        game.run_for(&mut clock, 500.0);

        assert!(game.pause(&mut clock));
        assert!(!game.pause(&mut clock));
        assert_eq!(play_timers(&clock), (0, 0, 0));

        let snapshot = game.state.clone();
        game.run_for(&mut clock, 60_000.0);
        assert_eq!(game.state.player.pos, snapshot.player.pos);
        assert_eq!(game.state.objects, snapshot.objects);
        assert_eq!(game.state.lives, snapshot.lives);
        assert_eq!(game.state.level, snapshot.level);
        assert_eq!(game.state.time_ticks, snapshot.time_ticks);

        assert!(game.resume(&mut clock));
        assert!(!game.resume(&mut clock));
        assert_eq!(play_timers(&clock), (1, 1, 1));
        game.run_for(&mut clock, 100.0);
        assert!(game.state.time_ticks > snapshot.time_ticks);
    }

    #[test]
    fn test_repeated_pause_resume_never_duplicates_loops() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        for _ in 0..10 {
            game.apply(InputAction::Pause, &mut clock);
            game.apply(InputAction::Pause, &mut clock);
            game.apply(InputAction::Resume, &mut clock);
            game.apply(InputAction::Resume, &mut clock);
            game.run_for(&mut clock, 50.0);
        }
        assert_eq!(play_timers(&clock), (1, 1, 1));
        let before = game.state.time_ticks;
        game.run_for(&mut clock, 1000.0);
        assert!(game.state.time_ticks - before <= 60);
    }

    #[test]
    fn test_pause_ignored_outside_play() {
        let (mut game, mut clock) = booted(immortal(), 800.0);
        assert!(!game.pause(&mut clock));
        assert!(!game.state.paused);
        game.run_for(&mut clock, START_MS);
        assert_eq!(game.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_game_over_cancels_everything() {
        // 300 wide: every object spans the full width and lands on the player
        let tuning = Tuning {
            initial_lives: 1,
            ..Default::default()
        };
        let (mut game, mut clock) = playing(tuning, 300.0);
        game.drain_events();
        game.run_for(&mut clock, 5000.0);

        assert!(game.state.game_over);
        assert_eq!(game.state.phase, GamePhase::GameOver);
        assert_eq!(game.state.lives, 0);
        assert!(clock.is_empty());

        let events = game.drain_events();
        let overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);
        assert!(events.contains(&GameEvent::GameOver {
            level: 1,
            end_screen: false
        }));

        // Nothing moves afterwards
        let ticks = game.state.time_ticks;
        game.run_for(&mut clock, 10_000.0);
        assert_eq!(game.state.time_ticks, ticks);
        assert!(game.drain_events().is_empty());
    }

    #[test]
    fn test_end_screen_on_final_level() {
        let tuning = Tuning {
            initial_lives: 1,
            max_level: 1,
            ..Default::default()
        };
        let (mut game, mut clock) = playing(tuning, 300.0);
        game.run_for(&mut clock, 5000.0);
        assert!(game.drain_events().contains(&GameEvent::GameOver {
            level: 1,
            end_screen: true
        }));
    }

    #[test]
    fn test_retry_skips_intro() {
        let tuning = Tuning {
            initial_lives: 1,
            ..Default::default()
        };
        let (mut game, mut clock) = playing(tuning, 300.0);
        game.run_for(&mut clock, 5000.0);
        assert!(game.state.game_over);

        assert!(game.retry(&mut clock));
        assert_eq!(game.state.phase, GamePhase::Countdown);
        assert_eq!(game.state.countdown, 3);
        assert_eq!(game.state.lives, 1);
        assert_eq!(game.state.level, 1);
        assert_eq!(game.state.object_speed, 4.0);
        assert_eq!(game.state.spawn_interval_ms, 4000.0);
        assert!(game.state.objects.is_empty());
        assert!(!game.state.game_over);
        assert_eq!(clock.len(), 1);
        assert_eq!(clock.scheduled(TimerKind::Countdown), 1);

        game.run_for(&mut clock, 2999.0);
        assert_eq!(game.state.phase, GamePhase::Countdown);
        game.run_for(&mut clock, 1.0);
        assert_eq!(game.state.phase, GamePhase::Playing);
        assert_eq!(play_timers(&clock), (1, 1, 1));
    }

    #[test]
    fn test_retry_before_first_run_replays_intro() {
        let (mut game, mut clock) = booted(immortal(), 800.0);
        game.run_for(&mut clock, 2000.0);
        game.state.game_over = true;
        game.state.phase = GamePhase::GameOver;
        assert!(!game.state.game_started);

        assert!(game.retry(&mut clock));
        assert_eq!(game.state.phase, GamePhase::Intro);
        assert_eq!(clock.len(), 1);
        assert_eq!(clock.scheduled(TimerKind::Intro), 1);
        assert_eq!(clock.scheduled(TimerKind::Countdown), 0);

        // The intro restarts from the beginning
        game.run_for(&mut clock, 9999.0);
        assert_eq!(game.state.phase, GamePhase::Intro);
        game.run_for(&mut clock, 3001.0);
        assert_eq!(game.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_zero_lives_run_ends_on_first_hit() {
        let tuning = Tuning {
            initial_lives: 0,
            ..Default::default()
        };
        let (mut game, mut clock) = playing(tuning, 300.0);
        game.run_for(&mut clock, 5000.0);

        assert!(game.state.game_over);
        assert_eq!(game.state.phase, GamePhase::GameOver);
        assert_eq!(game.state.lives, 0);
        assert!(clock.is_empty());
    }

    #[test]
    fn test_retry_ignored_while_playing() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        game.run_for(&mut clock, 2000.0);
        let level = game.state.level;
        let objects = game.state.objects.len();
        assert!(!game.retry(&mut clock));
        assert_eq!(game.state.level, level);
        assert_eq!(game.state.objects.len(), objects);
        assert_eq!(game.state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_stale_timer_is_ignored() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        let objects = game.state.objects.len();
        game.handle_timer(TimerId(9999), TimerKind::Spawn, &mut clock);
        assert_eq!(game.state.objects.len(), objects);
    }

    #[test]
    fn test_resize_keeps_player_inside() {
        let (mut game, mut clock) = playing(immortal(), 800.0);
        game.apply(InputAction::Move(Direction::Right), &mut clock);
        game.run_for(&mut clock, 1000.0);
        assert_eq!(game.state.player.pos.x, 750.0);
        game.resize(400.0, 600.0);
        assert_eq!(game.state.player.pos.x, 350.0);
    }
}
