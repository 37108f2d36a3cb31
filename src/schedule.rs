use crate::input::Command;
use crate::session::{GameEvent, GameSession, GameSettings, GameStatus};

/// A periodic callback chain that can be stopped.
pub trait Ticker {
    fn cancel(&mut self);
}

/// The two periodic tasks a running game owns: the per-frame loop and the
/// one-second wall clock. They are always started and stopped as a pair.
pub struct SessionTimers<T: Ticker> {
    frame: Option<T>,
    clock: Option<T>,
}

impl<T: Ticker> Default for SessionTimers<T> {
    fn default() -> Self {
        Self {
            frame: None,
            clock: None,
        }
    }
}

impl<T: Ticker> SessionTimers<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stops whatever pair is still live, then takes ownership of the new one.
    pub fn install(&mut self, frame: T, clock: T) {
        self.cancel_all();
        self.frame = Some(frame);
        self.clock = Some(clock);
    }

    pub fn cancel_all(&mut self) {
        if let Some(mut frame) = self.frame.take() {
            frame.cancel();
        }
        if let Some(mut clock) = self.clock.take() {
            clock.cancel();
        }
    }

    #[cfg(test)]
    pub(crate) fn is_running(&self) -> bool {
        self.frame.is_some() || self.clock.is_some()
    }
}

impl<T: Ticker> Drop for SessionTimers<T> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// A session together with the tasks that drive it. Every entry point that can
/// end the game stops both tasks before returning.
pub struct GameDriver<T: Ticker> {
    session: GameSession,
    timers: SessionTimers<T>,
}

impl<T: Ticker> GameDriver<T> {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            session: GameSession::new(settings),
            timers: SessionTimers::new(),
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    /// Starts or restarts the game with a fresh pair of tasks. The previous pair,
    /// if any, is cancelled first.
    pub fn start(&mut self, now_ms: f64, frame: T, clock: T) {
        self.timers.cancel_all();
        self.session.start(now_ms);
        self.timers.install(frame, clock);
    }

    pub fn frame(&mut self, time_ms: f64) -> bool {
        let moved = self.session.frame(time_ms);
        self.settle();
        moved
    }

    pub fn clock_tick(&mut self, now_ms: f64) -> Option<u64> {
        let elapsed = self.session.clock_tick(now_ms);
        self.settle();
        elapsed
    }

    /// Runs a player command. `Start` is refused here: a restart needs new tasks,
    /// so it goes through [`GameDriver::start`].
    pub fn command(&mut self, command: Command, now_ms: f64) -> bool {
        if command == Command::Start {
            return false;
        }
        let applied = self.session.apply(command, now_ms);
        self.settle();
        applied
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        self.session.take_events()
    }

    fn settle(&mut self) {
        if self.session.status() == GameStatus::Over {
            self.timers.cancel_all();
        }
    }

    #[cfg(test)]
    pub(crate) fn timers_running(&self) -> bool {
        self.timers.is_running()
    }
}
