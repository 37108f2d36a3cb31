use serde::{Deserialize, Serialize};

use crate::board::{Board, COLS, ROWS};
use crate::gravity::{FallTimer, GravityCurve};
use crate::input::{Command, ControlBindings};
use crate::log;
use crate::piece::ActivePiece;
use crate::randomizer::{randomizer_from_kind, Randomizer, RandomizerKind};
use crate::scoring::line_clear_points;
use crate::shape::Shape;

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
#[serde(default)]
pub struct GameSettings {
    pub gravity: GravityCurve,
    pub randomizer: RandomizerKind,
    pub controls: ControlBindings,
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Idle,
    Running,
    Over,
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    Started,
    LinesCleared { lines: usize, points: u32 },
    #[serde(rename_all = "camelCase")]
    GameOver { final_score: u32, message: String },
}

/// Result of a single move-down step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Not running; nothing happened.
    Ignored,
    Fell,
    Locked { lines: usize },
    ToppedOut,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub rows: usize,
    pub cols: usize,
    pub board: Vec<u8>,
    pub active: Option<ActiveView>,
    pub score: u32,
    pub lines: u32,
    pub status: GameStatus,
    pub elapsed_secs: u64,
    pub fall_interval_ms: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveView {
    pub shape: Shape,
    pub x: i32,
    pub y: i32,
    pub color: u8,
}

pub struct GameSession {
    settings: GameSettings,
    board: Board,
    active: Option<ActivePiece>,
    randomizer: Box<dyn Randomizer>,
    fall: FallTimer,
    score: u32,
    lines: u32,
    status: GameStatus,
    started_at_ms: f64,
    elapsed_secs: u64,
    events: Vec<GameEvent>,
}

impl GameSession {
    pub fn new(settings: GameSettings) -> Self {
        Self {
            board: Board::new(),
            active: None,
            randomizer: randomizer_from_kind(&settings.randomizer),
            fall: FallTimer::new(settings.gravity),
            score: 0,
            lines: 0,
            status: GameStatus::Idle,
            started_at_ms: 0.0,
            elapsed_secs: 0,
            events: Vec::new(),
            settings,
        }
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn active(&self) -> Option<&ActivePiece> {
        self.active.as_ref()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == GameStatus::Running
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    pub fn fall_interval_ms(&self) -> u32 {
        self.fall.interval_ms()
    }

    /// Starts a fresh game, discarding any game in progress. `now_ms` is the wall
    /// clock that later `clock_tick` calls are measured against.
    pub fn start(&mut self, now_ms: f64) {
        self.board = Board::new();
        self.randomizer = randomizer_from_kind(&self.settings.randomizer);
        self.active = Some(self.randomizer.next_piece());
        self.fall = FallTimer::new(self.settings.gravity);
        self.score = 0;
        self.lines = 0;
        self.started_at_ms = now_ms;
        self.elapsed_secs = 0;
        self.status = GameStatus::Running;
        self.events.push(GameEvent::Started);
        log("game started");
    }

    pub fn move_left(&mut self) -> bool {
        self.try_shift(-1)
    }

    pub fn move_right(&mut self) -> bool {
        self.try_shift(1)
    }

    fn try_shift(&mut self, dir: i32) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        if self.board.collision(&piece.shape, piece.x + dir, piece.y) {
            return false;
        }
        piece.x += dir;
        true
    }

    /// Clockwise quarter turn in place. No kicks: a blocked turn is dropped.
    pub fn rotate(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let Some(piece) = self.active.as_mut() else {
            return false;
        };
        let rotated = piece.shape.rotated_cw();
        if self.board.collision(&rotated, piece.x, piece.y) {
            return false;
        }
        piece.shape = rotated;
        true
    }

    /// One row of gravity, locking the piece when it cannot fall.
    pub fn move_down(&mut self) -> DropOutcome {
        if !self.is_running() {
            return DropOutcome::Ignored;
        }
        let Some(piece) = self.active.as_mut() else {
            return DropOutcome::Ignored;
        };
        if !self.board.collision(&piece.shape, piece.x, piece.y + 1) {
            piece.y += 1;
            return DropOutcome::Fell;
        }
        self.lock_active()
    }

    /// Player-requested drop: a move-down that also restarts the gravity counter.
    pub fn soft_drop(&mut self) -> DropOutcome {
        let outcome = self.move_down();
        if outcome != DropOutcome::Ignored {
            self.fall.reset_counter();
        }
        outcome
    }

    fn lock_active(&mut self) -> DropOutcome {
        let Some(piece) = self.active.take() else {
            return DropOutcome::Ignored;
        };
        self.board.lock_piece(&piece);

        if piece.y < 1 {
            self.game_over();
            return DropOutcome::ToppedOut;
        }

        let cleared = self.board.clear_lines();
        if cleared > 0 {
            let points = line_clear_points(cleared);
            self.score = self.score.saturating_add(points);
            self.lines = self.lines.saturating_add(cleared as u32);
            self.events.push(GameEvent::LinesCleared {
                lines: cleared,
                points,
            });
            if cleared > 1 {
                log(&format!("cleared {cleared} lines for {points}"));
            }
        }
        self.active = Some(self.randomizer.next_piece());
        DropOutcome::Locked { lines: cleared }
    }

    fn game_over(&mut self) {
        self.status = GameStatus::Over;
        let message = format!("Game Over! Final Score: {}", self.score);
        log(&message);
        self.events.push(GameEvent::GameOver {
            final_score: self.score,
            message,
        });
    }

    /// Per display frame. Returns true when gravity moved or locked the piece.
    pub fn frame(&mut self, time_ms: f64) -> bool {
        if !self.is_running() {
            return false;
        }
        if self.fall.on_frame(time_ms) {
            self.move_down();
            return true;
        }
        false
    }

    /// Per wall-clock second. Returns whole seconds since start, or None when idle
    /// or over.
    pub fn clock_tick(&mut self, now_ms: f64) -> Option<u64> {
        if !self.is_running() {
            return None;
        }
        let elapsed = ((now_ms - self.started_at_ms).max(0.0) / 1000.0).floor() as u64;
        self.elapsed_secs = elapsed;
        if self.fall.on_elapsed(elapsed) {
            log(&format!(
                "fall interval now {}ms at {elapsed}s",
                self.fall.interval_ms()
            ));
        }
        Some(elapsed)
    }

    /// Runs one input command. Everything but `Start` is ignored unless running.
    pub fn apply(&mut self, command: Command, now_ms: f64) -> bool {
        match command {
            Command::Start => {
                self.start(now_ms);
                true
            }
            Command::MoveLeft => self.move_left(),
            Command::MoveRight => self.move_right(),
            Command::MoveDown => self.soft_drop() != DropOutcome::Ignored,
            Command::Rotate => self.rotate(),
        }
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SessionView {
        let mut board = Vec::with_capacity(ROWS * COLS);
        for row in self.board.rows() {
            board.extend_from_slice(row);
        }
        SessionView {
            rows: ROWS,
            cols: COLS,
            board,
            active: self.active.as_ref().map(|p| ActiveView {
                shape: p.shape,
                x: p.x,
                y: p.y,
                color: p.color,
            }),
            score: self.score,
            lines: self.lines,
            status: self.status,
            elapsed_secs: self.elapsed_secs,
            fall_interval_ms: self.fall.interval_ms(),
        }
    }

    #[cfg(test)]
    pub(crate) fn set_board(&mut self, board: Board) {
        self.board = board;
    }

    #[cfg(test)]
    pub(crate) fn set_active(&mut self, piece: ActivePiece) {
        self.active = Some(piece);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Tetromino;

    fn session_with(piece: Tetromino) -> GameSession {
        let mut s = GameSession::new(GameSettings {
            randomizer: RandomizerKind::SinglePiece { piece },
            ..GameSettings::default()
        });
        s.start(0.0);
        s
    }

    #[test]
    fn new_session_is_idle_and_ignores_input() {
        let mut s = GameSession::new(GameSettings::default());
        assert_eq!(s.status(), GameStatus::Idle);
        assert!(s.active().is_none());
        assert!(!s.move_left());
        assert!(!s.rotate());
        assert_eq!(s.move_down(), DropOutcome::Ignored);
        assert!(!s.frame(5000.0));
        assert_eq!(s.clock_tick(5000.0), None);
    }

    #[test]
    fn start_spawns_centered_piece() {
        let s = session_with(Tetromino::O);
        let piece = s.active().unwrap();
        assert_eq!((piece.x, piece.y, piece.color), (4, 0, 2));
        assert!(s.board().is_empty());
        assert_eq!(s.fall_interval_ms(), 1000);
    }

    #[test]
    fn free_fall_moves_one_row_and_leaves_board() {
        let mut s = session_with(Tetromino::T);
        assert_eq!(s.move_down(), DropOutcome::Fell);
        assert_eq!(s.active().unwrap().y, 1);
        assert!(s.board().is_empty());
    }

    #[test]
    fn o_piece_lands_on_floor() {
        let mut s = session_with(Tetromino::O);
        for _ in 0..18 {
            assert_eq!(s.move_down(), DropOutcome::Fell);
        }
        assert_eq!(s.move_down(), DropOutcome::Locked { lines: 0 });
        for (r, c) in [(18, 4), (18, 5), (19, 4), (19, 5)] {
            assert_eq!(s.board().cell(r, c), 2);
        }
        assert_eq!(s.status(), GameStatus::Running);
        assert_eq!(s.active().unwrap().y, 0);
    }

    #[test]
    fn lock_on_spawn_row_ends_game() {
        let mut s = session_with(Tetromino::O);
        let mut board = Board::new();
        board.set(3, 4, 1);
        s.set_board(board);
        assert_eq!(s.move_down(), DropOutcome::Fell);
        // origin row 1 now; blocked below, so this lock is not a top out
        assert_eq!(s.move_down(), DropOutcome::Locked { lines: 0 });
        assert_eq!(s.move_down(), DropOutcome::ToppedOut);
        assert_eq!(s.status(), GameStatus::Over);
        let events = s.take_events();
        assert_eq!(
            events.last(),
            Some(&GameEvent::GameOver {
                final_score: 0,
                message: "Game Over! Final Score: 0".to_string()
            })
        );
        assert!(!s.move_left());
        assert!(!s.frame(10_000.0));
    }

    #[test]
    fn walls_reject_shifts() {
        let mut s = session_with(Tetromino::O);
        for _ in 0..4 {
            assert!(s.move_left());
        }
        assert!(!s.move_left());
        assert_eq!(s.active().unwrap().x, 0);
        for _ in 0..8 {
            assert!(s.move_right());
        }
        assert!(!s.move_right());
        assert_eq!(s.active().unwrap().x, 8);
    }

    #[test]
    fn blocked_rotation_keeps_shape() {
        let mut s = session_with(Tetromino::I);
        // vertical I hugging the left wall; turning it would poke out
        while s.move_left() {}
        let before = s.active().unwrap().shape;
        assert!(!s.rotate());
        assert_eq!(s.active().unwrap().shape, before);
        assert!(s.move_right());
        assert!(s.rotate());
        assert_ne!(s.active().unwrap().shape, before);
    }

    #[test]
    fn clearing_rows_scores_quadratically() {
        let mut s = session_with(Tetromino::I);
        let mut cells = [[0u8; COLS]; ROWS];
        for row in 16..20 {
            cells[row] = [3; COLS];
            cells[row][0] = 0;
        }
        s.set_board(Board::from_rows(cells));
        let mut piece = ActivePiece::new(Tetromino::I);
        piece.x = -1;
        piece.y = 15;
        s.set_active(piece);

        assert_eq!(s.move_down(), DropOutcome::Fell);
        assert_eq!(s.move_down(), DropOutcome::Locked { lines: 4 });
        assert_eq!(s.score(), 160);
        assert_eq!(s.lines(), 4);
        assert!(s.board().is_empty());
    }

    #[test]
    fn frame_gravity_drops_after_interval() {
        let mut s = session_with(Tetromino::T);
        assert!(!s.frame(100.0));
        assert!(!s.frame(1100.0));
        assert!(s.frame(1101.0));
        assert_eq!(s.active().unwrap().y, 1);
    }

    #[test]
    fn soft_drop_resets_gravity_counter() {
        let mut s = session_with(Tetromino::T);
        s.frame(0.0);
        s.frame(990.0);
        assert_eq!(s.soft_drop(), DropOutcome::Fell);
        assert!(!s.frame(1500.0));
        assert_eq!(s.active().unwrap().y, 1);
    }

    #[test]
    fn clock_tick_speeds_up_gravity() {
        let mut s = GameSession::new(GameSettings::default());
        s.start(10_000.0);
        assert_eq!(s.clock_tick(11_000.0), Some(1));
        assert_eq!(s.fall_interval_ms(), 1000);
        assert_eq!(s.clock_tick(40_000.0), Some(30));
        assert_eq!(s.fall_interval_ms(), 900);
        assert_eq!(s.clock_tick(10_000.0 + 3_600_000.0), Some(3600));
        assert_eq!(s.fall_interval_ms(), 200);
    }

    #[test]
    fn restart_resets_everything() {
        let mut s = session_with(Tetromino::O);
        s.clock_tick(61_000.0);
        while s.status() == GameStatus::Running {
            s.move_down();
        }
        assert!(!s.board().is_empty());
        assert!(s.apply(Command::Start, 100_000.0));
        assert_eq!(s.status(), GameStatus::Running);
        assert!(s.board().is_empty());
        assert_eq!(s.score(), 0);
        assert_eq!(s.fall_interval_ms(), 1000);
        assert_eq!(s.elapsed_secs(), 0);
    }

    #[test]
    fn snapshot_serializes_flat_board() {
        let s = session_with(Tetromino::O);
        let json = serde_json::to_value(s.snapshot()).unwrap();
        assert_eq!(json["board"].as_array().unwrap().len(), ROWS * COLS);
        assert_eq!(json["status"], "Running");
        assert_eq!(json["active"]["shape"], serde_json::json!([[1, 1], [1, 1]]));
        assert_eq!(json["fallIntervalMs"], 1000);
    }
}
