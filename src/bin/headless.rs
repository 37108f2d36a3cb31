#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
use blockfall::schedule::{GameDriver, Ticker};
#[cfg(not(target_arch = "wasm32"))]
use blockfall::{Command, GameEvent, GameSession, GameSettings, RandomizerKind, COLS};
#[cfg(not(target_arch = "wasm32"))]
use clap::Parser;
#[cfg(not(target_arch = "wasm32"))]
use rand::rngs::StdRng;
#[cfg(not(target_arch = "wasm32"))]
use rand::{Rng, SeedableRng};
#[cfg(not(target_arch = "wasm32"))]
use std::path::PathBuf;
#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};
#[cfg(not(target_arch = "wasm32"))]
use tokio::sync::mpsc;
#[cfg(not(target_arch = "wasm32"))]
use tokio::task::JoinHandle;

/// Plays a game without a browser: a frame task and a one-second clock task feed
/// the session while a random player presses keys.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Parser, Debug, Clone)]
struct Opts {
    /// Settings JSON (same shape the browser client accepts)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for both the piece sequence and the random player
    #[arg(long)]
    seed: Option<u64>,
    /// Game milliseconds per real millisecond
    #[arg(long, default_value_t = 1.0)]
    time_scale: f64,
    /// Stop after this many game seconds even if the game is still running
    #[arg(long, default_value_t = 300)]
    max_secs: u64,
    /// Chance per frame that the player presses a key
    #[arg(long, default_value_t = 0.1)]
    press_chance: f64,
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
enum Tick {
    Frame(f64),
    Clock(f64),
}

#[cfg(not(target_arch = "wasm32"))]
struct TokioTask(JoinHandle<()>);

#[cfg(not(target_arch = "wasm32"))]
impl Ticker for TokioTask {
    fn cancel(&mut self) {
        self.0.abort();
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[derive(Clone, Copy)]
struct GameClock {
    origin: Instant,
    scale: f64,
}

#[cfg(not(target_arch = "wasm32"))]
impl GameClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0 * self.scale
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn spawn_periodic(
    period: Duration,
    clock: GameClock,
    tx: mpsc::UnboundedSender<Tick>,
    make: fn(f64) -> Tick,
) -> TokioTask {
    TokioTask(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(make(clock.now_ms())).is_err() {
                break;
            }
        }
    }))
}

#[cfg(not(target_arch = "wasm32"))]
fn load_settings(opts: &Opts) -> anyhow::Result<GameSettings> {
    let mut settings = match &opts.config {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => GameSettings::default(),
    };
    if let Some(seed) = opts.seed {
        settings.randomizer = RandomizerKind::Seeded { seed };
    }
    Ok(settings)
}

#[cfg(not(target_arch = "wasm32"))]
fn random_command(rng: &mut StdRng) -> Command {
    match rng.gen_range(0..4) {
        0 => Command::MoveLeft,
        1 => Command::MoveRight,
        2 => Command::Rotate,
        _ => Command::MoveDown,
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn print_board(session: &GameSession) {
    for row in session.board().rows() {
        let line: String = row
            .iter()
            .map(|&c| if c == 0 { '.' } else { char::from(b'0' + c) })
            .collect();
        println!("|{line}|");
    }
    println!("+{}+", "-".repeat(COLS));
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let opts = Opts::parse();
    anyhow::ensure!(opts.time_scale > 0.0, "--time-scale must be positive");
    let settings = load_settings(&opts)?;
    let mut player = match opts.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let clock = GameClock {
        origin: Instant::now(),
        scale: opts.time_scale,
    };
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut driver = GameDriver::new(settings);

    let second = Duration::from_secs_f64((1.0 / opts.time_scale).max(0.001));
    driver.start(
        clock.now_ms(),
        spawn_periodic(Duration::from_millis(16), clock, tx.clone(), Tick::Frame),
        spawn_periodic(second, clock, tx, Tick::Clock),
    );

    while let Some(tick) = rx.recv().await {
        match tick {
            Tick::Frame(now) => {
                if player.gen_bool(opts.press_chance.clamp(0.0, 1.0)) {
                    driver.command(random_command(&mut player), now);
                }
                driver.frame(now);
            }
            Tick::Clock(now) => {
                if let Some(secs) = driver.clock_tick(now) {
                    if secs >= opts.max_secs {
                        println!("time limit reached at {secs}s");
                        break;
                    }
                }
            }
        }
        for event in driver.take_events() {
            match event {
                GameEvent::LinesCleared { lines, points } => {
                    println!("cleared {lines} (+{points}), score {}", driver.session().score());
                }
                GameEvent::GameOver { message, .. } => println!("{message}"),
                GameEvent::Started => {}
            }
        }
        if !driver.session().is_running() {
            break;
        }
    }

    let session = driver.session();
    print_board(session);
    println!(
        "score {} lines {} time {}s",
        session.score(),
        session.lines(),
        session.elapsed_secs()
    );
    Ok(())
}
