mod arena;
mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers,
        KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::thread_rng;
use tracing::{error, info, warn};

use arena::Arena;
use vertical_shooter::compute::{FrameEvent, Simulation};
use vertical_shooter::config::GameConfig;
use vertical_shooter::entities::{GameStatus, InputState};
use vertical_shooter::spawn::SpawnSchedule;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest simulated step; a stalled terminal must not teleport everything.
const MAX_DT: f32 = 0.1;

/// Stage used when no stage file is given on the command line.
const DEFAULT_STAGE: &str = "\
# delay,type,lane
1.0,EnemyS,2
0.5,EnemyS,4
0.5,EnemyS,6
1.5,EnemyM,1
0.0,EnemyM,8
2.0,EnemyS,3
0.3,EnemyS,5
0.3,EnemyS,7
2.0,EnemyL,4
3.0,EnemyS,0
0.4,EnemyS,9
1.0,EnemyM,5
2.0,EnemyL,2
0.0,EnemyL,7
4.0,EnemyB,4
";

// ── Held-key input ────────────────────────────────────────────────────────────

/// Frames a key stays held after its last press or repeat.  Terminals
/// without release events rely on OS key repeat (15 Hz or faster) to keep
/// refreshing it.
const HOLD_WINDOW: u64 = 4;

fn is_held(key_frame: &HashMap<KeyCode, u64>, key: &KeyCode, frame: u64) -> bool {
    key_frame
        .get(key)
        .is_some_and(|&last| frame.saturating_sub(last) <= HOLD_WINDOW)
}

fn any_held(key_frame: &HashMap<KeyCode, u64>, keys: &[KeyCode], frame: u64) -> bool {
    keys.iter().any(|key| is_held(key_frame, key, frame))
}

fn read_input(key_frame: &HashMap<KeyCode, u64>, frame: u64, boom: bool) -> InputState {
    let axis = |neg: &[KeyCode], pos: &[KeyCode]| -> f32 {
        let mut v = 0.0;
        if any_held(key_frame, neg, frame) {
            v -= 1.0;
        }
        if any_held(key_frame, pos, frame) {
            v += 1.0;
        }
        v
    };
    InputState {
        move_x: axis(
            &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')],
            &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')],
        ),
        move_y: axis(
            &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')],
            &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')],
        ),
        fire: is_held(key_frame, &KeyCode::Char(' '), frame),
        boom,
    }
}

// ── High-score persistence ────────────────────────────────────────────────────

fn high_score_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".vertical_shooter_score")
}

fn load_high_score() -> u32 {
    std::fs::read_to_string(high_score_path())
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(0)
}

fn save_high_score(score: u32) {
    if let Err(err) = std::fs::write(high_score_path(), score.to_string()) {
        warn!(%err, "high score not saved");
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// The terminal belongs to the game, so logs go to a file.
fn init_logging() {
    let path = std::env::temp_dir().join("vertical_shooter.log");
    let Ok(file) = File::create(&path) else {
        return;
    };
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .init();
    info!(path = %path.display(), "logging started");
}

fn load_stage(path: Option<&Path>) -> SpawnSchedule {
    let Some(path) = path else {
        return SpawnSchedule::from_text(DEFAULT_STAGE).0;
    };
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) => {
            error!(path = %path.display(), %err, "stage unreadable, using built-in stage");
            return SpawnSchedule::from_text(DEFAULT_STAGE).0;
        }
    };
    let parsed = if path.extension().is_some_and(|ext| ext == "json") {
        SpawnSchedule::from_json(&text)
    } else {
        Ok(SpawnSchedule::from_text(&text))
    };
    match parsed {
        Ok((schedule, _rejected)) => schedule,
        Err(err) => {
            error!(%err, "stage unusable, using built-in stage");
            SpawnSchedule::from_text(DEFAULT_STAGE).0
        }
    }
}

fn load_config(path: Option<&Path>) -> GameConfig {
    let Some(path) = path else {
        return GameConfig::default();
    };
    match GameConfig::load(path) {
        Ok(config) => config,
        Err(err) => {
            error!(%err, "config rejected, using defaults");
            GameConfig::default()
        }
    }
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start,
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "★  VERTICAL  SHOOTER  ★";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    // Item legend
    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(2)))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Items (dropped by enemies):"))?;

    let item_info: &[(&str, Color, &str)] = &[
        ("$", Color::Yellow, " Coin  : bonus score"),
        ("P", Color::Cyan, " Power : wider shot, escorts at 4-6"),
        ("B", Color::Red, " Boom  : clears the screen"),
    ];
    for (i, (sym, color, desc)) in item_info.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    let start = "ENTER : Start   Q : Quit";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(start.chars().count() as u16 / 2),
        cy + 4,
    ))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print(start))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    loop {
        if let Ok(Event::Key(KeyEvent { code, kind: KeyEventKind::Press, .. })) = rx.recv() {
            match code {
                KeyCode::Enter | KeyCode::Char(' ') => return Ok(MenuResult::Start),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Returns `true` → quit program,  `false` → back to menu.
///
/// Held keys are tracked in `key_frame` (frame of the last press/repeat per
/// key) so movement, fire and boom combine freely.  Boom is edge-triggered:
/// only a fresh press this frame counts.
fn game_loop<W: Write>(
    out: &mut W,
    sim: &mut Simulation,
    stage: &SpawnSchedule,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
) -> std::io::Result<bool> {
    let mut rng = thread_rng();
    let mut arena = Arena;

    let mut key_frame: HashMap<KeyCode, u64> = HashMap::new();
    let mut frame: u64 = 0;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();
        frame += 1;
        let mut boom = false;

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(Event::Key(KeyEvent { code, kind, modifiers, .. })) = rx.try_recv() {
            match kind {
                KeyEventKind::Press => {
                    key_frame.insert(code.clone(), frame);
                    match code {
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                            return Ok(true);
                        }
                        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                            return Ok(true);
                        }
                        KeyCode::Char('r') | KeyCode::Char('R')
                            if sim.status == GameStatus::GameOver =>
                        {
                            return Ok(false);
                        }
                        KeyCode::Char('b') | KeyCode::Char('B') => boom = true,
                        _ => {}
                    }
                }
                KeyEventKind::Repeat => {
                    key_frame.insert(code.clone(), frame);
                }
                KeyEventKind::Release => {
                    key_frame.remove(&code);
                }
            }
        }

        let dt = last.elapsed().as_secs_f32().min(MAX_DT);
        last = Instant::now();

        let input = read_input(&key_frame, frame, boom);
        sim.tick(dt, &input, &mut arena, &mut rng);

        let mut stage_complete = false;
        for event in sim.drain_events() {
            if event == FrameEvent::StageComplete {
                stage_complete = true;
            }
        }
        if stage_complete {
            sim.load_stage(stage.clone());
        }

        let (width, height) = terminal::size()?;
        display::render(out, sim, width, height, high_score)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            std::thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Usage: `vertical_shooter [stage.json|stage.txt] [config.json]`
fn main() -> std::io::Result<()> {
    init_logging();

    let args: Vec<PathBuf> = std::env::args_os().skip(1).map(PathBuf::from).collect();
    let stage = load_stage(args.first().map(PathBuf::as_path));
    let config = load_config(args.get(1).map(PathBuf::as_path));

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Release/repeat events where the terminal supports them.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Blocking reads live on their own thread; the loop polls the channel.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, config, stage);

    // Restore the terminal whatever `run` returned.
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: GameConfig,
    stage: SpawnSchedule,
) -> std::io::Result<()> {
    let mut high_score = load_high_score();
    let mut sim = Simulation::with_config(config, stage.clone());

    loop {
        match show_menu(out, rx, high_score)? {
            MenuResult::Quit => break,
            MenuResult::Start => {
                sim.restart();
                let quit = game_loop(out, &mut sim, &stage, rx, high_score)?;

                if sim.player.score > high_score {
                    high_score = sim.player.score;
                    save_high_score(high_score);
                }

                if quit {
                    break;
                }
            }
        }
    }
    Ok(())
}
