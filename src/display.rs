//! Terminal rendering of a `Simulation`.
//!
//! Reads the simulation, never changes it.  World space (origin at the
//! centre, y up) is scaled onto the cells inside the border.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use glam::Vec2;
use vertical_shooter::compute::Simulation;
use vertical_shooter::entities::{EntityTag, GameStatus, Payload};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_LIVES: Color = Color::Red;
const C_HUD_STOCK: Color = Color::Cyan;
const C_PLAYER: Color = Color::White;
const C_TRANSLUCENT: Color = Color::DarkGrey;
const C_FOLLOWER: Color = Color::Blue;
const C_FLASH: Color = Color::White;
const C_BULLET_PLAYER: Color = Color::Cyan;
const C_BULLET_ENEMY: Color = Color::Magenta;
const C_EXPLOSION: Color = Color::DarkYellow;
const C_HINT: Color = Color::DarkGrey;

/// Maps world coordinates onto the bordered play area.
struct Viewport {
    width: u16,
    height: u16,
    half: Vec2,
}

impl Viewport {
    /// Cell for a world position, or `None` when it falls outside the border.
    fn cell(&self, p: Vec2) -> Option<(u16, u16)> {
        let inner_w = self.width.saturating_sub(2) as f32;
        let inner_h = self.height.saturating_sub(4) as f32;
        let nx = (p.x + self.half.x) / (2.0 * self.half.x);
        let ny = (self.half.y - p.y) / (2.0 * self.half.y);
        if !(0.0..1.0).contains(&nx) || !(0.0..1.0).contains(&ny) {
            return None;
        }
        Some((1 + (nx * inner_w) as u16, 2 + (ny * inner_h) as u16))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    sim: &Simulation,
    width: u16,
    height: u16,
    high_score: u32,
) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let field = &sim.config.playfield;
    let view = Viewport {
        width,
        height,
        half: Vec2::new(field.half_width, field.half_height),
    };

    draw_border(out, width, height)?;
    draw_hud(out, sim, width, high_score)?;

    for tag in EntityTag::ALL {
        for (_, entity) in sim.pools.iter_active(tag) {
            let Some((x, y)) = view.cell(entity.position) else {
                continue;
            };
            let (glyph, color) = match &entity.payload {
                Payload::Enemy(enemy) => {
                    let color = if enemy.flashing { C_FLASH } else { enemy_color(tag) };
                    (enemy_glyph(tag), color)
                }
                Payload::Projectile(_) if tag.is_player_projectile() => ("║", C_BULLET_PLAYER),
                Payload::Projectile(_) => ("•", C_BULLET_ENEMY),
                Payload::Item(_) => item_glyph(tag),
                Payload::Explosion(_) => ("✶", C_EXPLOSION),
            };
            out.queue(cursor::MoveTo(x.saturating_sub(glyph_half(glyph)), y))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(glyph))?;
        }
    }

    let translucent = sim.player.is_invulnerable();
    for follower in sim.followers.iter().filter(|f| f.active) {
        if let Some((x, y)) = view.cell(follower.position) {
            out.queue(cursor::MoveTo(x, y))?;
            out.queue(style::SetForegroundColor(if translucent {
                C_TRANSLUCENT
            } else {
                C_FOLLOWER
            }))?;
            out.queue(Print("◆"))?;
        }
    }

    if sim.player.active {
        if let Some((x, y)) = view.cell(sim.player.position) {
            out.queue(cursor::MoveTo(x, y))?;
            out.queue(style::SetForegroundColor(if translucent {
                C_TRANSLUCENT
            } else {
                C_PLAYER
            }))?;
            out.queue(Print("▲"))?;
        }
    }

    draw_controls_hint(out, height)?;

    match sim.status {
        GameStatus::GameOver => draw_banner(out, width, height, "GAME  OVER", Color::Red, sim)?,
        GameStatus::StageClear => {
            draw_banner(out, width, height, "STAGE CLEAR", Color::Green, sim)?
        }
        GameStatus::Playing => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

fn glyph_half(glyph: &str) -> u16 {
    glyph.chars().count() as u16 / 2
}

fn enemy_glyph(tag: EntityTag) -> &'static str {
    match tag {
        EntityTag::EnemySmall => "v",
        EntityTag::EnemyMedium => "«▼»",
        EntityTag::EnemyLarge => "╚█╝",
        _ => "<[███]>",
    }
}

fn enemy_color(tag: EntityTag) -> Color {
    match tag {
        EntityTag::EnemySmall => Color::Green,
        EntityTag::EnemyMedium => Color::Yellow,
        EntityTag::EnemyLarge => Color::Red,
        _ => Color::Magenta,
    }
}

fn item_glyph(tag: EntityTag) -> (&'static str, Color) {
    match tag {
        EntityTag::ItemCoin => ("$", Color::Yellow),
        EntityTag::ItemPower => ("P", Color::Cyan),
        _ => ("B", Color::Red),
    }
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, width: u16, height: u16) -> std::io::Result<()> {
    let w = width as usize;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    // Row 1: top bar
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    // Row h-2: bottom bar
    out.queue(cursor::MoveTo(0, height.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    // Side walls
    for row in 2..height.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    sim: &Simulation,
    width: u16,
    high_score: u32,
) -> std::io::Result<()> {
    let player = &sim.player;

    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(format!(
        "Score:{:>7}  Hi:{:>7}",
        player.score,
        high_score.max(player.score)
    )))?;

    let stock = format!("[P{} B{}] ", player.power, player.boom);
    let lives = format!("Life:{}", "♥".repeat(player.life as usize));
    let right = stock.chars().count() + lives.chars().count();
    out.queue(cursor::MoveTo(width.saturating_sub(right as u16 + 1), 0))?;
    out.queue(style::SetForegroundColor(C_HUD_STOCK))?;
    out.queue(Print(&stock))?;
    out.queue(style::SetForegroundColor(C_HUD_LIVES))?;
    out.queue(Print(&lives))?;

    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, height: u16) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("←↑↓→ / WASD : Move   SPACE : Shoot   B : Boom   Q : Quit"))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    width: u16,
    height: u16,
    title: &str,
    color: Color,
    sim: &Simulation,
) -> std::io::Result<()> {
    let title_line = format!("║  {:^14}  ║", title);
    let lines = [
        "╔══════════════════╗".to_string(),
        title_line,
        "╚══════════════════╝".to_string(),
    ];
    let cx = width / 2;
    let start_row = (height / 2).saturating_sub(3);

    out.queue(style::SetForegroundColor(color))?;
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(Print(line))?;
    }

    let score_line = format!("Score: {:>7}", sim.player.score);
    let row = start_row + lines.len() as u16;
    out.queue(cursor::MoveTo(
        cx.saturating_sub(score_line.chars().count() as u16 / 2),
        row,
    ))?;
    out.queue(style::SetForegroundColor(Color::Yellow))?;
    out.queue(Print(&score_line))?;

    if sim.status == GameStatus::GameOver {
        let hint = "R - Play Again  Q - Quit";
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hint.chars().count() as u16 / 2),
            row + 1,
        ))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(hint))?;
    }
    Ok(())
}
