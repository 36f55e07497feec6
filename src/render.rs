use std::collections::HashMap;
use std::io::{self, Stdout, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{self, Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use pacman_egg::{
    CellType, Dir, Game, GameState, GhostMode, Grid, PelletKind, Personality, Pos, Snapshot,
};

const CELL_W: usize = 2;

/// Frightened ghosts blink during their last two seconds.
const FLASH_TICKS: u64 = 120;
const FLASH_PERIOD: u64 = 15;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Glyph {
    Player,
    Ghost,
    Frightened,
    Eyes,
    Wall,
    Empty,
    Pellet,
    Power,
    Gate,
    Fruit,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Cell {
    glyph: Glyph,
    color: Color,
}

impl Glyph {
    fn text(self) -> &'static str {
        match self {
            Glyph::Player => "😃",
            Glyph::Ghost => "👻",
            Glyph::Frightened => "😱",
            Glyph::Eyes => "👀",
            Glyph::Wall => "██",
            Glyph::Empty => "  ",
            Glyph::Pellet => "· ",
            Glyph::Power => "● ",
            Glyph::Gate => "==",
            Glyph::Fruit => "🍒",
        }
    }
}

const BLANK: Cell = Cell {
    glyph: Glyph::Empty,
    color: Color::Reset,
};

fn cell(glyph: Glyph, color: Color) -> Cell {
    Cell { glyph, color }
}

/// Redraws only the cells that changed since the previous frame.
pub struct Renderer {
    width: usize,
    height: usize,
    last: Vec<Cell>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            last: vec![BLANK; width * height],
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn draw(&mut self, stdout: &mut Stdout, game: &Game) -> io::Result<()> {
        let grid = &game.maze().grid;
        let snap = game.snapshot();
        stdout.queue(MoveTo(0, 0))?;
        let (term_w, term_h) = terminal::size()?;
        if let Err((need_w, need_h)) = self.place(term_w, term_h) {
            stdout.queue(Clear(ClearType::All))?;
            stdout.queue(Print(format!(
                "Terminal too small. Need at least {need_w}x{need_h} (cols x rows). Current: {term_w}x{term_h}."
            )))?;
            self.needs_full = true;
            return stdout.flush();
        }

        let hud = hud_line(&snap, status_line(game));
        if self.needs_full || hud != self.last_hud {
            stdout.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            stdout.queue(SetForegroundColor(Color::White))?;
            stdout.queue(Clear(ClearType::CurrentLine))?;
            stdout.queue(Print(&hud))?;
            stdout.queue(ResetColor)?;
            self.last_hud = hud;
        }

        let pellets: HashMap<Pos, PelletKind> = snap.pellets.iter().copied().collect();
        for y in 0..self.height {
            for x in 0..self.width {
                let pos = Pos::new(x as i32, y as i32);
                let cell = cell_for(grid, &snap, &pellets, pos);
                let idx = y * self.width + x;
                if self.needs_full || cell != self.last[idx] {
                    self.last[idx] = cell;
                    self.draw_cell(stdout, x, y, cell)?;
                }
            }
        }
        self.needs_full = false;

        stdout.flush()
    }

    /// Centres the board in a `term_w` by `term_h` terminal, or returns the
    /// size it needs when it does not fit.
    fn place(&mut self, term_w: u16, term_h: u16) -> Result<(), (u16, u16)> {
        let need_w = (self.width * CELL_W) as u16;
        // One row for the HUD above the board, one spare below.
        let need_h = (self.height + 2) as u16;
        if term_w < need_w || term_h < need_h {
            return Err((need_w, need_h));
        }
        let origin = ((term_w - need_w) / 2, (term_h - need_h) / 2 + 1);
        if origin != (self.origin_x, self.origin_y) {
            (self.origin_x, self.origin_y) = origin;
            self.needs_full = true;
        }
        Ok(())
    }

    fn draw_cell(&self, stdout: &mut Stdout, x: usize, y: usize, cell: Cell) -> io::Result<()> {
        let x_pos = self.origin_x + (x * CELL_W) as u16;
        let y_pos = self.origin_y + y as u16;
        stdout.queue(MoveTo(x_pos, y_pos))?;
        stdout.queue(SetForegroundColor(cell.color))?;
        stdout.queue(Print(padded(cell.glyph.text())))?;
        stdout.queue(ResetColor)?;
        Ok(())
    }
}

/// Pads narrow glyphs so every cell covers `CELL_W` columns.
fn padded(text: &str) -> String {
    let pad = CELL_W.saturating_sub(text.width());
    format!("{text}{}", " ".repeat(pad))
}

fn hud_line(snap: &Snapshot, status: &str) -> String {
    format!(
        "Score: {}  Lives: {}  Level: {}  Dots: {}  {}",
        snap.score,
        snap.lives,
        snap.level,
        snap.remaining_dots(),
        status
    )
}

fn frightened_color(remaining: u64) -> Color {
    if remaining < FLASH_TICKS && (remaining / FLASH_PERIOD) % 2 == 0 {
        Color::White
    } else {
        Color::Blue
    }
}

fn ghost_color(personality: Personality) -> Color {
    match personality {
        Personality::Aggressive => Color::Red,
        Personality::Ambusher => Color::Magenta,
        Personality::Flanker => Color::Cyan,
        Personality::Shy => Color::DarkYellow,
    }
}

fn cell_for(grid: &Grid, snap: &Snapshot, pellets: &HashMap<Pos, PelletKind>, pos: Pos) -> Cell {
    if pos == snap.player {
        return cell(Glyph::Player, Color::Yellow);
    }
    if let Some(ghost) = snap.ghost_at(pos) {
        return match (ghost.eaten, ghost.mode) {
            (true, _) => cell(Glyph::Eyes, Color::White),
            (false, GhostMode::Frightened) => {
                cell(Glyph::Frightened, frightened_color(snap.frightened_remaining))
            }
            _ => cell(Glyph::Ghost, ghost_color(ghost.personality)),
        };
    }
    if snap.fruit.is_some_and(|f| f.pos == pos) {
        return cell(Glyph::Fruit, Color::Green);
    }
    match (pellets.get(&pos), grid.cell_type(pos)) {
        (Some(PelletKind::Normal), _) => cell(Glyph::Pellet, Color::White),
        (Some(PelletKind::Power), _) => cell(Glyph::Power, Color::Magenta),
        (None, CellType::Wall) => cell(Glyph::Wall, Color::Blue),
        // Only the door row opens onto the maze above it.
        (None, CellType::GhostPen) if grid.is_legal_move(pos.step(Dir::Up)) => {
            cell(Glyph::Gate, Color::Cyan)
        }
        (None, _) => BLANK,
    }
}

/// Right-hand side of the HUD: what the player can do next.
fn status_line(game: &Game) -> &'static str {
    match game.state() {
        GameState::Intro => "Press an arrow key to start  (q to quit)",
        GameState::Playing => "(p to pause, q to quit)",
        GameState::Paused => "PAUSED  (p to resume)",
        GameState::LifeLost => "Caught!",
        GameState::Win if game.is_final_win() => "YOU WIN  (p to play again, q to quit)",
        GameState::Win => "Level cleared!",
        GameState::GameOver => "GAME OVER  (p to play again, q to quit)",
    }
}
