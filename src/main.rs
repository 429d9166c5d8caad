use std::io;
use std::path::Path;
use std::thread;
use std::time;
use std::time::Duration;

use anyhow::Context;
use crossterm::cursor;
use crossterm::event;
use crossterm::event::Event as CtEvent;
use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;
use crossterm::execute;
use crossterm::style;
use crossterm::terminal;
use tracing::info;
use tracing_subscriber::EnvFilter;

use quadfield::Extent;
use quadfield::Grid;
use quadfield::QuadNode;
use quadfield::camera::Camera;
use quadfield::geom::Size;

const FRAMERATE: u32 = 30;
const FRAMETIME: time::Duration =
    time::Duration::from_millis(((1f64 / FRAMERATE as f64) * 1_000f64) as u64);

/// Size of the default field
const WORLD_SPACE: (Extent, Extent) = (1024, 1024);

/// Rows above this one are off in the default field
const WORLD_SPLIT: Extent = 600;

const QUADTREE_MINSIZE: Extent = 1;

enum Event {
    ToggleWire,
    Resize { cols: u16, rows: u16 },
    Exit,
}

fn handle_event(event: CtEvent) -> Option<Event> {
    match event {
        CtEvent::Key(key_event) => match key_event {
            KeyEvent {
                code: KeyCode::Char('q'),
                ..
            }
            | KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => Some(Event::Exit),
            KeyEvent {
                code: KeyCode::Char('g'),
                ..
            } => Some(Event::ToggleWire),
            _ => None,
        },
        CtEvent::Resize(cols, rows) => Some(Event::Resize { cols, rows }),
        _ => None,
    }
}

fn load_field(path: Option<&Path>) -> anyhow::Result<Grid> {
    let Some(path) = path else {
        let (w, h) = WORLD_SPACE;
        let mut grid = Grid::filled(w, h, true);
        grid.fill_rect(0, 0, Size::new(w, WORLD_SPLIT), false)?;

        return Ok(grid);
    };

    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    data.parse::<Grid>()
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn draw(
    stdout: &mut io::Stdout,
    cam: &mut Camera,
    tree: &QuadNode,
    wire: bool,
) -> io::Result<()> {
    cam.reset();
    cam.draw_tree(tree, wire);
    let s = cam.render();

    execute!(
        stdout,
        terminal::Clear(terminal::ClearType::All),
        cursor::MoveTo(0, 0),
    )?;

    for line in s.lines() {
        execute!(stdout, style::Print(line), cursor::MoveToNextLine(1))?;
    }

    Ok(())
}

fn run(tree: &QuadNode) -> anyhow::Result<()> {
    let mut stdout = io::stdout();

    let (cols, rows) = terminal::size()?;
    let mut cam = Camera::from_terminal(cols, rows);
    let mut wire = false;

    draw(&mut stdout, &mut cam, tree, wire)?;

    loop {
        let t = time::SystemTime::now();

        // Poll event for as long as FRAMETIME
        let (dt, event) = if event::poll(FRAMETIME)? {
            let event = handle_event(event::read()?);

            (t.elapsed()?, event)
        } else {
            (Duration::ZERO, None)
        };

        match event {
            None => {}
            Some(Event::Exit) => break,
            Some(Event::ToggleWire) => {
                wire = !wire;
                draw(&mut stdout, &mut cam, tree, wire)?;
            }
            Some(Event::Resize { cols, rows }) => {
                cam = Camera::from_terminal(cols, rows);
                draw(&mut stdout, &mut cam, tree, wire)?;
            }
        }

        thread::sleep(FRAMETIME.saturating_sub(dt));
    }

    Ok(())
}

/// Usage: `quadfield [min_size] [plaintext-file]`
fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    let min_size = match args.get(1) {
        Some(s) => s
            .parse::<Extent>()
            .with_context(|| format!("Invalid minimum leaf size \"{s}\""))?,
        None => QUADTREE_MINSIZE,
    };

    let field = load_field(args.get(2).map(Path::new))?;
    let tree = quadfield::build(&field, min_size)
        .context("Failed to build quadtree")?;

    let stats = tree.stats(min_size);
    info!(
        nodes = stats.nodes,
        leaves = stats.leaves,
        depth = stats.depth,
        "Quadtree ready"
    );

    terminal::enable_raw_mode()?;
    let res = run(&tree);
    terminal::disable_raw_mode()?;

    res
}

#[cfg(test)]
mod tests {
    use quadfield::Field;

    use super::WORLD_SPACE;
    use super::WORLD_SPLIT;
    use super::load_field;

    #[test]
    fn default_field_is_split_by_rows() {
        let field = load_field(None).unwrap();
        let (w, h) = WORLD_SPACE;

        assert_eq!((field.width(), field.height()), (w, h));

        // every row above the split is off, across the full width
        assert_eq!(field.get(0, WORLD_SPLIT - 1), Some(false));
        assert_eq!(field.get(w - 1, 0), Some(false));
        assert_eq!(field.get(0, WORLD_SPLIT), Some(true));
        assert_eq!(field.get(w - 1, h - 1), Some(true));

        assert_eq!(field.count(), (w * (h - WORLD_SPLIT)) as usize);
    }
}
