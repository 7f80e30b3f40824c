use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use std::env;
use std::io::{stdout, BufWriter};
use std::time::{Duration, Instant};

mod fireworks;
mod render;

use fireworks::FireworksSystem;
use render::{CellSurface, Rgb};

// Night-sky default, matched by the fade overlay
const DEFAULT_BG: Rgb = (15, 15, 19);

const FIXED_DT: f32 = 1.0 / 60.0;

const VOLLEY: usize = 5;
const FINALE: usize = 12;

struct Options {
    bg: Rgb,
    seed: Option<u64>,
    auto: bool,
}

fn print_usage() {
    eprintln!("termfetti - fireworks celebrations for your terminal");
    eprintln!();
    eprintln!("Usage: termfetti [OPTIONS]");
    eprintln!();
    eprintln!("Keys:");
    eprintln!("  space, enter  launch a volley of fireworks");
    eprintln!("  f             launch a single firework");
    eprintln!("  b             grand finale");
    eprintln!("  c             clear the sky");
    eprintln!("  q, ESC        exit");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --bg-color RRGGBB  Night-sky background color as hex (e.g., --bg-color 1a1b26)");
    eprintln!("  --seed N           Seed the random sequence for a repeatable show");
    eprintln!("  --auto             Keep launching fireworks whenever the sky is empty");
}

fn run(opts: &Options) -> std::io::Result<()> {
    let stdout = stdout();
    let mut stdout = BufWriter::with_capacity(1024 * 64, stdout);

    terminal::enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, Hide, Clear(ClearType::All))?;

    let (cols, rows) = terminal::size()?;
    let mut surface = CellSurface::new(cols as usize, rows as usize * 2, opts.bg);

    let mut rng = match opts.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };
    let mut system = FireworksSystem::new(
        cols as f32,
        rows as f32 * 2.0,
        opts.bg,
        rng.fork(),
    );

    let mut last_frame = Instant::now();
    let mut accumulator = 0.0f32;
    let mut elapsed = 0.0f32;
    let mut next_auto = 0.0f32;

    loop {
        if event::poll(Duration::from_millis(1))? {
            match event::read()? {
                Event::Key(key_event) => {
                    if key_event.code == KeyCode::Char('q')
                        || key_event.code == KeyCode::Esc
                        || (key_event.code == KeyCode::Char('c')
                            && key_event.modifiers.contains(KeyModifiers::CONTROL))
                    {
                        break;
                    }
                    match key_event.code {
                        KeyCode::Char(' ') | KeyCode::Enter => system.launch(VOLLEY),
                        KeyCode::Char('f') => system.launch(1),
                        KeyCode::Char('b') => system.launch(FINALE),
                        KeyCode::Char('c') => system.clear(&mut surface),
                        _ => {}
                    }
                }
                Event::Resize(cols, rows) => {
                    // New dimensions only; anything already in the air keeps flying
                    surface.resize(cols as usize, rows as usize * 2);
                    system.resize(cols as f32, rows as f32 * 2.0);
                    execute!(stdout, Clear(ClearType::All))?;
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let frame_time = now.duration_since(last_frame).as_secs_f32();
        last_frame = now;
        elapsed += frame_time;

        if opts.auto {
            if !system.is_idle() {
                next_auto = elapsed + 1.5 + rng.f32() * 2.5;
            } else if elapsed >= next_auto {
                system.launch(1 + rng.usize(0..3));
            }
        }

        accumulator += frame_time;
        if accumulator > FIXED_DT * 3.0 {
            accumulator = FIXED_DT * 3.0;
        }

        while accumulator >= FIXED_DT {
            system.tick(&mut surface, FIXED_DT);
            accumulator -= FIXED_DT;
        }

        surface.render(&mut stdout)?;
    }

    execute!(stdout, Show, LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;

    Ok(())
}

fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;

    Some((r, g, b))
}

fn main() -> std::io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let mut opts = Options {
        bg: DEFAULT_BG,
        seed: None,
        auto: false,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--bg-color" => {
                if i + 1 < args.len() {
                    if let Some(color) = parse_hex_color(&args[i + 1]) {
                        opts.bg = color;
                        i += 2;
                    } else {
                        eprintln!("Invalid hex color: {}", args[i + 1]);
                        eprintln!("Expected format: RRGGBB (e.g., 1a1b26)");
                        std::process::exit(1);
                    }
                } else {
                    eprintln!("--bg-color requires a hex color value");
                    std::process::exit(1);
                }
            }
            "--seed" => {
                if i + 1 < args.len() {
                    match args[i + 1].parse::<u64>() {
                        Ok(seed) => {
                            opts.seed = Some(seed);
                            i += 2;
                        }
                        Err(_) => {
                            eprintln!("Invalid seed: {}", args[i + 1]);
                            std::process::exit(1);
                        }
                    }
                } else {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                }
            }
            "--auto" => {
                opts.auto = true;
                i += 1;
            }
            "help" | "--help" | "-h" => {
                print_usage();
                return Ok(());
            }
            arg => {
                eprintln!("Unknown option: {}", arg);
                eprintln!();
                print_usage();
                std::process::exit(1);
            }
        }
    }

    run(&opts)
}
