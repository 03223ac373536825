//! Notemark - A live markdown note editor for the terminal.
//!
//! # Usage
//!
//! ```bash
//! notemark notes.md
//! notemark --no-dates notes.md
//! notemark --calendar-file ~/events.ics notes.md
//! notemark --dump notes.md
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use tracing_subscriber::EnvFilter;

use notemark::app::App;
use notemark::config::{
    ConfigFlags, ThemeMode, clear_config_flags, global_config_path, load_config_flags,
    local_override_path, parse_flag_tokens, save_config_flags,
};
use notemark::editor::{EditorSession, SessionConfig};
use notemark::perf;
use notemark::ui::TerminalLayout;

/// Width used to lay out `--dump` output.
const DUMP_WIDTH: u16 = 80;

/// A live markdown note editor with checkboxes and date chips
#[derive(Parser, Debug)]
#[command(name = "notemark", version, about, long_about = None)]
struct Cli {
    /// Note file to edit (created on first save)
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Disable date detection and calendar chips
    #[arg(long)]
    no_dates: bool,

    /// Milliseconds a focus loss must last before it counts
    #[arg(long, value_name = "MS")]
    blur_delay_ms: Option<u64>,

    /// Append added dates to this iCalendar file
    #[arg(long, value_name = "PATH")]
    calendar_file: Option<PathBuf>,

    /// Color theme for the terminal background
    #[arg(long, value_enum)]
    theme: Option<ThemeMode>,

    /// Enable performance timing logs
    #[arg(long)]
    perf: bool,

    /// Write detailed render debug events to a file
    #[arg(long, value_name = "PATH")]
    render_debug_log: Option<PathBuf>,

    /// Write tracing output to a file instead of stderr
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Print the styled runs, widgets and date candidates as JSON and exit
    #[arg(long)]
    dump: bool,

    /// Save current command-line flags as defaults
    #[arg(long)]
    save: bool,

    /// Clear saved defaults
    #[arg(long)]
    clear: bool,
}

// Query the terminal background using OSC 11.
// We talk to /dev/tty so the terminal responds even when stdout is piped.
#[cfg(not(unix))]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    Ok(None)
}

#[cfg(unix)]
fn query_terminal_background() -> std::io::Result<Option<(u8, u8, u8)>> {
    use std::io::{Read, Write};
    use std::sync::mpsc;

    let (tx, rx) = mpsc::channel();

    let mut io = std::fs::OpenOptions::new()
        .read(true)
        .write(true)
        .open("/dev/tty")?;
    let reader = io.try_clone()?;

    // OSC 11 query: ESC ] 11 ; ? BEL
    io.write_all(b"\x1b]11;?\x07")?;
    io.flush()?;

    std::thread::spawn(move || {
        let mut reader = reader;
        let mut buf = [0u8; 256];
        let mut collected: Vec<u8> = Vec::new();
        loop {
            match reader.read(&mut buf) {
                Ok(0) => {}
                Ok(n) => {
                    collected.extend_from_slice(&buf[..n]);
                    if collected.contains(&b'\x07')
                        || collected.windows(2).any(|w| w == b"\x1b\\")
                    {
                        let _ = tx.send(collected);
                        break;
                    }
                }
                Err(_) => break,
            }
        }
    });

    Ok(rx
        .recv_timeout(Duration::from_millis(75))
        .ok()
        .and_then(|bytes| parse_osc11_reply(&String::from_utf8_lossy(&bytes))))
}

fn theme_from_rgb(r: u8, g: u8, b: u8) -> ThemeMode {
    let luma = 0.0722f32.mul_add(
        f32::from(b),
        0.2126f32.mul_add(f32::from(r), 0.7152 * f32::from(g)),
    );
    if luma >= 140.0 {
        ThemeMode::Light
    } else {
        ThemeMode::Dark
    }
}

/// Resolve `Auto` by asking the terminal; falls back to `Auto` (COLORFGBG).
fn detect_theme() -> ThemeMode {
    let _raw = enable_raw_mode();
    let result = query_terminal_background();
    let _ = disable_raw_mode();
    result
        .ok()
        .flatten()
        .map_or(ThemeMode::Auto, |(r, g, b)| theme_from_rgb(r, g, b))
}

fn parse_osc11_reply(reply: &str) -> Option<(u8, u8, u8)> {
    // Expect: ESC ] 11 ; rgb:RRRR/GGGG/BBBB BEL or ST
    let start = reply.find("rgb:")?;
    let data = &reply[start + 4..];
    let mut parts = data.split(['/', '\x07', '\x1b']);
    let r = parts.next()?;
    let g = parts.next()?;
    let b = parts.next()?;
    Some((
        parse_osc_component(r)?,
        parse_osc_component(g)?,
        parse_osc_component(b)?,
    ))
}

fn parse_osc_component(s: &str) -> Option<u8> {
    let hex = s.trim();
    if hex.len() >= 4 {
        let v = u16::from_str_radix(&hex[..4], 16).ok()?;
        Some((v >> 8) as u8)
    } else if hex.len() == 2 {
        u8::from_str_radix(hex, 16).ok()
    } else {
        None
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    let filter = EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .init();
        }
        None => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    Ok(())
}

/// Print one render pass of `path` as JSON.
fn dump(path: &Path, config: SessionConfig) -> Result<()> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text.replace("\r\n", "\n"),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err).with_context(|| format!("Failed to read {}", path.display())),
    };
    let mut session = EditorSession::new(&text, config);
    let pass = session.render_pass();
    let layout = TerminalLayout::build(
        &text,
        &pass.runs,
        &session.offered_chip_lines(),
        DUMP_WIDTH,
        pass.generation,
    );
    session.sync_overlays(pass.generation, &layout);

    let output = serde_json::json!({
        "generation": pass.generation,
        "runs": pass.runs,
        "widgets": session.overlays().widgets(),
        "underlines": session.overlays().underlines(),
        "candidates": session.date_candidates(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).context("Failed to encode dump")?
    );
    Ok(())
}

fn main() -> Result<()> {
    let raw_args = std::env::args().collect::<Vec<_>>();
    let cli = Cli::parse();
    let global_path = global_config_path();
    let local_path = local_override_path();
    let cli_flags = parse_flag_tokens(&raw_args);

    if cli.clear {
        clear_config_flags(&global_path)?;
    }
    if cli.save {
        save_config_flags(&global_path, &cli_flags)?;
    }

    let file_flags = if cli.clear {
        ConfigFlags::default()
    } else {
        let global_flags = load_config_flags(&global_path)?;
        let local_flags = load_config_flags(&local_path)?;
        global_flags.union(&local_flags)
    };
    let effective = file_flags.union(&cli_flags);

    init_logging(effective.log_file.as_deref())?;
    tracing::debug!(?effective, "effective flags");

    perf::set_enabled(effective.perf);
    let render_debug_log_path = effective
        .render_debug_log
        .clone()
        .or_else(|| std::env::var_os("NOTEMARK_RENDER_DEBUG_LOG").map(PathBuf::from));
    if let Err(err) = perf::set_debug_log_path(render_debug_log_path.as_deref()) {
        tracing::warn!(
            path = %render_debug_log_path
                .as_ref()
                .map_or_else(|| "<unset>".to_string(), |p| p.display().to_string()),
            error = %err,
            "failed to initialize render debug log"
        );
    }

    let Some(file) = cli.file else {
        if cli.save || cli.clear {
            return Ok(());
        }
        anyhow::bail!("No note file given (try `notemark notes.md`)");
    };

    if cli.dump {
        return dump(&file, effective.session_config());
    }

    let theme = match effective.theme.unwrap_or(ThemeMode::Auto) {
        ThemeMode::Auto => detect_theme(),
        explicit => explicit,
    };

    let mut app = App::new(file)
        .with_session_config(effective.session_config())
        .with_calendar_file(effective.calendar_file.clone())
        .with_theme(theme)
        .with_config_paths(
            Some(global_path.clone()),
            if local_path.exists() {
                Some(local_path.clone())
            } else {
                None
            },
        );

    app.run().context("Application error")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_osc11_reply() {
        let reply = "\x1b]11;rgb:ffff/ffff/ffff\x07";
        assert_eq!(parse_osc11_reply(reply), Some((255, 255, 255)));
        assert_eq!(parse_osc11_reply("\x1b]11;rgb:00/10/20\x1b\\"), Some((0, 16, 32)));
        assert_eq!(parse_osc11_reply("garbage"), None);
    }

    #[test]
    fn test_theme_from_rgb() {
        assert_eq!(theme_from_rgb(250, 250, 250), ThemeMode::Light);
        assert_eq!(theme_from_rgb(20, 20, 30), ThemeMode::Dark);
    }

    #[test]
    fn test_cli_parses_flags() {
        let cli = Cli::try_parse_from([
            "notemark",
            "--no-dates",
            "--theme",
            "light",
            "--dump",
            "notes.md",
        ])
        .unwrap();
        assert!(cli.no_dates);
        assert!(cli.dump);
        assert_eq!(cli.theme, Some(ThemeMode::Light));
        assert_eq!(cli.file, Some(PathBuf::from("notes.md")));
    }
}
