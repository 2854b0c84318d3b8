#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!(
        "The keyquence CLI requires the \"cli\" feature. Rebuild with `--features cli` to enable it."
    );
}

#[cfg(feature = "cli")]
mod args;

#[cfg(feature = "cli")]
mod cli {
    use std::io::{self, Write};
    use std::time::Duration;

    use anyhow::Context;
    use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
    use crossterm::terminal;
    use tracing_subscriber::EnvFilter;

    use crate::args::{print_help, CliArgs};
    use keyquence::{
        AudioBackend, EngineOptions, Key, KeySequenceListener, RodioBackend, SequenceEntry,
        SequenceFile, SilentBackend,
    };

    /// Demo sequences used without `--config`
    fn demo_sequences() -> SequenceFile {
        let entry = |pattern: &str, message: &str| SequenceEntry {
            pattern: pattern.to_string(),
            audio: None,
            message: Some(message.to_string()),
        };
        SequenceFile {
            options: EngineOptions::default(),
            sequences: vec![
                entry("iddqd", "God mode enabled"),
                entry("idkfa", "All weapons and keys"),
                entry("up up down down", "Konami!"),
            ],
        }
    }

    /// Map a terminal key to an engine key
    fn to_key(code: KeyCode) -> Option<Key> {
        let name = match code {
            KeyCode::Char(c) => return Some(Key::Char(c)),
            KeyCode::Esc => "Escape",
            KeyCode::Enter => "Enter",
            KeyCode::Tab => "Tab",
            KeyCode::Backspace => "Backspace",
            KeyCode::Up => "ArrowUp",
            KeyCode::Down => "ArrowDown",
            KeyCode::Left => "ArrowLeft",
            KeyCode::Right => "ArrowRight",
            _ => return None,
        };
        Some(Key::from_name(name))
    }

    /// Restores the terminal on every exit path
    struct RawModeGuard;

    impl RawModeGuard {
        fn enable() -> anyhow::Result<Self> {
            terminal::enable_raw_mode().context("Failed to enable raw terminal mode")?;
            Ok(Self)
        }
    }

    impl Drop for RawModeGuard {
        fn drop(&mut self) {
            let _ = terminal::disable_raw_mode();
        }
    }

    fn start_listener<B, F>(file: SequenceFile, backend_factory: F) -> anyhow::Result<KeySequenceListener>
    where
        B: AudioBackend + 'static,
        F: FnOnce() -> B + Send + 'static,
    {
        let (options, definitions) = file.into_parts(|entry| {
            let message = entry
                .message
                .clone()
                .unwrap_or_else(|| format!("Detected \"{}\"", entry.pattern));
            move || {
                // Raw mode: explicit carriage return
                print!("{message}\r\n");
                let _ = io::stdout().flush();
            }
        });
        Ok(KeySequenceListener::start(definitions, options, backend_factory)?)
    }

    fn read_keys(listener: &KeySequenceListener) -> anyhow::Result<()> {
        loop {
            if !event::poll(Duration::from_millis(100))? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Ok(());
            }
            if let Some(key) = to_key(key.code) {
                listener.send(key);
            }
        }
    }

    pub fn run() -> anyhow::Result<()> {
        let args = CliArgs::parse().map_err(anyhow::Error::msg)?;
        if args.show_help {
            print_help();
            return Ok(());
        }

        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .init();

        let mut file = match &args.config_path {
            Some(path) => SequenceFile::load(path)
                .with_context(|| format!("Failed to load sequences from '{path}'"))?,
            None => demo_sequences(),
        };
        if let Some(ms) = args.idle_timeout_ms {
            file.options.idle_timeout_ms = ms;
        }
        if args.no_interrupt {
            file.options.supports_interrupt = false;
        }

        println!("Listening for {} sequence(s). Ctrl-C to quit.", file.sequences.len());
        for entry in &file.sequences {
            println!("  {}", entry.pattern);
        }

        let mut listener = if args.silent {
            start_listener(file, SilentBackend::new)?
        } else {
            start_listener(file, RodioBackend::new)?
        };

        let result = {
            let _raw = RawModeGuard::enable()?;
            read_keys(&listener)
        };
        listener.stop();
        result
    }
}

#[cfg(feature = "cli")]
fn main() -> anyhow::Result<()> {
    cli::run()
}
