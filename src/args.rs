//! Command-line argument parsing for the keyquence CLI.

use std::env;

/// Parsed command-line arguments.
#[derive(Debug, Default, PartialEq)]
pub struct CliArgs {
    /// Sequence file to load
    pub config_path: Option<String>,
    /// Idle timeout override in milliseconds
    pub idle_timeout_ms: Option<i64>,
    /// Disable the interrupt key
    pub no_interrupt: bool,
    /// Run without an audio device
    pub silent: bool,
    /// Whether help was requested
    pub show_help: bool,
}

impl CliArgs {
    /// Parse arguments from command line.
    pub fn parse() -> Result<Self, String> {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (program name already removed).
    pub fn parse_from<I: IntoIterator<Item = String>>(args: I) -> Result<Self, String> {
        let mut parsed = Self::default();
        let mut iter = args.into_iter();

        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--config" | "-c" => {
                    let value = iter.next().ok_or("--config requires a file path")?;
                    parsed.config_path = Some(value);
                }
                "--idle-timeout" | "-t" => {
                    let value = iter.next().ok_or("--idle-timeout requires milliseconds")?;
                    let ms = value
                        .parse::<i64>()
                        .map_err(|_| format!("Invalid idle timeout '{value}'"))?;
                    parsed.idle_timeout_ms = Some(ms);
                }
                "--no-interrupt" => parsed.no_interrupt = true,
                "--silent" => parsed.silent = true,
                "--help" | "-h" => parsed.show_help = true,
                other => return Err(format!("Unknown argument '{other}'")),
            }
        }

        Ok(parsed)
    }
}

/// Print usage information.
pub fn print_help() {
    println!("keyquence - type a sequence, hear a sound");
    println!();
    println!("Usage: keyquence [OPTIONS]");
    println!();
    println!("Options:");
    println!("  -c, --config <FILE>        Sequence file (JSON); built-in demo set if omitted");
    println!("  -t, --idle-timeout <MS>    Clear typed keys after MS of inactivity (default 2000)");
    println!("      --no-interrupt         Escape does not stop the playing cue");
    println!("      --silent               Do not open an audio device");
    println!("  -h, --help                 Show this help");
    println!();
    println!("Press Ctrl-C to quit.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, String> {
        CliArgs::parse_from(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&["-c", "seq.json", "--idle-timeout", "500", "--no-interrupt", "--silent"])
            .unwrap();
        assert_eq!(args.config_path.as_deref(), Some("seq.json"));
        assert_eq!(args.idle_timeout_ms, Some(500));
        assert!(args.no_interrupt);
        assert!(args.silent);
        assert!(!args.show_help);
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse(&["--config"]).is_err());
        assert!(parse(&["--idle-timeout", "soon"]).is_err());
        assert!(parse(&["--bogus"]).is_err());
    }
}
