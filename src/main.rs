mod debug_report;

use soundchange::{Evolution, RuleCache};
use std::io::{self, BufRead, IsTerminal, Write};
use std::time::Instant;

const PREFIX_ENV: &str = "SOUNDCHANGE_PREFIX";

fn main() {
    let config = match parse_args() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(2);
        }
    };

    init_logging(config.verbose);

    if let Err(err) = run(&config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(config: &CliConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut cache = RuleCache::new();
    // Fail on a broken chain before reading any input.
    let stages = cache.load_chain(&config.prefix, &config.pairs)?;
    log::info!("loaded {} rule files", stages.len());

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let stderr = io::stderr();
    let mut report = stderr.lock();
    if !config.quiet {
        writeln!(out, "Type words to apply changes to. ^C to quit")?;
        out.flush()?;
    }

    for line in io::stdin().lock().lines() {
        process_word(&mut cache, config, line?, &mut out, &mut report)?;
    }
    Ok(())
}

/// Apply the stage chain to `word`.
///
/// `out` only ever receives the output word, one per line. The trace report
/// goes to `report` when `-v` is given.
fn process_word(
    cache: &mut RuleCache,
    config: &CliConfig,
    word: String,
    out: &mut impl Write,
    report: &mut impl Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let started = Instant::now();
    let (output, trace) = cache.apply_chain(&word, &config.prefix, &config.pairs)?;
    let evolution = Evolution { input: word, output, trace, elapsed: started.elapsed() };

    if config.verbose > 0 {
        debug_report::print_evolution(report, &evolution, config.color)?;
        report.flush()?;
    }
    writeln!(out, "{}", evolution.output)?;
    out.flush()?;
    Ok(())
}

/// `-v` prints traces; each further `-v` raises the log level.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 | 1 => "warn",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

struct CliConfig {
    verbose: u8,
    quiet: bool,
    prefix: String,
    color: bool,
    pairs: Vec<String>,
}

fn parse_args() -> Result<CliConfig, String> {
    let mut verbose = 0u8;
    let mut quiet = false;
    let mut prefix = std::env::var(PREFIX_ENV).unwrap_or_default();
    let mut color = io::stderr().is_terminal();
    let mut pairs = Vec::new();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-V" | "--version" => {
                println!("soundchange {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "-v" | "--verbose" => verbose = verbose.saturating_add(1),
            "-q" | "--quiet" => quiet = true,
            "--color" => color = true,
            "--no-color" => color = false,
            "-p" | "--prefix" => {
                prefix = args.next().ok_or_else(|| "error: --prefix expects a value".to_string())?;
            }
            "--" => {
                pairs.extend(args.by_ref());
                break;
            }
            _ if arg.starts_with("--prefix=") => {
                prefix = arg.trim_start_matches("--prefix=").to_string();
            }
            // `-vv`, `-vvv`
            _ if arg.len() > 2 && arg.starts_with('-') && arg[1..].bytes().all(|b| b == b'v') => {
                let extra = u8::try_from(arg.len() - 1).unwrap_or(u8::MAX);
                verbose = verbose.saturating_add(extra);
            }
            // Stage names start with `.`, so only `-x` style arguments are options.
            _ if arg.starts_with('-') => {
                return Err(format!("error: unknown option '{arg}'"));
            }
            _ => pairs.push(arg),
        }
    }

    if pairs.len() % 2 != 0 {
        return Err(format!("error: stage names must come in pairs, got {}\n\n{}", pairs.len(), help_text()));
    }

    Ok(CliConfig { verbose, quiet, prefix, color, pairs })
}

fn print_help() {
    println!("{}", help_text());
}

fn help_text() -> String {
    format!(
        "soundchange {version}

Apply staged sound change files to words read from stdin.

Usage:
  soundchange [OPTIONS] [--] [<base> <.stage1.stage2...>]...

Each pair names a chain of rule files: `pie .gmc.ang` applies
`<prefix>pie.gmc` then `<prefix>pie.gmc.ang`. An empty base drops the
leading dot: `\"\" .a.b` applies `<prefix>a` then `<prefix>a.b`.

Options:
  -p, --prefix <path>        Prefix prepended to every rule file name.
                             Default: ${env} or empty.
  -v, --verbose              Print the rule trace for each word to stderr.
                             Repeat to raise the log level (RUST_LOG
                             overrides).
  -q, --quiet                Do not print the prompt.
  --color                    Force ANSI color output.
  --no-color                 Disable ANSI color output.
  -h, --help                 Show this help message.
  -V, --version              Print version information.

Exit codes:
  0  Success.
  1  A rule file failed to load or apply.
  2  Invalid arguments.
",
        version = env!("CARGO_PKG_VERSION"),
        env = PREFIX_ENV
    )
}
