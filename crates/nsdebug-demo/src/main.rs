use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use nsdebug::{dlog, Config, Debugger, JsonFormatter, Runtime, TextFormatter};

#[derive(Parser, Debug)]
#[command(
    name = "nsdebug-demo",
    about = "Drive nsdebug namespaces through each formatter",
    version
)]
struct Cli {
    /// Enable pattern (default: the DEBUG environment variable)
    #[arg(short, long)]
    pattern: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    format: FormatChoice,

    /// Indent JSON output
    #[arg(long)]
    pretty: bool,

    /// Write <, > and & unescaped in JSON output
    #[arg(long)]
    no_html_escape: bool,

    /// Path to an nsdebug.toml (default: configure from the environment)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Rounds to run; 0 runs until interrupted
    #[arg(short = 'n', long, default_value_t = 3)]
    rounds: u64,

    /// Delay between rounds in milliseconds
    #[arg(long, default_value_t = 500)]
    delay_ms: u64,

    /// Run concurrent workers with fields instead of the mail walkthrough
    #[arg(long)]
    workers: bool,

    /// Level for the demo's own diagnostics when RUST_LOG is unset
    #[arg(long, default_value = "warn")]
    log_level: String,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatChoice {
    Text,
    FieldsOnly,
    Json,
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn build_runtime(cli: &Cli) -> Result<Runtime> {
    let runtime = match &cli.config {
        Some(path) => {
            let config = Config::load(path)?;
            Runtime::from_config(&config)
                .with_context(|| format!("Invalid configuration in {}", path.display()))?
        }
        None => nsdebug::global().clone(),
    };

    if let Some(pattern) = &cli.pattern {
        runtime
            .enable(pattern)
            .with_context(|| format!("Invalid pattern {:?}", pattern))?;
    }

    match cli.format {
        FormatChoice::Text => runtime.set_formatter(TextFormatter::new()),
        FormatChoice::FieldsOnly => {
            runtime.set_formatter(TextFormatter::new().with_fields_only(true))
        }
        FormatChoice::Json => runtime.set_formatter(JsonFormatter {
            pretty: cli.pretty,
            disable_html_escape: cli.no_html_escape,
        }),
    }

    Ok(runtime)
}

fn keep_going(round: u64, rounds: u64) -> bool {
    rounds == 0 || round < rounds
}

async fn mail_walkthrough(runtime: &Runtime, rounds: u64, delay: Duration) {
    let app = runtime.debugger("app");
    let debug = app.spawn("main");
    let sibling = app.spawn("sibling");

    let mut round = 0;
    while keep_going(round, rounds) {
        debug.with_field("key", "value").log("sending mail");
        debug.log_lazy(|| "sending mail".to_string());
        for to in ["tobi@segment.io", "loki@segment.io", "jane@segment.io"] {
            dlog!(debug, "send email to {}", to);
        }
        debug.error("oh noes");
        debug.spawn("child").log("hi from child");
        sibling.spawn("a").log("hi");
        sibling.spawn("b").log("hi");
        sibling.spawn("b").error("sad");

        round += 1;
        tokio::time::sleep(delay).await;
    }
}

async fn work(debug: Debugger, rounds: u64, delay: Duration) {
    let mut round = 0;
    while keep_going(round, rounds) {
        dlog!(debug, "doing stuff (round {})", round);
        round += 1;
        tokio::time::sleep(delay).await;
    }
}

async fn run_workers(runtime: &Runtime, rounds: u64, delay: Duration) -> Result<()> {
    let root = runtime.debugger("app");

    let a = root.spawn("multiple:a").with_fields([
        ("junk", "hi junk"),
        ("junk1", "hi junk1"),
    ]);
    a.with_fields([("another", 1), ("another2", 2)]);
    let b = root.spawn("multiple:b");
    let c = root.spawn("multiple:c");

    let handles = vec![
        tokio::spawn(work(a, rounds, delay * 2)),
        tokio::spawn(work(b, rounds, delay / 2)),
        tokio::spawn(work(c, rounds, delay / 5)),
    ];

    for handle in handles {
        handle.await.context("Worker task panicked")?;
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    let runtime = build_runtime(&cli)?;
    let delay = Duration::from_millis(cli.delay_ms);

    info!(
        format = ?cli.format,
        rounds = cli.rounds,
        enabled = runtime.settings().is_enabled(),
        "starting demo"
    );

    if cli.workers {
        run_workers(&runtime, cli.rounds, delay).await?;
    } else {
        mail_walkthrough(&runtime, cli.rounds, delay).await;
    }

    Ok(())
}
