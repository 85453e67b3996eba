use anyhow::Result;
use chrono::Utc;
use clap::Parser;
use smartlog_core::{collect, CollectOptions, Config, Repository};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{debug, Level};

#[derive(Parser)]
#[command(name = "git-smartlog")]
#[command(about = "Show local work as a sparse tree hanging off the mainline", long_about = None)]
struct Cli {
    /// Path inside the repository
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Force display all commits, regardless of time
    #[arg(short, long)]
    all: bool,

    /// Mainline ref, overriding `remote.head` in .git/smartlog
    #[arg(long)]
    mainline: Option<String>,

    /// Disable ANSI colors
    #[arg(long)]
    no_color: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        _ => Level::DEBUG,
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let start = Instant::now();

    let repo = Repository::discover(&cli.path)?;
    let config = Config::load(repo.git_dir())?;
    debug!(?config, "loaded configuration");

    let options = CollectOptions {
        all: cli.all,
        mainline: cli.mainline,
    };
    let now = Utc::now();
    let smartlog = collect(&repo, &config, &options, now)?;

    for notice in &smartlog.notices {
        println!("{}", notice);
    }

    for line in smartlog.render(&config, !cli.no_color, now) {
        println!("{}", line);
    }

    if smartlog.skipped > 0 {
        println!(
            "Skipped {} old commits. Use `-a` argument to display them.",
            smartlog.skipped
        );
    }

    println!("Finished in {:.2} s.", start.elapsed().as_secs_f64());
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            println!("{}", err);
            debug!("{:?}", err);
            ExitCode::FAILURE
        }
    }
}
