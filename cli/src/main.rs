#![allow(missing_docs)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::{LevelFilter, debug, error, info};
use rayon::prelude::*;
use wordsieve::fetch::{Fetcher, KNOWN_LANGUAGES, StaticLanguageCodes};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(why) => {
            error!("{why:#}");
            ExitCode::FAILURE
        },
    }
}

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Fetch one or multiple languages' dictionary sets from kaikki.org",
    after_help = "Usage examples:
  * Single language:
      wordsieve --language english

  * Multiple languages:
      wordsieve --language English Spanish --destination ../my_new_folder
      wordsieve --language english middle_english"
)]
struct Args {
    /// Language name/s (separated with spaces)
    #[arg(
        long,
        short = 'l',
        alias = "lang",
        num_args = 1..,
        required_unless_present = "supported_languages"
    )]
    language: Vec<String>,

    /// The path where the language sets will be saved
    #[arg(long)]
    destination: Option<String>,

    /// Fetch multiple languages simultaneously
    #[arg(long = "multi-thread", short = 'm')]
    multithread: bool,

    /// Number of worker threads to use (0 = one per core)
    #[arg(long, short = 't', default_value_t = 0)]
    threads: usize,

    /// Print debugging statements
    #[arg(short = 'd', long)]
    debug: bool,

    /// Increase output verbosity
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Show all supported languages and exit
    #[arg(short = 's', long)]
    supported_languages: bool,
}

fn run() -> anyhow::Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else if args.verbose {
        LevelFilter::Info
    } else {
        LevelFilter::Warn
    };
    env_logger::builder()
        .filter_level(level)
        .parse_env(Env::new().filter("WORDSIEVE_LOG"))
        .init();

    if args.supported_languages {
        println!("Supported languages:");
        for (name, code) in KNOWN_LANGUAGES {
            println!("* {name} ({code})");
        }
        return Ok(());
    }

    let fetcher = Fetcher::new(StaticLanguageCodes);
    let destination = args.destination.as_deref();

    if !args.multithread {
        for language in &args.language {
            fetcher
                .fetch_set(language, destination)
                .with_context(|| format!("failed to fetch {language}"))?;
        }
    } else {
        let mut pool = rayon::ThreadPoolBuilder::new();
        if args.threads > 0 {
            pool = pool.num_threads(args.threads);
        }
        let pool = pool.build().context("failed to build the worker pool")?;

        debug!("starting pooling");
        // Languages are independent; completion order doesn't matter
        pool.install(|| {
            args.language.par_iter().for_each(|language| {
                if let Err(why) = fetcher.fetch_set(language, destination) {
                    error!("failed to fetch {language}: {why}");
                }
            });
        });
    }

    info!("done");
    Ok(())
}
