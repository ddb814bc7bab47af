//! PDF metadata normalizer - command-line interface
//! Author: kartik4091
//!
//! Runs the chat bot, or normalizes and inspects local files

use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use pdfmeta::{
    normalize, Bot, BotConfig, Error, MetadataReport, MetadataTarget, ReportFormat, ReportFormatter,
    Result, TelegramClient,
};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches
        .get_one::<String>("verbose")
        .map(String::as_str)
        .unwrap_or("info");
    init_logging(log_level);

    let config_file = matches.get_one::<String>("config").map(PathBuf::from);

    let outcome = match matches.subcommand() {
        Some(("run", _)) => run_bot(config_file.as_deref()).await,
        Some(("normalize", sub)) => normalize_file(config_file.as_deref(), sub),
        Some(("inspect", sub)) => inspect_file(sub),
        _ => Err(Error::InternalError("no command given".into())),
    };

    if let Err(e) = outcome {
        error!("❌ {}", e);
        process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("pdfmeta")
        .version(env!("CARGO_PKG_VERSION"))
        .author("kartik4091")
        .about("Rewrites Author, Creator and Producer of PDF files")
        .long_about("Rewrites the Author, Creator and Producer fields of a PDF in both the \
                    document information dictionary and the XMP packet, leaving the rest of \
                    the document alone. Runs as a chat bot or on local files.")
        .subcommand_required(true)
        .arg_required_else_help(true)

        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .global(true)
            .help("Configuration file (JSON or YAML)"))

        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_name("LEVEL")
            .value_parser(["error", "warn", "info", "debug", "trace"])
            .default_value("info")
            .global(true)
            .help("Set logging verbosity"))

        .subcommand(Command::new("run")
            .about("Start the bot and poll for uploads"))

        .subcommand(Command::new("normalize")
            .about("Normalize a local file")
            .arg(Arg::new("input")
                .short('i')
                .long("input")
                .value_name("FILE")
                .help("Input PDF file path")
                .required(true))
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Output PDF file path")
                .required(true))
            .arg(Arg::new("author")
                .long("author")
                .value_name("TEXT")
                .help("Author to write instead of the configured one"))
            .arg(Arg::new("creator")
                .long("creator")
                .value_name("TEXT")
                .help("Creator to write instead of the configured one"))
            .arg(Arg::new("producer")
                .long("producer")
                .value_name("TEXT")
                .help("Producer to write instead of the configured one"))
            .arg(Arg::new("force")
                .short('f')
                .long("force")
                .action(ArgAction::SetTrue)
                .help("Overwrite the output file if it exists")))

        .subcommand(Command::new("inspect")
            .about("Show the metadata of a PDF file")
            .arg(Arg::new("file")
                .value_name("FILE")
                .help("PDF file to inspect")
                .required(true))
            .arg(Arg::new("format")
                .long("format")
                .value_parser(["text", "json"])
                .default_value("text")
                .help("Output format")))
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(format!("pdfmeta={}", level)))
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }
}

async fn run_bot(config_file: Option<&Path>) -> Result<()> {
    let config = BotConfig::load(config_file)?;
    config.validate()?;
    debug!("Configuration: {:?}", config);
    info!(
        "🚀 Starting bot: Author → {}, Creator → {}, Producer → {}",
        config.target.author, config.target.creator, config.target.producer
    );

    let bot = Arc::new(Bot::new(TelegramClient::new(&config), &config));
    tokio::select! {
        result = bot.run() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("Interrupted, shutting down");
            Ok(())
        }
    }
}

fn normalize_file(config_file: Option<&Path>, matches: &ArgMatches) -> Result<()> {
    let config = BotConfig::load(config_file)?;
    let target = override_target(config.target, matches);

    let input = matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InternalError("missing --input".into()))?;
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InternalError("missing --output".into()))?;

    if output.exists() && !matches.get_flag("force") {
        return Err(Error::InputRejected(format!(
            "output file already exists: {} (use --force to overwrite)",
            output.display()
        )));
    }

    normalize(&input, &output, &target)?;
    info!("✅ Wrote {}", output.display());
    Ok(())
}

fn override_target(mut target: MetadataTarget, matches: &ArgMatches) -> MetadataTarget {
    if let Some(author) = matches.get_one::<String>("author") {
        target.author = author.clone();
    }
    if let Some(creator) = matches.get_one::<String>("creator") {
        target.creator = creator.clone();
    }
    if let Some(producer) = matches.get_one::<String>("producer") {
        target.producer = producer.clone();
    }
    target
}

fn inspect_file(matches: &ArgMatches) -> Result<()> {
    let path = matches
        .get_one::<String>("file")
        .map(PathBuf::from)
        .ok_or_else(|| Error::InternalError("missing file argument".into()))?;
    let format = match matches.get_one::<String>("format").map(String::as_str) {
        Some("json") => ReportFormat::Json,
        _ => ReportFormat::PlainText,
    };

    let report = MetadataReport::read(&path)?;
    print!("{}", ReportFormatter::format(&report, format)?);
    Ok(())
}
