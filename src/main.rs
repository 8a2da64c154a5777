use std::fs;
use std::io::{self, Read, Write};
use std::process;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use tokio::sync::mpsc;

use mathmark::core::{
    mark_document_from_data, print_error_message, print_info_message, render_document,
    DocumentOptions, MarkingMode, MathmarkError,
};
use mathmark::env::{self, EnvVar};
use mathmark::render::config::{constants, load_render_config};
use mathmark::render::pipeline::mark_in_html_code;
use mathmark::render::{
    translate_input, ConfigManager, ProcessTranslator, ProgressEvent, RenderConfig,
};

#[derive(Parser, Debug)]
#[command(
    name = "mathmark",
    version,
    about = "Render ⁅delimited⁆ UnicodeMath regions inside HTML documents"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Load configuration from this file instead of the default search paths
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Mark and translate every math region in a document
    Render(RenderArgs),

    /// Replace math regions with placeholders without translating them
    Mark(MarkArgs),

    /// Translate raw input (no delimiters needed)
    Translate(TranslateArgs),

    /// Write an example configuration file
    GenerateConfig {
        /// Destination path
        #[arg(default_value = constants::EXAMPLE_CONFIG_FILE)]
        path: String,
    },

    /// List the environment variables that affect rendering
    EnvDocs,
}

#[derive(Debug, Args)]
struct InputArgs {
    /// Input file, `-` or omitted for stdin
    input: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    output: Option<String>,

    /// Character encoding of the input
    #[arg(short, long)]
    encoding: Option<String>,

    /// Scan raw source text with escape support (Markdeep) instead of the document tree
    #[arg(long)]
    markdeep: bool,
}

#[derive(Debug, Args)]
struct TranslatorArgs {
    /// Command line of the external translator
    #[arg(short, long)]
    translator: Option<String>,

    /// Ask the translator to resolve \controlwords
    #[arg(long)]
    resolve_control_words: bool,
}

#[derive(Debug, Args)]
struct RenderArgs {
    #[command(flatten)]
    input: InputArgs,

    #[command(flatten)]
    translator: TranslatorArgs,

    /// Minimum milliseconds between progress notifications
    #[arg(long)]
    progress_interval: Option<u64>,

    /// Do not print progress or summaries
    #[arg(short, long)]
    silent: bool,
}

#[derive(Debug, Args)]
struct MarkArgs {
    #[command(flatten)]
    input: InputArgs,
}

#[derive(Debug, Args)]
struct TranslateArgs {
    /// Input file, `-` or omitted for stdin
    input: Option<String>,

    #[command(flatten)]
    translator: TranslatorArgs,

    /// Translate each line separately
    #[arg(long)]
    split: bool,

    /// Use display style
    #[arg(short, long)]
    display: bool,

    /// Print per-stage measurements to stderr
    #[arg(short, long)]
    measurements: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    tracing::debug!("mathmark {}", mathmark::render::VERSION);

    let result = match cli.command {
        Commands::Render(args) => run_render(cli.config.as_deref(), args).await,
        Commands::Mark(args) => run_mark(args),
        Commands::Translate(args) => run_translate(cli.config.as_deref(), args),
        Commands::GenerateConfig { path } => run_generate_config(&path),
        Commands::EnvDocs => {
            print_info_message(&env::generate_env_docs());
            Ok(())
        }
    };

    if let Err(error) = result {
        print_error_message(&format!("Error: {}", error));
        process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => env::core::LogLevel::get().unwrap_or_else(|e| {
            eprintln!("{}", e);
            "warn".to_string()
        }),
        1 => "info".to_string(),
        2 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let level = tracing::Level::from_str(&level).unwrap_or(tracing::Level::WARN);
    let no_color = env::core::NoColor::get().unwrap_or(false);

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_ansi(!no_color && atty::is(atty::Stream::Stderr))
        .with_target(false)
        .init();
}

fn load_config(path: Option<&str>) -> Result<RenderConfig, MathmarkError> {
    match path {
        Some(path) => Ok(ConfigManager::from_file(path)?.into_config()),
        None => Ok(load_render_config()),
    }
}

fn apply_translator_args(config: &mut RenderConfig, args: &TranslatorArgs) {
    if let Some(command) = &args.translator {
        config.translator_command = Some(command.clone());
    }
    if args.resolve_control_words {
        config.resolve_control_words = true;
    }
}

fn create_translator(config: &RenderConfig) -> Result<ProcessTranslator, MathmarkError> {
    let command = config.translator_command.as_deref().ok_or_else(|| {
        MathmarkError::new(&format!(
            "no translator configured; pass --translator or set {}",
            env::render::TranslatorCommand::NAME
        ))
    })?;
    Ok(ProcessTranslator::new(command)?)
}

fn read_input(input: Option<&str>) -> Result<Vec<u8>, MathmarkError> {
    match input {
        None | Some("-") => {
            let mut data = Vec::new();
            io::stdin()
                .read_to_end(&mut data)
                .map_err(|e| MathmarkError::new(&format!("unable to read stdin: {e}")))?;
            Ok(data)
        }
        Some(path) => fs::read(path)
            .map_err(|e| MathmarkError::new(&format!("unable to read {path}: {e}"))),
    }
}

fn write_output(output: Option<&str>, data: &[u8]) -> Result<(), MathmarkError> {
    match output {
        None | Some("-") => io::stdout()
            .write_all(data)
            .map_err(|e| MathmarkError::new(&format!("unable to write stdout: {e}"))),
        Some(path) => fs::write(path, data)
            .map_err(|e| MathmarkError::new(&format!("unable to write {path}: {e}"))),
    }
}

fn document_options(args: &InputArgs, silent: bool) -> DocumentOptions {
    DocumentOptions {
        encoding: args.encoding.clone(),
        mode: if args.markdeep {
            MarkingMode::Markdeep
        } else {
            MarkingMode::Tree
        },
        silent,
    }
}

async fn run_render(config_path: Option<&str>, args: RenderArgs) -> Result<(), MathmarkError> {
    let mut config = load_config(config_path)?;
    apply_translator_args(&mut config, &args.translator);
    if let Some(interval) = args.progress_interval {
        config.progress_interval_ms = interval;
    }
    if args.silent {
        config.show_progress = false;
    }

    let translator = create_translator(&config)?;
    let data = read_input(args.input.input.as_deref())?;
    let options = document_options(&args.input, args.silent);

    let (sender, receiver) = mpsc::unbounded_channel();
    let (rendered, ()) = tokio::join!(
        render_document(translator, config, &data, &options, Some(sender)),
        print_progress(receiver)
    );
    let rendered = rendered?;

    write_output(args.input.output.as_deref(), &rendered.data)
}

async fn print_progress(mut receiver: mpsc::UnboundedReceiver<ProgressEvent>) {
    let mut total = 0;
    while let Some(event) = receiver.recv().await {
        match event {
            ProgressEvent::Started { total: count } => {
                total = count;
                eprintln!("Rendering {} expressions", total);
            }
            ProgressEvent::Progress { processed, errors } => {
                eprintln!("  {}/{} ({} errors)", processed, total, errors);
            }
            ProgressEvent::Finished { processed, errors } => {
                eprintln!("Rendered {}/{} expressions, {} errors", processed, total, errors);
            }
        }
    }
}

fn run_mark(args: MarkArgs) -> Result<(), MathmarkError> {
    let data = read_input(args.input.input.as_deref())?;

    let (output, regions) = if args.input.markdeep {
        let text = String::from_utf8_lossy(&data);
        let marked = mark_in_html_code(&text)?;
        (marked.code.into_bytes(), marked.regions.len())
    } else {
        mark_document_from_data(&data, &document_options(&args.input, true))?
    };

    tracing::info!("marked {} regions", regions);
    write_output(args.input.output.as_deref(), &output)
}

fn run_translate(config_path: Option<&str>, args: TranslateArgs) -> Result<(), MathmarkError> {
    let mut config = load_config(config_path)?;
    apply_translator_args(&mut config, &args.translator);
    if args.split {
        config.split_input = true;
    }
    if args.display {
        config.display_style = true;
    }

    let translator = create_translator(&config)?;
    let data = read_input(args.input.as_deref())?;
    let input = String::from_utf8_lossy(&data);

    let result = translate_input(&translator, &input, &config)?;
    print_info_message(&result.to_html());

    if args.measurements {
        for stage in result.measurements.stages() {
            let items: Vec<String> = result
                .measurements
                .items(stage)
                .iter()
                .map(|m| format!("{m}ms"))
                .collect();
            eprintln!("{}: {}ms ({})", stage, result.measurements.sum(stage), items.join(" + "));
        }
    }

    if result.error_count() > 0 {
        print_error_message(&format!("{} expressions failed to translate", result.error_count()));
    }

    Ok(())
}

fn run_generate_config(path: &str) -> Result<(), MathmarkError> {
    ConfigManager::generate_example_config(path)?;
    print_info_message(&format!("Wrote example configuration to {}", path));
    Ok(())
}
