//! slicelens command line

use clap::{Parser, Subcommand};
use serde::Serialize;
use slicelens::{Analyzer, AnalyzerConfig, SliceLensError, exit_codes::*};
use std::{env, fs, io, panic, path::Path, path::PathBuf, process};

const VERSION: &str = slicelens::version::VERSION;

#[derive(Parser, Debug)]
#[command(version = VERSION, about = "Explain slicer project and G-code settings")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// LLM provider (openai, anthropic, google, ollama, groq, mistral, deepseek)
    #[arg(long, global = true)]
    provider: Option<String>,

    /// LLM model name
    #[arg(long, global = true)]
    model: Option<String>,

    /// Print the text that would be sent to the LLM and stop
    #[arg(long, global = true)]
    describe_only: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare a 3MF project against its reference presets and explain the changes
    Analyze {
        /// Path to the .3mf project
        file: PathBuf,

        /// Base URL of the preset catalog and detail documents
        #[arg(long)]
        profile_root: Option<String>,
    },
    /// Explain a profile description, such as an edited `analyze --describe-only` output
    AnalyzeText {
        /// Text file holding the description, or `-` for stdin
        file: PathBuf,
    },
    /// Suggest setting changes for a print problem from a gzipped G-code file
    Troubleshoot {
        /// Path to the .gcode.gz file
        file: PathBuf,

        /// What went wrong with the print
        #[arg(long)]
        problem: String,
    },
}

fn main() {
    panic::set_hook(Box::new(|panic_info| {
        eprintln!("PANIC: {}", panic_info);
        process::exit(EXIT_PANIC);
    }));

    let result = panic::catch_unwind(run);

    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(_) => {
            eprintln!("Fatal: Unhandled panic in slicelens");
            process::exit(EXIT_PANIC);
        }
    }
}

fn run() -> i32 {
    if env::args().nth(1).as_deref() == Some("--version") {
        println!("slicelens {}", slicelens::version::full_version());
        return EXIT_SUCCESS;
    }

    let args = Args::parse();

    if let Some(ref level) = args.log_level {
        slicelens::logger::JsonLogger::init_with_level(level, "CLI --log-level");
    } else {
        slicelens::logger::JsonLogger::init();
    }

    let mut config = AnalyzerConfig::from_env();
    if let Some(provider) = args.provider.clone() {
        config.llm_provider = provider;
    }
    if let Some(model) = args.model.clone() {
        config.llm_model = model;
    }
    if let Command::Analyze {
        profile_root: Some(ref root),
        ..
    } = args.command
    {
        config = config.with_profile_root(root);
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let analyzer = match Analyzer::from_config(config) {
        Ok(analyzer) => analyzer,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let outcome = runtime.block_on(execute(&analyzer, &args));
    match outcome {
        Ok(()) => EXIT_SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            exit_code_for(&e)
        }
    }
}

async fn execute(analyzer: &Analyzer, args: &Args) -> slicelens::Result<()> {
    match &args.command {
        Command::Analyze { file, .. } => {
            let (name, bytes) = read_upload(file)?;
            if args.describe_only {
                let prepared = analyzer.prepare_project(&name, &bytes).await?;
                print!("{}", prepared.description);
            } else {
                print_json(&analyzer.analyze_project(&name, &bytes).await?)?;
            }
        }
        Command::AnalyzeText { file } => {
            let description = if file.as_os_str() == "-" {
                io::read_to_string(io::stdin())?
            } else {
                fs::read_to_string(file)?
            };
            if args.describe_only {
                print!("{}", description);
            } else {
                print_json(&analyzer.analyze_description(&description).await?)?;
            }
        }
        Command::Troubleshoot { file, problem } => {
            let (name, bytes) = read_upload(file)?;
            if args.describe_only {
                let prepared = analyzer.prepare_troubleshooting(&name, &bytes, problem)?;
                print!("{}", prepared.description);
            } else {
                print_json(&analyzer.troubleshoot_gcode(&name, &bytes, problem).await?)?;
            }
        }
    }
    Ok(())
}

fn read_upload(path: &Path) -> slicelens::Result<(String, Vec<u8>)> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok((name, bytes))
}

fn print_json<T: Serialize>(report: &T) -> slicelens::Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn exit_code_for(error: &SliceLensError) -> i32 {
    match error {
        SliceLensError::InvalidInput(_) | SliceLensError::FileTooLarge { .. } => EXIT_INPUT_ERROR,
        SliceLensError::Extraction(_) => EXIT_EXTRACTION_ERROR,
        SliceLensError::Locate(_) => EXIT_SETTINGS_ERROR,
        SliceLensError::GcodeBlock(_) | SliceLensError::Decompression(_) => EXIT_GCODE_ERROR,
        SliceLensError::IoError(_) => EXIT_IO_ERROR,
        _ => EXIT_ERROR,
    }
}
