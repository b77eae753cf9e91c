//! Kitty Generator CLI
//!
//! Commands: compile, ranges, dna (random | inspect | validate), image
//! Outputs JSON to stdout, logs to stderr (RUST_LOG)
//! Returns non-zero on failure, 2 on DNA validation failure

use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use kittygen_core::{Dna, Generator, GeneratorConfig, KittyError};

#[derive(Parser)]
#[command(name = "kittygen-cli")]
#[command(about = "Kitty Generator CLI - compile artwork catalogs and generate kitties from DNA")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to a JSON generator config (defaults apply when absent)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile an artwork directory into a container file
    Compile {
        /// Root of the artwork tree (<category>/<breed>/<files>)
        #[arg(short, long, default_value = "kitty_layers")]
        dir: PathBuf,

        /// Container output path
        #[arg(short, long, default_value = "file.kcg")]
        output: PathBuf,

        /// Optional manifest output path
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Print the allele ranges of a container
    Ranges {
        /// Container file
        #[arg(short, long, default_value = "file.kcg")]
        file: PathBuf,

        #[arg(long)]
        pretty: bool,
    },

    /// DNA tools
    Dna {
        #[command(subcommand)]
        command: DnaCommands,
    },

    /// Generate a kitty image from DNA
    Image {
        /// Hex representation of DNA
        #[arg(short, long)]
        dna: String,

        /// Container file
        #[arg(short, long, default_value = "file.kcg")]
        file: PathBuf,

        /// PNG output path
        #[arg(short, long, default_value = "kitty.png")]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum DnaCommands {
    /// Generate a random DNA within a container's allele ranges
    Random {
        #[arg(short, long, default_value = "file.kcg")]
        file: PathBuf,
    },

    /// Break a DNA down into its genotypes
    Inspect {
        #[arg(short, long)]
        dna: String,
    },

    /// Check a DNA against a container and show the layers it selects
    Validate {
        #[arg(short, long, default_value = "file.kcg")]
        file: PathBuf,

        #[arg(short, long)]
        dna: String,
    },
}

fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_generator(config: GeneratorConfig, file: &Path) -> Result<Generator, KittyError> {
    let mut generator = Generator::new(config);
    generator.import(BufReader::new(File::open(file)?))?;
    Ok(generator)
}

fn print_json(value: &impl serde::Serialize) -> Result<(), KittyError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<ExitCode, KittyError> {
    let config = match &cli.config {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };

    match cli.command {
        Commands::Compile { dir, output, manifest } => {
            let mut generator = Generator::new(config);
            let report = generator.compile(&dir)?;
            generator.export(BufWriter::new(File::create(&output)?))?;
            if let Some(path) = manifest {
                let m = generator.manifest()?;
                serde_json::to_writer_pretty(BufWriter::new(File::create(path)?), &m)?;
            }
            print_json(&serde_json::json!({
                "success": true,
                "output": output,
                "report": report,
                "allele_ranges": generator.allele_ranges(),
            }))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Ranges { file, pretty } => {
            let generator = load_generator(config, &file)?;
            println!("{}", generator.allele_ranges().to_json(pretty)?);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Dna { command: DnaCommands::Random { file } } => {
            let generator = load_generator(config, &file)?;
            let dna = generator.random_dna(&mut rand::thread_rng());
            print_json(&serde_json::json!({ "dna": dna }))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Dna { command: DnaCommands::Inspect { dna } } => {
            let dna = Dna::from_hex(&dna)?;
            print_json(&dna.breakdown())?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Dna { command: DnaCommands::Validate { file, dna } } => {
            let generator = load_generator(config, &file)?;
            let dna = Dna::from_hex(&dna)?;
            let check = generator.check_dna(&dna);
            print_json(&check)?;
            if check.is_ok() {
                Ok(ExitCode::SUCCESS)
            } else {
                Ok(ExitCode::from(2)) // Validation failure
            }
        }

        Commands::Image { dna, file, output } => {
            let generator = load_generator(config, &file)?;
            let dna = Dna::from_hex(&dna)?;
            let kitty = generator.generate_kitty(&dna)?;
            kitty.save_with_format(&output, image::ImageFormat::Png)?;
            print_json(&serde_json::json!({ "success": true, "dna": dna, "output": output }))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            let output = serde_json::json!({
                "success": false,
                "error": e.to_string(),
            });
            println!("{}", output);
            ExitCode::FAILURE
        }
    }
}
