//! BranchSight CLI
//!
//! Command-line interface for configuration-coverage preprocessing.

use anyhow::Result;
use branchsight_preprocess::parallel::ParallelPreprocessor;
use branchsight_preprocess::{select_configuration, Preprocessor};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "branchsight")]
#[command(author, version, about = "Conditional-compilation coverage preprocessor", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the reachable configurations of a source file
    Configs {
        /// Source file to analyze
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Print the cleaned and macro-expanded intermediate
    Expand {
        /// Source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the variant selected by one configuration
    Select {
        /// Source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Configuration string, e.g. "CONFIG_PM;CONFIG_PM_SLEEP"
        #[arg(short, long, default_value = "")]
        config: String,
    },

    /// Emit every preprocessed variant of a source file
    Preprocess {
        /// Source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (json, text)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Preprocess every source file under a directory in parallel
    Batch {
        /// Directory to scan
        #[arg(value_name = "DIR")]
        dir: PathBuf,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Configs { file } => {
            cmd_configs(&file)?;
        }
        Commands::Expand { file, output } => {
            cmd_expand(&file, output.as_deref())?;
        }
        Commands::Select { file, config } => {
            cmd_select(&file, &config)?;
        }
        Commands::Preprocess {
            file,
            output,
            format,
        } => {
            cmd_preprocess(&file, output.as_deref(), &format)?;
        }
        Commands::Batch { dir } => {
            cmd_batch(&dir)?;
        }
    }

    Ok(())
}

fn display_config(cfg: &str) -> &str {
    if cfg.is_empty() {
        "(default)"
    } else {
        cfg
    }
}

fn cmd_configs(file: &PathBuf) -> Result<()> {
    println!("📂 Analyzing: {}", file.display());

    let result = Preprocessor::new().preprocess_split(File::open(file)?)?;

    println!("   Found {} configurations:", result.configurations.len());
    for cfg in &result.configurations {
        println!("   - {}", display_config(cfg));
    }

    Ok(())
}

fn cmd_expand(file: &PathBuf, output: Option<&std::path::Path>) -> Result<()> {
    let result = Preprocessor::new().preprocess_split(File::open(file)?)?;

    if let Some(out_path) = output {
        std::fs::write(out_path, &result.code)?;
        println!("   Output written to: {}", out_path.display());
    } else {
        print!("{}", result.code);
    }

    Ok(())
}

fn cmd_select(file: &PathBuf, config: &str) -> Result<()> {
    let result = Preprocessor::new().preprocess_split(File::open(file)?)?;
    print!("{}", select_configuration(&result.code, config));
    Ok(())
}

fn cmd_preprocess(file: &PathBuf, output: Option<&std::path::Path>, format: &str) -> Result<()> {
    println!("📂 Preprocessing: {}", file.display());

    let variants = Preprocessor::new().preprocess(File::open(file)?)?;
    println!("   Found {} configurations", variants.len());

    if format == "json" {
        let result = serde_json::json!({
            "file": file.to_string_lossy(),
            "configurations": variants.keys().collect::<Vec<_>>(),
            "variants": variants,
        });

        let json = serde_json::to_string_pretty(&result)?;

        if let Some(out_path) = output {
            std::fs::write(out_path, &json)?;
            println!("   Output written to: {}", out_path.display());
        } else {
            println!("{}", json);
        }
    } else {
        let mut text = String::new();
        for (cfg, variant) in &variants {
            text.push_str(&format!("==== {} ====\n", display_config(cfg)));
            text.push_str(variant);
        }

        if let Some(out_path) = output {
            std::fs::write(out_path, &text)?;
            println!("   Output written to: {}", out_path.display());
        } else {
            print!("{}", text);
        }
    }

    Ok(())
}

fn cmd_batch(dir: &PathBuf) -> Result<()> {
    println!("📂 Scanning: {}", dir.display());

    let preprocessor = ParallelPreprocessor::new();
    let results = preprocessor.preprocess_directory(dir);

    let mut ok = 0usize;
    let mut failed = 0usize;
    let mut total_variants = 0usize;

    for (path, result) in &results {
        match result {
            Ok(variants) => {
                ok += 1;
                total_variants += variants.len();
                println!("   {} → {} variants", path.display(), variants.len());
            }
            Err(e) => {
                failed += 1;
                println!("   {} → error: {}", path.display(), e);
            }
        }
    }

    println!("\n📊 Summary:");
    println!("   Files: {} ok, {} failed", ok, failed);
    println!("   Variants: {}", total_variants);

    Ok(())
}
