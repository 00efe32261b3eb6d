#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::uninlined_format_args)]

mod csv_reader;
mod norm;
mod structs;

use clap::{Args as ClapArgs, Parser, Subcommand};
use norm::pipeline::NormalizeConfig;
use std::path::{Path, PathBuf};
use structs::{ColumnMap, FilterConfig, Method, NormError, Result, SmallGroupPolicy};

/// vownorm - per-speaker vowel formant normalization
#[derive(Parser, Debug)]
#[command(name = "vownorm")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Filter outliers, normalize formants, write output files
    Normalize {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,

        /// Normalization procedure
        #[arg(short, long, value_enum, default_value = "lobanov")]
        method: Method,

        /// Output directory for normalized tables
        #[arg(short, long, default_value = "./norm_output")]
        output_dir: PathBuf,

        /// Skip the outlier filter
        #[arg(long)]
        no_filter: bool,
    },

    /// Print per-speaker token counts and what the outlier filter would remove
    Inspect {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Input TSV file (repeat for several files)
    #[arg(short, long = "input", required = true)]
    inputs: Vec<PathBuf>,

    /// Treat input as comma-separated instead of tab-separated
    #[arg(long)]
    csv: bool,

    /// Speaker identifier column
    #[arg(long, default_value = "speaker")]
    speaker_col: String,

    /// Sex/gender column (optional in the input, always read as text)
    #[arg(long, default_value = "sex")]
    sex_col: String,

    /// Word column
    #[arg(long, default_value = "word")]
    word_col: String,

    /// Vowel class column
    #[arg(long, default_value = "vowel")]
    vowel_col: String,

    /// F1 column (Hz)
    #[arg(long, default_value = "F1")]
    f1_col: String,

    /// F2 column (Hz)
    #[arg(long, default_value = "F2")]
    f2_col: String,
}

impl InputArgs {
    fn columns(&self) -> ColumnMap {
        ColumnMap {
            speaker: self.speaker_col.clone(),
            sex: self.sex_col.clone(),
            word: self.word_col.clone(),
            vowel: self.vowel_col.clone(),
            f1: self.f1_col.clone(),
            f2: self.f2_col.clone(),
        }
    }
}

#[derive(ClapArgs, Debug)]
struct FilterArgs {
    /// Maximum Mahalanobis distance (not squared) from the vowel centroid
    #[arg(long, default_value = "2.0")]
    threshold: f64,

    /// What to do with (speaker, vowel) groups too small for a covariance
    #[arg(long, value_enum, default_value = "pass")]
    small_groups: SmallGroupPolicy,
}

impl FilterArgs {
    const fn config(&self) -> FilterConfig {
        FilterConfig {
            threshold: self.threshold,
            small_groups: self.small_groups,
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Some(Commands::Normalize {
            input,
            filter,
            method,
            output_dir,
            no_filter,
        }) => run_normalize(
            &input,
            &output_dir,
            &NormalizeConfig {
                method,
                filter: (!no_filter).then(|| filter.config()),
            },
        ),

        Some(Commands::Inspect { input, filter }) => run_inspect(&input, &filter.config()),

        None => {
            eprintln!("No subcommand provided. Use 'vownorm normalize' or 'vownorm inspect'.");
            eprintln!("Run 'vownorm --help' for usage information.");
            std::process::exit(1);
        }
    }
}

/// Check every input path before parsing any of them
fn validate_inputs(input: &InputArgs) -> Result<()> {
    for path in &input.inputs {
        if !path.exists() {
            return Err(NormError::Config(format!(
                "Input file not found: {}",
                path.display()
            )));
        }
    }
    Ok(())
}

/// Run the normalization phase
fn run_normalize(input: &InputArgs, output_dir: &Path, config: &NormalizeConfig) -> Result<()> {
    validate_inputs(input)?;
    std::fs::create_dir_all(output_dir)?;

    let observations = csv_reader::load_observations(&input.inputs, &input.columns(), !input.csv)?;
    log::info!("Loaded {} observations in total", observations.len());

    let result = norm::pipeline::run_pipeline(&observations, config)?;

    log::info!("Writing output files...");
    norm::output::write_normalized(output_dir, &result.normalized.rows)?;
    norm::output::write_vowel_means(output_dir, &result.means)?;
    norm::output::write_summary_json(output_dir, &result, config.filter.map(|f| f.threshold))?;

    print!("{}", norm::output::summary_text(&result));

    log::info!("Output written to {}", output_dir.display());
    log::info!("  - normalized.tsv");
    log::info!("  - vowel_means.csv");
    log::info!("  - summary.json");

    Ok(())
}

/// Run the inspection phase
fn run_inspect(input: &InputArgs, filter: &FilterConfig) -> Result<()> {
    validate_inputs(input)?;

    let observations = csv_reader::load_observations(&input.inputs, &input.columns(), !input.csv)?;
    let outcome = norm::outliers::filter_outliers(&observations, filter)?;

    print!("{}", norm::output::inspect_text(&observations, &outcome));
    Ok(())
}
