//! Headless reading simulation
//!
//! Reads a stimulus file, simulates `n_runs` readers and writes the fixation
//! table (TSV) and a JSON summary.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use ob1_reader::core::{Parameters, PredictabilityMode, Result};
use ob1_reader::lexicon::FrequencyTable;
use ob1_reader::predictability::PredictabilityProvider;
use ob1_reader::simulation::{run_measures, Experiment};
use ob1_reader::stimulus::load_stimulus;

#[derive(Parser, Debug)]
#[command(name = "ob1_sim")]
#[command(about = "Simulate eye movements during continuous silent reading")]
struct Args {
    /// Stimulus file with text_id, word_id and word columns
    stimulus: PathBuf,

    /// Column separator of the stimulus file
    #[arg(long, default_value_t = '\t')]
    separator: char,

    /// Predictability JSON: {text_id: {position: {word: p}}}
    #[arg(long)]
    predictability: Option<PathBuf>,

    /// Word frequency JSON: {word: frequency}
    #[arg(long)]
    frequencies: Option<PathBuf>,

    /// Parameter file (TOML)
    #[arg(long)]
    params: Option<PathBuf>,

    /// Flat TOML table of parameter overrides, applied after --params
    #[arg(long)]
    overrides: Option<PathBuf>,

    /// Number of runs (overrides the parameter file)
    #[arg(long)]
    runs: Option<u32>,

    /// Base seed (overrides the parameter file)
    #[arg(long)]
    seed: Option<u64>,

    /// Distribute runs over all cores
    #[arg(long)]
    parallel: bool,

    /// Where to write the fixation table
    #[arg(long, default_value = "fixations.tsv")]
    output: PathBuf,

    /// Where to write the JSON summary
    #[arg(long, default_value = "simulation_output.json")]
    summary: PathBuf,

    /// Also write word-level measures as JSON
    #[arg(long)]
    measures: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("ob1_reader=info")),
        )
        .init();

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<()> {
    let mut params = match &args.params {
        Some(path) => Parameters::load(path)?,
        None => Parameters::default(),
    };
    if let Some(path) = &args.overrides {
        params = params.with_override_file(path)?;
    }
    if let Some(runs) = args.runs {
        params.n_runs = runs;
    }
    if let Some(seed) = args.seed {
        params.seed = seed;
    }

    let corpus = load_stimulus(&args.stimulus, args.separator)?;
    let provider = match &args.predictability {
        Some(path) => PredictabilityProvider::load(path)?,
        None => {
            if params.predictability_mode != PredictabilityMode::Disabled {
                tracing::warn!("No predictability file given; every position uses a neutral prior");
            }
            PredictabilityProvider::new()
        }
    };
    let frequencies = match &args.frequencies {
        Some(path) => FrequencyTable::load(path)?,
        None => FrequencyTable::new(),
    };

    println!("Simulating {} runs over {} texts", params.n_runs, corpus.texts.len());
    let experiment = Experiment::prepare(&corpus, &provider, &frequencies, params)?;
    let output = experiment.simulate(args.parallel);

    println!("{}", output.summary());

    std::fs::write(&args.output, output.to_tsv())?;
    std::fs::write(&args.summary, output.to_json())?;
    println!("Fixations written to {}", args.output.display());
    println!("Summary written to {}", args.summary.display());

    if let Some(path) = &args.measures {
        let lengths: Vec<usize> = experiment.texts().map(|t| t.len()).collect();
        let measures: Vec<_> = output.runs.iter().flat_map(|r| run_measures(r, &lengths)).collect();
        std::fs::write(path, serde_json::to_string_pretty(&measures)?)?;
        println!("Word measures written to {}", path.display());
    }

    Ok(())
}
