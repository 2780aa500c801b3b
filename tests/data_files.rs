//! Loading the bundled demo data end-to-end

use std::path::PathBuf;

use ob1_reader::core::{CombinationRule, Parameters};
use ob1_reader::lexicon::FrequencyTable;
use ob1_reader::predictability::PredictabilityProvider;
use ob1_reader::simulation::{run_measures, Experiment, TSV_HEADER};
use ob1_reader::stimulus::load_stimulus;

fn data(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

#[test]
fn test_parameter_files_load() {
    let params = Parameters::load(&data("parameters.toml")).unwrap();
    assert_eq!(params.n_runs, 20);

    let overridden = params.with_override_file(&data("overrides.toml")).unwrap();
    assert_eq!(overridden.n_runs, 5);
    assert_eq!(overridden.combination_rule, CombinationRule::Multiplicative);
    assert!((overridden.pred_weight - 0.15).abs() < 1e-12);
}

#[test]
fn test_demo_experiment() {
    let params = Parameters::load(&data("parameters.toml"))
        .and_then(|p| p.with_override_file(&data("overrides.toml")))
        .unwrap();
    let corpus = load_stimulus(&data("stimuli.tsv"), '\t').unwrap();
    let provider = PredictabilityProvider::load(&data("predictability.json")).unwrap();
    let frequencies = FrequencyTable::load(&data("frequencies.json")).unwrap();

    let experiment = Experiment::prepare(&corpus, &provider, &frequencies, params).unwrap();
    assert!(experiment.anomalies().is_empty());
    // corpus words plus language-model candidates
    assert!(experiment.lexicon().lookup("gate").is_some());
    assert!(experiment.lexicon().lookup("morning").is_some());

    let output = experiment.simulate(true);
    println!("{}", output.summary());
    assert_eq!(output.runs.len(), 5);

    let tsv = output.to_tsv();
    assert!(tsv.starts_with(TSV_HEADER));
    assert_eq!(tsv.lines().count(), 1 + output.statistics.fixations as usize);

    let lengths: Vec<usize> = experiment.texts().map(|t| t.len()).collect();
    assert_eq!(lengths, vec![5, 8]);
    for run in &output.runs {
        let measures = run_measures(run, &lengths);
        assert_eq!(measures.len(), 13);
        // the first word is where reading starts
        assert!(!measures[0].skipped);
    }
}
