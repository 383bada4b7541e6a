//! Full pipeline: generate or write a dataset, load it, aggregate,
//! validate against a reference file.

use crate::common;
use groupby_bench::{
    generate, load_dataset, load_validation, run_algorithm, validate, Algorithm, Error,
    ExecOptions,
};
use groupby_dataset::generator::{Distribution, GeneratorConfig};

#[test]
fn pipeline_passes_validation() {
    let rows = common::uniform_rows(20_000, 300, 41);
    let dataset = common::write_dataset(&rows);

    let table = load_dataset(dataset.path()).unwrap();
    assert_eq!(table.n_rows(), 20_000);

    let expected = common::reference_rows(&table);
    let validation = common::write_validation(&expected);
    let reference = load_validation(validation.path()).unwrap();

    for alg in common::parallel_algorithms() {
        let (got, _) = run_algorithm(alg, &table, &ExecOptions::new(4)).unwrap();
        let checked = validate(&got, &reference).unwrap();
        assert_eq!(checked, expected.len(), "{alg} output incomplete");
    }
}

#[test]
fn pipeline_detects_corrupted_reference() {
    let rows = common::uniform_rows(5_000, 50, 42);
    let dataset = common::write_dataset(&rows);
    let table = load_dataset(dataset.path()).unwrap();

    let mut expected = common::reference_rows(&table);
    expected[0].sum += 1; // corrupt one field
    let validation = common::write_validation(&expected);
    let reference = load_validation(validation.path()).unwrap();

    let (got, _) = run_algorithm(Algorithm::Sequential, &table, &ExecOptions::new(1)).unwrap();
    let err = validate(&got, &reference).unwrap_err();
    assert!(matches!(err, Error::Validation { field: "sum", .. }));
}

#[test]
fn generated_dataset_flows_through_every_strategy() {
    let output = tempfile::NamedTempFile::new().unwrap();
    generate(&GeneratorConfig {
        output_path: output.path().to_path_buf(),
        num_rows: 30_000,
        num_groups: 2_000,
        distribution: Distribution::Exponential { lambda: 5.0 },
        seed: Some(7),
    })
    .unwrap();

    let table = load_dataset(output.path()).unwrap();
    assert_eq!(table.n_rows(), 30_000);
    let expected = common::reference_rows(&table);
    let total: i64 = expected.iter().map(|r| r.count).sum();
    assert_eq!(total, 30_000);

    for alg in common::parallel_algorithms() {
        let got = common::run_sorted(alg, &table, 4, 1000);
        assert_eq!(got, expected, "{alg} diverged on generated dataset");
    }
}
