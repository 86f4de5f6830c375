//! End-to-end external sort tests, run against the real filesystem.

use rowsort::prelude::*;

fn sorter(dir: &std::path::Path, key_arity: usize, val_arity: usize, descending: Direction, buffer: usize) -> Sorter<Value> {
    Sorter::builder()
        .statement_context(())
        .schema(key_arity, val_arity)
        .buffer(buffer)
        .descending(descending)
        .tmp_dir(dir.to_path_buf())
        .workers(3)
        .build()
        .expect("sorter should build with a valid configuration")
}

fn keys_of(sorter: &Sorter<Value>) -> Vec<i64> {
    let mut out = Vec::new();
    while let Some((key, _, _)) = sorter.output().unwrap() {
        out.push(key[0].as_i64().unwrap());
    }
    out
}

fn is_sorted(xs: &[i64]) -> bool {
    xs.windows(2).all(|w| w[0] <= w[1])
}

#[test]
fn single_row_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 1, 1, vec![false], 8);
    sorter
        .input(vec![Value::I64(42)], vec![Value::Str("only".into())], 1)
        .unwrap();
    assert_eq!(keys_of(&sorter), vec![42]);
    sorter.close().unwrap();
}

#[test]
fn exactly_at_capacity_forces_one_run_per_worker() {
    // buffer(6) over 3 workers -> batch_capacity 2 each; feed exactly 6 rows.
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 1, 1, vec![false], 6);
    for k in (0..6).rev() {
        sorter
            .input(vec![Value::I64(k)], vec![Value::Str("v".into())], k)
            .unwrap();
    }
    let out = keys_of(&sorter);
    assert!(is_sorted(&out));
    assert_eq!(out, vec![0, 1, 2, 3, 4, 5]);
    sorter.close().unwrap();
}

#[test]
fn far_exceeding_capacity_spills_many_runs() {
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 1, 1, vec![false], 16);
    let n = 2000i64;
    for k in (0..n).rev() {
        sorter
            .input(vec![Value::I64(k)], vec![Value::Str(format!("row-{k}"))], k)
            .unwrap();
    }
    let out = keys_of(&sorter);
    assert_eq!(out.len(), n as usize);
    assert!(is_sorted(&out));
    assert_eq!(out[0], 0);
    assert_eq!(out[out.len() - 1], n - 1);
    sorter.close().unwrap();
}

#[test]
fn many_equal_keys_preserve_count() {
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 1, 1, vec![false], 32);
    for i in 0..300i64 {
        sorter
            .input(vec![Value::I64(7)], vec![Value::I64(i)], i)
            .unwrap();
    }
    let out = keys_of(&sorter);
    assert_eq!(out.len(), 300);
    assert!(out.iter().all(|&k| k == 7));
    sorter.close().unwrap();
}

#[test]
fn output_is_a_permutation_of_the_input_handles() {
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 1, 1, vec![false], 10);
    let mut handles_in: Vec<i64> = (0..250).map(|i| (i * 37) % 251).collect();
    for &h in &handles_in {
        sorter
            .input(vec![Value::I64(h)], vec![Value::Str("v".into())], h)
            .unwrap();
    }
    let mut handles_out = Vec::new();
    while let Some((_, _, handle)) = sorter.output().unwrap() {
        handles_out.push(handle);
    }
    handles_in.sort_unstable();
    handles_out.sort_unstable();
    assert_eq!(handles_in, handles_out);
    sorter.close().unwrap();
}

#[test]
fn wrong_phase_after_output_has_started() {
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 1, 1, vec![false], 8);
    sorter
        .input(vec![Value::I64(1)], vec![Value::Str("a".into())], 1)
        .unwrap();
    let _ = sorter.output().unwrap();
    let err = sorter
        .input(vec![Value::I64(2)], vec![Value::Str("b".into())], 2)
        .unwrap_err();
    assert!(matches!(err, SortError::WrongPhase));
    sorter.close().unwrap();
}

#[test]
fn row_arity_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let sorter = sorter(dir.path(), 2, 1, vec![false, false], 8);
    let err = sorter
        .input(vec![Value::I64(1)], vec![Value::Str("v".into())], 1)
        .unwrap_err();
    assert!(matches!(err, SortError::Config(_)));
}

#[test]
fn nonexistent_tmp_dir_is_rejected_at_build_time() {
    let err = Sorter::<Value>::builder()
        .statement_context(())
        .schema(1, 1)
        .buffer(8)
        .descending(vec![false])
        .tmp_dir(std::path::PathBuf::from("/no/such/directory/rowsort-test"))
        .build()
        .unwrap_err();
    assert!(matches!(err, SortError::Config(_)));
}

#[test]
fn close_cleans_up_the_scratch_directory_after_a_large_sort() {
    let dir = tempfile::tempdir().unwrap();
    let scratch = dir.path().join("scratch");
    std::fs::create_dir(&scratch).unwrap();
    let sorter = sorter(&scratch, 1, 1, vec![false], 16);
    for k in 0..500i64 {
        sorter
            .input(vec![Value::I64(k)], vec![Value::Str("v".into())], k)
            .unwrap();
    }
    let _ = keys_of(&sorter);
    sorter.close().unwrap();
    assert!(!scratch.exists());
}
