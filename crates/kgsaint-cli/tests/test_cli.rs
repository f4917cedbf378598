use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Writes a small `movie` dataset: 10 ratings over 3 users and 4 items, and a
/// 4-triple chain over entities 0..=4.
fn movie_dataset() -> TempDir {
    let root = tempfile::tempdir().unwrap();
    let dir = root.path().join("movie");
    fs::create_dir_all(&dir).unwrap();

    let ratings: String = (0..10)
        .map(|i| format!("{}\t{}\t{}\n", i % 3, i % 4, i % 2))
        .collect();
    fs::write(dir.join("ratings_final.txt"), ratings).unwrap();
    fs::write(
        dir.join("kg_final.txt"),
        "0\t0\t1\n1\t1\t2\n2\t0\t3\n3\t2\t4\n",
    )
    .unwrap();
    root
}

fn kgsaint(subcommand: &str, data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kgsaint").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd.arg(subcommand).arg("--data-dir").arg(data_dir);
    cmd
}

fn line_count(path: &Path) -> usize {
    fs::read_to_string(path).unwrap().lines().count()
}

#[test]
fn test_cli_stats() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("stats").arg("--data-dir").arg(root.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Users:          3"))
        .stdout(predicate::str::contains("Items:          4"))
        .stdout(predicate::str::contains("Entities:       5"))
        .stdout(predicate::str::contains("Relations:      3"))
        .stdout(predicate::str::contains("Triples:        4"))
        .stdout(predicate::str::contains("Adjacency:      8"));
    Ok(())
}

#[test]
fn test_cli_missing_dataset() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("stats")
        .arg("--data-dir")
        .arg(root.path())
        .arg("--dataset")
        .arg("music");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Source not found"));
    Ok(())
}

#[test]
fn test_cli_sparse_entity_ids() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    fs::write(root.path().join("movie/kg_final.txt"), "0\t0\t35184372088832\n")?;

    kgsaint("stats", root.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Entity not found: 2"));
    Ok(())
}

#[test]
fn test_cli_cache() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    let dir = root.path().join("movie");

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("cache").arg("--data-dir").arg(root.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("ratings_final.bin"))
        .stdout(predicate::str::contains("kg_final.bin"));

    assert!(dir.join("ratings_final.bin").exists());
    assert!(dir.join("kg_final.bin").exists());

    // A warm cache gives the same statistics as the text tables.
    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("stats").arg("--data-dir").arg(root.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Triples:        4"));
    Ok(())
}

#[test]
fn test_cli_split() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    let out = root.path().join("out");

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("split")
        .arg("--data-dir")
        .arg(root.path())
        .arg("--no-cache")
        .arg("-o")
        .arg(&out);
    cmd.assert().success();

    assert_eq!(line_count(&out.join("train.tsv")), 6);
    assert_eq!(line_count(&out.join("eval.tsv")), 2);
    assert_eq!(line_count(&out.join("test.tsv")), 2);
    assert!(!root.path().join("movie/ratings_final.bin").exists());
    Ok(())
}

#[test]
fn test_cli_split_rejects_bad_ratio() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("split")
        .arg("--data-dir")
        .arg(root.path())
        .arg("-o")
        .arg(root.path().join("out"))
        .arg("--eval-ratio")
        .arg("0.7")
        .arg("--test-ratio")
        .arg("0.7");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid ratio"));
    Ok(())
}

#[test]
fn test_cli_adjacency_coo() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    let output = root.path().join("adj.tsv");

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("adjacency")
        .arg("--data-dir")
        .arg(root.path())
        .arg("-o")
        .arg(&output);
    cmd.assert().success();

    let content = fs::read_to_string(&output)?;
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 8);
    assert_eq!(lines[0], "1\t2\t1");
    assert_eq!(lines[1], "2\t1\t1");
    assert_eq!(lines[2], "2\t3\t2");
    Ok(())
}

#[test]
fn test_cli_adjacency_sampled() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    let first = root.path().join("a.tsv");
    let second = root.path().join("b.tsv");

    for output in [&first, &second] {
        let mut cmd = Command::cargo_bin("kgsaint")?;
        cmd.arg("adjacency")
            .arg("--data-dir")
            .arg(root.path())
            .arg("-o")
            .arg(output)
            .arg("--width")
            .arg("2")
            .arg("--seed")
            .arg("7");
        cmd.assert().success();
    }

    let content = fs::read_to_string(&first)?;
    let lines: Vec<&str> = content.lines().collect();
    // Sentinel row plus entities 1..=5
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "0\t0\t0\t0");
    assert_eq!(lines[1], "2\t0\t1\t0");
    assert!(lines.iter().all(|l| l.split('\t').count() == 4));
    assert_eq!(content, fs::read_to_string(&second)?);
    Ok(())
}

#[test]
fn test_cli_adjacency_zero_width() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("adjacency")
        .arg("--data-dir")
        .arg(root.path())
        .arg("-o")
        .arg(root.path().join("adj.tsv"))
        .arg("--width")
        .arg("0");
    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"));
    Ok(())
}

#[test]
fn test_full_pipeline_from_config() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    let out = root.path().join("out");
    let config = root.path().join("pipeline.json");
    fs::write(
        &config,
        format!(
            r#"{{ "data_dir": {:?}, "split": {{ "eval_ratio": 0.1, "test_ratio": 0.1 }},
                 "flattening": {{ "strategy": "fixed_width", "width": 3 }} }}"#,
            root.path().display().to_string()
        ),
    )?;

    let mut cmd = Command::cargo_bin("kgsaint")?;
    cmd.arg("prepare").arg("--config").arg(&config).arg("-o").arg(&out);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Entities:       5"))
        .stdout(predicate::str::contains("Relations:      3"));

    assert_eq!(line_count(&out.join("train.tsv")), 8);
    assert_eq!(line_count(&out.join("eval.tsv")), 1);
    assert_eq!(line_count(&out.join("test.tsv")), 1);

    let adjacency = fs::read_to_string(out.join("adjacency.tsv"))?;
    assert_eq!(adjacency.lines().count(), 6);
    assert!(adjacency.lines().all(|l| l.split('\t').count() == 6));
    Ok(())
}

#[test]
fn test_cli_prepare_down_samples_train() -> Result<(), Box<dyn std::error::Error>> {
    let root = movie_dataset();
    let out = root.path().join("out");

    kgsaint("prepare", root.path())
        .arg("-o")
        .arg(&out)
        .arg("--train-ratio")
        .arg("0.5")
        .assert()
        .success();

    assert_eq!(line_count(&out.join("train.tsv")), 3);
    assert_eq!(line_count(&out.join("adjacency.tsv")), 8);
    Ok(())
}
