//! End-to-end normalization over CSV fixtures.

use std::fs;
use std::path::Path;

use fairrec_cli::pipeline::{NormalizeConfig, run_normalize};
use fairrec_model::{InteractionMode, OrphanPolicy, TableKind};

const ARTICLES: &str = "article_id,title,category_str,premium\n\
                        9001,Ny regering dannet,nyheder,false\n\
                        9002,Superliga: FCK vinder,sport,true\n\
                        9003,Vejret,nyheder,false\n";

const BEHAVIORS: &str = "impression_id,user_id,article_id,impression_time,article_ids_inview,article_ids_clicked,gender,age,is_subscriber\n\
                         1,501,9001,2023-05-18 07:00:00,\"[9001, 9002]\",[9002],0,30,true\n\
                         2,502,9002,2023-05-18 07:05:00,\"[9002, 9003]\",[9003],,,false\n\
                         3,501,,2023-05-18 07:10:00,\"[9003]\",[9003],0,30,true\n\
                         4,503,9003,,\"[9001]\",[9001],1,40,false\n";

fn data_root(dir: &Path) -> std::path::PathBuf {
    let root = dir.join("ebnerd_small");
    fs::create_dir_all(root.join("train")).unwrap();
    fs::write(root.join("articles.csv"), ARTICLES).unwrap();
    fs::write(root.join("train/behaviors.csv"), BEHAVIORS).unwrap();
    root
}

fn config(dir: &Path) -> NormalizeConfig {
    NormalizeConfig {
        data_root: data_root(dir),
        output_dir: dir.join("dataset"),
        ..NormalizeConfig::default()
    }
}

#[test]
fn article_mode_writes_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let result = run_normalize(&config(dir.path())).unwrap();

    assert_eq!(result.dataset_dir, dir.path().join("dataset/ebnerd"));
    assert_eq!(result.behavior_rows, 4);
    assert_eq!(result.article_rows, 3);

    let inter = fs::read_to_string(result.dataset_dir.join("ebnerd.inter")).unwrap();
    let lines: Vec<&str> = inter.lines().collect();
    assert_eq!(lines[0], "user_id:token\titem_id:token\ttimestamp:float\tlabel:float");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1], "0\t0\t1684393200\t1");
    assert_eq!(lines[2], "1\t1\t1684393500\t1");

    let users = fs::read_to_string(result.dataset_dir.join("ebnerd.user")).unwrap();
    assert_eq!(users.lines().count(), 4);
    assert!(users.contains("\n1\t\t\t0\n"));

    let items = fs::read_to_string(result.dataset_dir.join("ebnerd.item")).unwrap();
    assert!(items.contains("\n1\tSuperliga: FCK vinder\tsport\t1\n"));

    let dropped = &result.manifest.dropped;
    assert_eq!(dropped.missing_item, 1);
    assert_eq!(dropped.missing_timestamp, 1);
    assert_eq!(dropped.total(), 2);
    assert_eq!(result.manifest.table(TableKind::Inter).unwrap().rows, 2);
}

#[test]
fn impression_mode_labels_clicks() {
    let dir = tempfile::tempdir().unwrap();
    let config = NormalizeConfig {
        mode: InteractionMode::Impressions,
        dataset: "ebnerd_imp".to_string(),
        ..config(dir.path())
    };
    let result = run_normalize(&config).unwrap();

    let inter = fs::read_to_string(result.dataset_dir.join("ebnerd_imp.inter")).unwrap();
    let labels: Vec<&str> = inter
        .lines()
        .skip(1)
        .map(|line| line.rsplit('\t').next().unwrap())
        .collect();
    assert_eq!(labels, vec!["0", "1", "0", "1", "1"]);
    assert_eq!(result.manifest.dropped.missing_timestamp, 1);
}

#[test]
fn rerun_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    let first = run_normalize(&config).unwrap();
    let snapshot: Vec<Vec<u8>> = first
        .manifest
        .tables
        .iter()
        .map(|entry| fs::read(first.dataset_dir.join(&entry.file)).unwrap())
        .collect();
    let manifest = fs::read(&first.manifest_path).unwrap();

    let second = run_normalize(&config).unwrap();
    for (entry, bytes) in second.manifest.tables.iter().zip(&snapshot) {
        assert_eq!(&fs::read(second.dataset_dir.join(&entry.file)).unwrap(), bytes);
    }
    assert_eq!(fs::read(&second.manifest_path).unwrap(), manifest);
}

#[test]
fn orphan_article_fails_by_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path());
    fs::write(
        config.data_root.join("articles.csv"),
        "article_id,title,category_str,premium\n9001,Ny regering dannet,nyheder,false\n9003,Vejret,nyheder,false\n",
    )
    .unwrap();

    let err = run_normalize(&config).unwrap_err();
    let message = format!("{err:#}");
    assert!(message.contains("'9002'"), "{message}");
    assert!(!config.output_dir.join("ebnerd").exists());

    let dropping = NormalizeConfig {
        orphans: OrphanPolicy::Drop,
        ..config
    };
    let result = run_normalize(&dropping).unwrap();
    assert_eq!(result.manifest.dropped.orphan_item, 1);
}

#[test]
fn missing_sources_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let config = NormalizeConfig {
        data_root: dir.path().join("nowhere"),
        output_dir: dir.path().join("dataset"),
        ..NormalizeConfig::default()
    };
    let err = run_normalize(&config).unwrap_err();
    assert!(format!("{err:#}").contains("nowhere"));
}
