//! End-to-end index runs over real temp directories.
//!
//! Exercises the public pipeline API the same way the CLI does: load config
//! from the strip directory, apply overrides, build, then inspect what ended
//! up on disk.

use std::fs;
use std::path::Path;
use strip_index::config::{self, Config, IdFormat, IdMode, Overrides};
use strip_index::pipeline::{self, PipelineError};
use strip_index::types::VariantTag;
use tempfile::TempDir;

fn strip(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    for name in names {
        fs::write(tmp.path().join(name), name.as_bytes()).unwrap();
    }
    tmp
}

fn listing(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn pairs_primary_with_mask_and_reports_incomplete() {
    let tmp = strip(&["A_1.jpg", "A_1_mask.jpg", "A_2.jpg"]);
    let mut config = Config::default();
    config.base_url = "https://host/strip1/".into();

    let run = pipeline::build_index(tmp.path(), &config).unwrap();

    assert_eq!(
        read_json(&run.output),
        serde_json::json!([
            {
                "id": 1,
                "primary": "https://host/strip1/A_1.jpg",
                "mask": "https://host/strip1/A_1_mask.jpg"
            }
        ])
    );
    assert_eq!(run.diagnostics.incomplete.len(), 1);
    assert_eq!(run.diagnostics.incomplete[0].logical_key, "A_2");
}

#[test]
fn unrecognized_names_and_collisions_reach_diagnostics() {
    let tmp = strip(&["_mask.png", ".hidden.jpg", "A_1.jpg", "A_1_MASK.jpg", "A_1_mask.png"]);
    let mut config = Config::default();
    config.base_url = "http://h".into();

    let run = pipeline::build_index(tmp.path(), &config).unwrap();

    assert_eq!(run.diagnostics.unrecognized, vec![".hidden.jpg", "_mask.png"]);
    assert_eq!(run.diagnostics.collisions.len(), 1);
    let collision = &run.diagnostics.collisions[0];
    assert_eq!(collision.logical_key, "A_1");
    assert_eq!(collision.tag, VariantTag::Mask);
    // Sorted listing puts the uppercase spelling first, so it is the one replaced.
    assert_eq!(collision.replaced, "A_1_MASK.jpg");
    assert_eq!(collision.kept, "A_1_mask.png");
    assert_eq!(
        read_json(&run.output),
        serde_json::json!([
            { "id": 1, "primary": "http://h/A_1.jpg", "mask": "http://h/A_1_mask.png" }
        ])
    );
    assert!(run.diagnostics.incomplete.is_empty());
}

#[test]
fn json_keys_follow_id_then_tag_order() {
    let tmp = strip(&["k_mask.png", "k_an.jpg", "k.jpg"]);
    let mut config = Config::default();
    config.index.required = vec![VariantTag::Annotation, VariantTag::Mask, VariantTag::Primary];

    let run = pipeline::build_index(tmp.path(), &config).unwrap();
    let text = fs::read_to_string(&run.output).unwrap();
    let id = text.find("\"id\"").unwrap();
    let primary = text.find("\"primary\"").unwrap();
    let mask = text.find("\"mask\"").unwrap();
    let annotation = text.find("\"annotation\"").unwrap();
    assert!(id < primary && primary < mask && mask < annotation);
}

#[test]
fn rerun_is_byte_identical() {
    let tmp = strip(&[
        "S1_00003.jpg",
        "S1_00003_mask.png",
        "S1_00001.jpg",
        "S1_00001_MASK.png",
        "S1_00002.jpg",
    ]);
    let mut config = Config::default();
    config.index.id_mode = IdMode::Extracted;

    let first = pipeline::build_index(tmp.path(), &config).unwrap();
    let bytes = fs::read(&first.output).unwrap();
    let second = pipeline::build_index(tmp.path(), &config).unwrap();

    assert_eq!(fs::read(&second.output).unwrap(), bytes);
    assert_eq!(first.digest, second.digest);
}

#[test]
fn extracted_ids_sort_numerically() {
    let tmp = strip(&["S_10.jpg", "S_10_mask.jpg", "S_2.jpg", "S_2_mask.jpg"]);
    let mut config = Config::default();
    config.index.id_mode = IdMode::Extracted;
    config.index.id_format = IdFormat::Padded;

    let run = pipeline::build_index(tmp.path(), &config).unwrap();
    let json = read_json(&run.output);
    assert_eq!(json[0]["id"], "2");
    assert_eq!(json[1]["id"], "10");
}

#[test]
fn config_file_in_source_is_picked_up() {
    let tmp = strip(&["img1.jpg", "img1_AN.jpg", "img2.jpg", "img2_mask.jpg"]);
    fs::write(
        tmp.path().join(config::CONFIG_FILENAME),
        r#"
output = "viewer.json"

[index]
required = ["primary", "annotation"]

[index.keys]
primary = "rgb"
annotation = "an"
"#,
    )
    .unwrap();

    let config = config::load_config(tmp.path(), None).unwrap();
    let run = pipeline::build_index(tmp.path(), &config).unwrap();

    assert_eq!(run.output, tmp.path().join("viewer.json"));
    assert_eq!(
        read_json(&run.output),
        serde_json::json!([{ "id": 1, "rgb": "img1.jpg", "an": "img1_AN.jpg" }])
    );
}

#[test]
fn cli_overrides_beat_config_file() {
    let tmp = strip(&["a.jpg", "a_mask.jpg"]);
    fs::write(
        tmp.path().join(config::CONFIG_FILENAME),
        "base_url = \"http://file\"\n",
    )
    .unwrap();

    let mut config = config::load_config(tmp.path(), None).unwrap();
    config
        .apply(&Overrides {
            base_url: Some("http://flag".into()),
            ..Overrides::default()
        })
        .unwrap();
    let run = pipeline::build_index(tmp.path(), &config).unwrap();
    assert_eq!(run.entries[0].url("primary"), Some("http://flag/a.jpg"));
}

#[test]
fn unknown_config_key_is_rejected() {
    let tmp = strip(&[]);
    fs::write(tmp.path().join(config::CONFIG_FILENAME), "colour = 1\n").unwrap();
    assert!(config::load_config(tmp.path(), None).is_err());
}

#[test]
fn rename_moves_files_and_indexes_new_names() {
    let tmp = strip(&["S3_02858.jpg", "S3_02858_mask.png", "S3_02859.JPG", "S3_02859_Mask.png"]);
    let mut config = Config::default();
    config.index.id_mode = IdMode::Extracted;
    config.index.id_format = IdFormat::Padded;
    config.index.rename = true;

    let run = pipeline::build_index(tmp.path(), &config).unwrap();

    assert_eq!(run.renames.len(), 4);
    assert_eq!(
        listing(tmp.path()),
        vec![
            "02858.jpg",
            "02858_mask.png",
            "02859.JPG",
            "02859_mask.png",
            "index.json",
        ]
    );
    assert_eq!(fs::read_to_string(tmp.path().join("02859.JPG")).unwrap(), "S3_02859.JPG");
    let json = read_json(&run.output);
    assert_eq!(json[1]["primary"], "02859.JPG");
    assert_eq!(json[1]["mask"], "02859_mask.png");
}

#[test]
fn rename_refused_when_any_id_fails() {
    let names = ["S_1.jpg", "S_1_mask.jpg", "odd.jpg", "odd_mask.jpg"];
    let tmp = strip(&names);
    let mut config = Config::default();
    config.index.id_mode = IdMode::Extracted;
    config.index.rename = true;

    let err = pipeline::build_index(tmp.path(), &config).unwrap_err();
    assert!(matches!(err, PipelineError::RenameBlocked(1)));

    let mut expected: Vec<String> = names.iter().map(|s| s.to_string()).collect();
    expected.sort();
    assert_eq!(listing(tmp.path()), expected);
}

#[test]
fn without_rename_id_failures_are_not_fatal() {
    let tmp = strip(&["S_1.jpg", "S_1_mask.jpg", "odd.jpg", "odd_mask.jpg"]);
    let mut config = Config::default();
    config.index.id_mode = IdMode::Extracted;

    let run = pipeline::build_index(tmp.path(), &config).unwrap();
    assert_eq!(run.entries.len(), 1);
    assert_eq!(run.diagnostics.id_failures[0].logical_key, "odd");
}

#[test]
fn empty_strip_writes_empty_array() {
    let tmp = strip(&["readme.txt"]);
    let run = pipeline::build_index(tmp.path(), &Config::default()).unwrap();
    assert_eq!(fs::read_to_string(&run.output).unwrap(), "[]\n");
}

#[test]
fn check_leaves_directory_untouched() {
    let names = ["S_1.jpg", "S_1_mask.jpg"];
    let tmp = strip(&names);
    let mut config = Config::default();
    config.index.id_mode = IdMode::Extracted;
    config.index.rename = true;

    let plan = pipeline::plan_index(tmp.path(), &config).unwrap();
    assert_eq!(plan.renames.len(), 2);
    assert_eq!(listing(tmp.path()), vec!["S_1.jpg", "S_1_mask.jpg"]);
}
