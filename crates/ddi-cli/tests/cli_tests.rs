//! Binary-level tests of `ddi-infer`.
#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;

const DDI_VARS: &[&str] = &[
    "DDI_HOME",
    "DDI_DATA_ROOT",
    "DDI_SAVE_ROOT",
    "DDI_USER_DIR",
    "DDI_ENTRY_POINT",
    "DDI_PYTHON",
    "DDI_PROFILE",
];

fn ddi_infer(home: &Path, args: &[&str]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_ddi-infer"));
    for var in DDI_VARS {
        cmd.env_remove(var);
    }
    cmd.env("DDI_HOME", home)
        .env("RUST_LOG", "warn")
        .args(args)
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

/// Stand-in interpreter exiting with `code` after recording its arguments.
fn fake_python(home: &Path, code: i32) -> PathBuf {
    let path = home.join("fake-python");
    let script = format!(
        "#!/bin/sh\nprintf '%s\\n' \"$@\" > '{}'\nexit {code}\n",
        home.join("argv").display()
    );
    fs::write(&path, script).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    path
}

#[test]
fn show_prints_layout_and_command() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);

    let output = ddi_infer(
        temp.path(),
        &["show", "fold3", "--python", python.to_str().unwrap()],
    );

    assert!(output.status.success());
    let text = stdout(&output);
    let data_dir = temp.path().join("data/fold3/data-bin");
    assert!(text.contains(&format!("data_dir = {}", data_dir.display())), "{text}");
    assert!(text.contains("CUDA_VISIBLE_DEVICES=0"), "{text}");
    assert!(text.contains("--arch drug_gcn_large"), "{text}");
}

#[test]
fn show_json_is_a_launch_plan() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);

    let output = ddi_infer(
        temp.path(),
        &["show", "fold1", "--json", "--batch-size", "16", "--python", python.to_str().unwrap()],
    );

    assert!(output.status.success());
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let args: Vec<&str> = plan["args"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    let pos = args.iter().position(|a| *a == "--batch-size").unwrap();
    assert_eq!(args[pos + 1], "16");
}

#[test]
fn run_forwards_child_exit_code() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 3);

    let output = ddi_infer(
        temp.path(),
        &["run", "fold0", "--python", python.to_str().unwrap(), "--", "--seed", "1"],
    );

    assert_eq!(output.status.code(), Some(3));
    let argv = fs::read_to_string(temp.path().join("argv")).unwrap();
    let argv: Vec<&str> = argv.lines().collect();
    assert_eq!(argv[1], temp.path().join("data/fold0/data-bin").to_str().unwrap());
    assert_eq!(&argv[argv.len() - 2..], ["--seed", "1"]);
}

#[test]
fn dry_run_launches_nothing() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);

    let output = ddi_infer(
        temp.path(),
        &["run", "fold0", "fold1", "--dry-run", "--python", python.to_str().unwrap()],
    );

    assert!(output.status.success());
    assert_eq!(stdout(&output).lines().count(), 2);
    assert!(!temp.path().join("argv").exists());
}

#[test]
fn invalid_fold_is_usage_error() {
    let temp = TempDir::new().unwrap();
    let output = ddi_infer(temp.path(), &["run", "../fold0"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn invalid_profile_is_config_error() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);
    let profile = temp.path().join("profile.json");
    fs::write(&profile, r#"{"batch_size": 0}"#).unwrap();

    let output = ddi_infer(
        temp.path(),
        &[
            "--profile",
            profile.to_str().unwrap(),
            "run",
            "fold0",
            "--python",
            python.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(78));
    assert!(!temp.path().join("argv").exists());
}

#[test]
fn config_set_feeds_paths() {
    let temp = TempDir::new().unwrap();

    let set = ddi_infer(temp.path(), &["config", "set", "data-root", "/srv/folds"]);
    assert!(set.status.success());

    let paths = stdout(&ddi_infer(temp.path(), &["paths"]));
    assert!(paths.contains("data_root = /srv/folds"), "{paths}");
}

#[test]
fn check_fails_on_empty_home() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);

    let output = ddi_infer(
        temp.path(),
        &["check", "fold0", "--device", "none", "--python", python.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(66));
    assert!(stdout(&output).contains("MISSING"));
}

#[test]
fn spaced_paths_survive_config_round_trip() {
    let temp = TempDir::new().unwrap();

    let set = ddi_infer(temp.path(), &["config", "set", "data-root", "/srv/my folds"]);
    assert!(set.status.success());
    let set = ddi_infer(temp.path(), &["config", "set", "save-root", "/srv/ckpt"]);
    assert!(set.status.success());

    let output = ddi_infer(temp.path(), &["paths"]);
    assert!(output.status.success());
    let paths = stdout(&output);
    assert!(paths.contains("data_root = /srv/my folds"), "{paths}");
    assert!(paths.contains("save_root = /srv/ckpt"), "{paths}");
}

fn batch_size_arg(output: &Output) -> String {
    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let args: Vec<&str> = plan["args"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|v| v.as_str())
        .collect();
    let pos = args.iter().position(|a| *a == "--batch-size").unwrap();
    args[pos + 1].to_string()
}

#[test]
fn profile_from_env_file_reaches_show_json() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);
    let from_env = temp.path().join("from-env.json");
    fs::write(&from_env, r#"{"batch_size": 24}"#).unwrap();
    fs::write(
        temp.path().join(".env"),
        format!("DDI_PROFILE={}\n", from_env.display()),
    )
    .unwrap();

    let output = ddi_infer(
        temp.path(),
        &["show", "fold0", "--json", "--python", python.to_str().unwrap()],
    );
    assert!(output.status.success());
    assert_eq!(batch_size_arg(&output), "24");

    let explicit = temp.path().join("explicit.json");
    fs::write(&explicit, r#"{"batch_size": 48}"#).unwrap();
    let output = ddi_infer(
        temp.path(),
        &[
            "--profile",
            explicit.to_str().unwrap(),
            "show",
            "fold0",
            "--json",
            "--python",
            python.to_str().unwrap(),
        ],
    );
    assert!(output.status.success());
    assert_eq!(batch_size_arg(&output), "48");
}

#[test]
fn dry_run_rejects_repeated_folds() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);

    let output = ddi_infer(
        temp.path(),
        &["run", "fold0", "fold0", "--dry-run", "--python", python.to_str().unwrap()],
    );

    assert_eq!(output.status.code(), Some(2));
    assert!(stdout(&output).is_empty());
}

#[test]
fn profile_task_with_separators_is_config_error() {
    let temp = TempDir::new().unwrap();
    let python = fake_python(temp.path(), 0);
    let profile = temp.path().join("profile.json");
    fs::write(&profile, r#"{"task": "../../escape"}"#).unwrap();

    let output = ddi_infer(
        temp.path(),
        &[
            "--profile",
            profile.to_str().unwrap(),
            "show",
            "fold0",
            "--python",
            python.to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(78));
}
