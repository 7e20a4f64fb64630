mod common;

use std::fs;
use tempfile::TempDir;

use common::{create_grammar_project, create_pure_project, wheelwright_command};

#[test]
fn tag_rewrites_explicit_cpython_triple() {
    let output = wheelwright_command()
        .args(["tag", "--from", "cp312-cp312-linux_x86_64"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "cp38-abi3-linux_x86_64"
    );
}

#[test]
fn tag_leaves_pypy_alone() {
    let output = wheelwright_command()
        .args(["tag", "--from", "pp39-pypy39_pp73-linux_x86_64"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "pp39-pypy39_pp73-linux_x86_64"
    );
}

#[test]
fn tag_plat_name_override() {
    let output = wheelwright_command()
        .args([
            "tag",
            "--from",
            "cp310-cp310-linux_x86_64",
            "--plat-name",
            "manylinux2014_x86_64",
        ])
        .output()
        .unwrap();

    assert_eq!(
        String::from_utf8_lossy(&output.stdout).trim(),
        "cp38-abi3-manylinux2014_x86_64"
    );
}

#[test]
fn tag_rejects_malformed_triple() {
    let output = wheelwright_command()
        .args(["tag", "--from", "cp312"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("malformed wheel tag"));
}

#[test]
fn build_stages_pure_project() {
    let temp = TempDir::new().unwrap();
    let root = create_pure_project(&temp);

    let output = wheelwright_command()
        .arg("build")
        .arg("--project")
        .arg(&root)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(root.join("build/lib/demo/__init__.py").is_file());
    assert!(root.join("build/lib/demo/py.typed").is_file());
}

#[test]
fn bdist_wheel_packs_pure_project() {
    let temp = TempDir::new().unwrap();
    let root = create_pure_project(&temp);
    let dist = temp.path().join("wheels");

    let output = wheelwright_command()
        .arg("bdist-wheel")
        .arg("--project")
        .arg(&root)
        .arg("--dist-dir")
        .arg(&dist)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "{}",
        String::from_utf8_lossy(&output.stderr)
    );
    let wheel = dist.join("demo-0.1.0-py3-none-any.whl");
    assert!(wheel.is_file());
    assert!(fs::metadata(&wheel).unwrap().len() > 0);
}

#[test]
fn build_reports_missing_parser_source() {
    let temp = TempDir::new().unwrap();
    let root = create_grammar_project(&temp, false);

    let output = wheelwright_command()
        .arg("build")
        .arg("--project")
        .arg(&root)
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("error:"), "{stderr}");
    assert!(stderr.contains("parser.c"), "{stderr}");
    assert!(!root.join("build").exists());
}

#[test]
fn build_without_config_fails() {
    let temp = TempDir::new().unwrap();

    let output = wheelwright_command()
        .arg("build")
        .arg("--project")
        .arg(temp.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("wheelwright.toml"));
}

#[test]
fn completion_generates_script() {
    let output = wheelwright_command()
        .args(["completion", "bash"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("wheelwright"));
}
