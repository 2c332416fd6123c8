//! Integration tests for the scan and render commands.

use std::fs;
use std::path::Path;

use narrate::cli::{run_render, run_scan, RenderArgs, ScanArgs, EXIT_ERROR, EXIT_SUCCESS};

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn scan_args(dir: &Path, force: bool) -> ScanArgs {
    ScanArgs {
        path: dir.to_path_buf(),
        output: Some("expo".to_string()),
        config: None,
        force,
    }
}

fn project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "tool.py",
        "# THROUGHLINE: a tool\n\n# SKILL: runs it\ndef run():\n    pass\n",
    );
    write(dir.path(), "broken.py", "s = '''never closed\n");
    dir
}

#[test]
fn test_scan_writes_dictionary_and_index() {
    let dir = project();
    let code = run_scan(&scan_args(dir.path(), false)).unwrap();
    assert_eq!(code, EXIT_SUCCESS);

    let index = fs::read_to_string(dir.path().join("expo.txt")).unwrap();
    assert_eq!(index, "tool:THROUGHLINE\ntool.run:SKILL\n");
    assert!(dir.path().join("expo.json").exists());
}

#[test]
fn test_scan_refuses_to_overwrite_dictionary() {
    let dir = project();
    assert_eq!(run_scan(&scan_args(dir.path(), false)).unwrap(), EXIT_SUCCESS);
    assert_eq!(run_scan(&scan_args(dir.path(), false)).unwrap(), EXIT_ERROR);
    assert_eq!(run_scan(&scan_args(dir.path(), true)).unwrap(), EXIT_SUCCESS);
}

#[test]
fn test_scan_keeps_editorialised_index() {
    let dir = project();
    write(dir.path(), "expo.txt", "My story\ntool.run:SKILL\n");

    assert_eq!(run_scan(&scan_args(dir.path(), false)).unwrap(), EXIT_SUCCESS);
    let index = fs::read_to_string(dir.path().join("expo.txt")).unwrap();
    assert_eq!(index, "My story\ntool.run:SKILL\n");
    assert!(dir.path().join("expo.json").exists());
}

#[test]
fn test_scan_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let code = run_scan(&scan_args(&dir.path().join("absent"), false)).unwrap();
    assert_eq!(code, EXIT_ERROR);
}

#[test]
fn test_scan_with_config_file() {
    let dir = project();
    let config = dir.path().join("narrate.yaml");
    fs::write(&config, "output: lexicon\nparallel: false\n").unwrap();

    let args = ScanArgs {
        path: dir.path().to_path_buf(),
        output: None,
        config: Some(config),
        force: false,
    };
    assert_eq!(run_scan(&args).unwrap(), EXIT_SUCCESS);
    assert!(dir.path().join("lexicon.json").exists());
    assert!(dir.path().join("lexicon.txt").exists());
}

#[test]
fn test_render_after_scan() {
    let dir = project();
    assert_eq!(run_scan(&scan_args(dir.path(), false)).unwrap(), EXIT_SUCCESS);

    let output = dir.path().join("story.md");
    let args = RenderArgs {
        base: dir.path().join("expo"),
        output: Some(output.clone()),
        config: None,
    };
    assert_eq!(run_render(&args).unwrap(), EXIT_SUCCESS);

    let markdown = fs::read_to_string(output).unwrap();
    assert_eq!(
        markdown,
        "# tool · *THROUGHLINE*\n\na tool\n\n# tool.run · *SKILL*\n\nruns it\n\n"
    );
}

#[test]
fn test_render_missing_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let args = RenderArgs {
        base: dir.path().join("expo"),
        output: Some(dir.path().join("out.md")),
        config: None,
    };
    assert_eq!(run_render(&args).unwrap(), EXIT_ERROR);
}
