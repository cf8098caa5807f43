use param_fs::{Error, ParamFile, io};
use std::fs;
use tempfile::TempDir;

#[test]
fn test_write_atomic_creates_file() {
    let temp = TempDir::new().unwrap();
    let path = ParamFile::new(temp.path().join("params.yaml"));

    io::write_atomic(&path, b"a: 1\n").unwrap();

    let content = fs::read_to_string(path.to_native()).unwrap();
    assert_eq!(content, "a: 1\n");
}

#[test]
fn test_write_atomic_overwrites_existing() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("params.yaml");
    fs::write(&file_path, "a: 1\n").unwrap();

    let path = ParamFile::new(&file_path);
    io::write_atomic(&path, b"a: 2\n").unwrap();

    let content = fs::read_to_string(&file_path).unwrap();
    assert_eq!(content, "a: 2\n");
}

#[test]
fn test_write_text_creates_parent_directories() {
    let temp = TempDir::new().unwrap();
    let path = ParamFile::new(temp.path().join("nested").join("deeper").join("params.yaml"));

    io::write_text(&path, "batch_size: 5\n").unwrap();

    assert_eq!(io::read_text(&path).unwrap(), "batch_size: 5\n");
}

#[test]
fn test_write_leaves_no_temp_files() {
    let temp = TempDir::new().unwrap();
    let path = ParamFile::new(temp.path().join("params.yaml"));

    io::write_text(&path, "x: 1\n").unwrap();

    let leftovers: Vec<_> = fs::read_dir(temp.path())
        .unwrap()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty(), "found temp files: {:?}", leftovers);
}

#[test]
fn test_read_text_nonexistent_file() {
    let path = ParamFile::new("/nonexistent/params.yaml");
    let result = io::read_text(&path);
    assert!(matches!(result, Err(Error::Io { .. })));
}
