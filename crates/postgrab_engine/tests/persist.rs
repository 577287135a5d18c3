mod common;

use std::fs;

use common::entries;
use postgrab_engine::{
    ensure_output_dir, persist_without_clobber, sanitize_filename, AtomicFileWriter,
};
use tempfile::{NamedTempFile, TempDir};

#[test]
fn creates_missing_output_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("out").join("nested");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
    // Idempotent.
    ensure_output_dir(&new_dir).unwrap();
}

#[test]
fn output_dir_that_is_a_file_is_rejected() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();
    assert!(ensure_output_dir(&file_path).is_err());
}

#[test]
fn atomic_write_replaces_existing() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("pic_1.jpg", b"hello").unwrap();
    assert_eq!(first.file_name().unwrap(), "pic_1.jpg");
    assert_eq!(fs::read(&first).unwrap(), b"hello");

    let second = writer.write("pic_1.jpg", b"world").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"world");
    assert_eq!(entries(temp.path()), vec!["pic_1.jpg"]);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("pic_1.jpg", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("pic_1.jpg").exists());
}

#[test]
fn persist_picks_next_free_numbered_name() {
    let temp = TempDir::new().unwrap();
    let destination = temp.path().join("clip.mp4");
    fs::write(&destination, b"original").unwrap();
    fs::write(temp.path().join("clip_(1).mp4"), b"taken").unwrap();

    let mut staged = NamedTempFile::new_in(temp.path()).unwrap();
    std::io::Write::write_all(&mut staged, b"new").unwrap();
    let written = persist_without_clobber(staged.into_temp_path(), &destination).unwrap();

    assert_eq!(written, temp.path().join("clip_(2).mp4"));
    assert_eq!(fs::read(&destination).unwrap(), b"original");
    assert_eq!(fs::read(temp.path().join("clip_(1).mp4")).unwrap(), b"taken");
    assert_eq!(fs::read(&written).unwrap(), b"new");
}

#[test]
fn filenames_are_made_safe() {
    assert_eq!(sanitize_filename("My: Title?/Bad.mp4"), "My_ Title__Bad.mp4");
    assert_eq!(sanitize_filename("  ..  "), "Untitled");
    assert_eq!(sanitize_filename("CON.mp4"), "CON_.mp4");
    assert_eq!(sanitize_filename("con"), "con_");
    assert_eq!(sanitize_filename("My_Title_1.jpg"), "My_Title_1.jpg");

    let long = "é".repeat(200);
    let sanitized = sanitize_filename(&long);
    assert!(sanitized.len() <= 255);
    assert!(sanitized.chars().all(|c| c == 'é'));
}

#[test]
fn long_names_keep_their_extension() {
    let video = sanitize_filename(&format!("{}.mp4", "a".repeat(300)));
    assert_eq!(video.len(), 255);
    assert!(video.ends_with(".mp4"));

    let image = sanitize_filename(&format!("{}_1.jpg", "é".repeat(200)));
    assert!(image.len() <= 255);
    assert!(image.ends_with(".jpg"));

    let folder = sanitize_filename(&format!("abc_{}", "Mr. Smith ".repeat(40)));
    assert!(folder.len() <= 255);
    assert!(folder.starts_with("abc_Mr. Smith"));
}

#[test]
fn collisions_on_a_long_title_still_resolve() {
    let temp = TempDir::new().unwrap();
    let destination = temp
        .path()
        .join(sanitize_filename(&format!("{}.mp4", "x".repeat(260))));
    fs::write(&destination, b"original").unwrap();

    let mut written = Vec::new();
    for content in [b"first", b"other"] {
        let mut staged = NamedTempFile::new_in(temp.path()).unwrap();
        std::io::Write::write_all(&mut staged, content).unwrap();
        written.push(persist_without_clobber(staged.into_temp_path(), &destination).unwrap());
    }

    let names: Vec<String> = written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert!(names[0].ends_with("_(1).mp4"));
    assert!(names[1].ends_with("_(2).mp4"));
    assert!(names.iter().all(|name| name.len() <= 255));
    assert_eq!(fs::read(&destination).unwrap(), b"original");
    assert_eq!(fs::read(&written[0]).unwrap(), b"first");
    assert_eq!(fs::read(&written[1]).unwrap(), b"other");
}
