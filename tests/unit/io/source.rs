use super::*;

#[test]
fn file_names_drive_classification() {
    assert_eq!(MediaRef::Path("/a/b/clip.MOV".into()).file_name(), "clip.MOV");
    assert_eq!(
        MediaRef::Url("https://x.test/m/photo.jpg?sig=1".into()).file_name(),
        "photo.jpg"
    );
    assert_eq!(
        MediaRef::Bytes {
            file_name: "up.png".into(),
            bytes: vec![]
        }
        .file_name(),
        "up.png"
    );
}

#[test]
fn uploaded_bytes_are_staged_and_released_with_the_handle() {
    let dir = tempfile::tempdir().unwrap();
    let handle = LocalMediaSource
        .acquire(
            &MediaRef::Bytes {
                file_name: "photo.png".into(),
                bytes: b"payload".to_vec(),
            },
            dir.path(),
        )
        .unwrap();
    let staged = handle.path().to_path_buf();
    assert!(staged.starts_with(dir.path()));
    assert_eq!(staged.extension().unwrap(), "png");
    assert_eq!(std::fs::read(&staged).unwrap(), b"payload");
    assert_eq!(handle.file_name(), "photo.png");
    drop(handle);
    assert!(!staged.exists());
}

#[test]
fn local_paths_are_used_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.jpg");
    std::fs::write(&path, b"x").unwrap();
    let handle = LocalMediaSource
        .acquire(&MediaRef::Path(path.clone()), dir.path())
        .unwrap();
    assert_eq!(handle.path(), path.as_path());
    drop(handle);
    assert!(path.exists());
}

#[test]
fn missing_files_and_urls_are_decode_errors() {
    let dir = tempfile::tempdir().unwrap();
    for media in [
        MediaRef::Path(dir.path().join("missing.jpg")),
        MediaRef::Url("https://x.test/a.mp4".into()),
    ] {
        assert!(matches!(
            LocalMediaSource.acquire(&media, dir.path()),
            Err(MontageError::Decode(_))
        ));
    }
}
