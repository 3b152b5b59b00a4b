use super::*;
use crate::annotation::color::{GREEN, RED};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    image::RgbImage::new(width, height).save(&path).unwrap();
    path
}

fn backend() -> (TempDir, FileBackend) {
    let temp = tempfile::tempdir().unwrap();
    let backend = FileBackend::new(temp.path().join("store"));
    (temp, backend)
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let (_temp, backend) = backend();
    assert!(backend.list_images().await.unwrap().is_empty());
}

#[tokio::test]
async fn upload_records_dimensions_and_copies_file() {
    let (temp, backend) = backend();
    let source = write_png(temp.path(), "cat.png", 4, 3);

    let summary = backend.upload_image(&source).await.unwrap();
    assert_eq!(summary.file_name, "cat.png");
    assert_eq!((summary.width, summary.height), (4, 3));
    assert_eq!(summary.annotation_count, 0);
    assert!(Path::new(&summary.url).is_file());
    assert!(summary.url.ends_with(".png"));

    let listed = backend.list_images().await.unwrap();
    assert_eq!(listed, vec![summary]);
}

#[tokio::test]
async fn non_image_upload_has_zero_dimensions() {
    let (temp, backend) = backend();
    let source = temp.path().join("notes.txt");
    std::fs::write(&source, "not an image").unwrap();

    let summary = backend.upload_image(&source).await.unwrap();
    assert_eq!((summary.width, summary.height), (0, 0));
}

#[tokio::test]
async fn upload_of_missing_file_is_rejected() {
    let (temp, backend) = backend();
    let err = backend
        .upload_image(&temp.path().join("missing.png"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidUpload { .. }));
}

#[tokio::test]
async fn failed_index_update_leaves_no_stored_copy() {
    let (temp, backend) = backend();
    let source = write_png(temp.path(), "fox.png", 2, 2);
    // A directory in place of the index makes every index read fail.
    std::fs::create_dir_all(backend.root().join("index.json")).unwrap();

    let err = backend.upload_image(&source).await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));

    let stored: Vec<_> = std::fs::read_dir(backend.root().join("images"))
        .unwrap()
        .collect();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn replace_annotations_overwrites_full_set() {
    let (temp, backend) = backend();
    let source = write_png(temp.path(), "dog.png", 2, 2);
    let id = backend.upload_image(&source).await.unwrap().id;

    let first = vec![
        BoundingBox::new(0.0, 0.0, 10.0, 10.0, "a", RED),
        BoundingBox::new(5.0, 5.0, 20.0, 20.0, "b", GREEN),
    ];
    backend.replace_annotations(&id, &first).await.unwrap();
    let second = vec![BoundingBox::new(1.0, 2.0, 3.0, 4.0, "c", GREEN)];
    backend.replace_annotations(&id, &second).await.unwrap();

    let stored = backend.get_image(&id).await.unwrap();
    assert_eq!(stored.summary.annotation_count, 1);
    assert_eq!(stored.annotations, vec![AnnotationRow::from(&second[0])]);
}

#[tokio::test]
async fn delete_removes_row_and_file() {
    let (temp, backend) = backend();
    let source = write_png(temp.path(), "bird.png", 2, 2);
    let summary = backend.upload_image(&source).await.unwrap();

    backend.delete_image(&summary.id).await.unwrap();
    assert!(backend.list_images().await.unwrap().is_empty());
    assert!(!Path::new(&summary.url).exists());
}

#[tokio::test]
async fn unknown_ids_report_not_found() {
    let (_temp, backend) = backend();
    let id = ImageId::from("nope");

    assert!(matches!(
        backend.get_image(&id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        backend.delete_image(&id).await,
        Err(StoreError::NotFound(_))
    ));
    assert!(matches!(
        backend.replace_annotations(&id, &[]).await,
        Err(StoreError::NotFound(_))
    ));
}

#[test]
fn rows_without_color_take_palette_colors() {
    let mut palette = Palette::new(vec![GREEN, RED]);
    let row = AnnotationRow {
        start_x: 0.0,
        start_y: 0.0,
        end_x: 1.0,
        end_y: 1.0,
        label: "x".into(),
        color: None,
    };
    assert_eq!(row.clone().into_box(&mut palette).color, GREEN);
    assert_eq!(row.into_box(&mut palette).color, RED);
}

#[test]
fn rows_read_camel_case_json() {
    let row: AnnotationRow =
        serde_json::from_str(r#"{"startX":1,"startY":2,"endX":3,"endY":4,"label":"cat"}"#)
            .unwrap();
    assert_eq!(row.label, "cat");
    assert_eq!(row.color, None);
    assert_eq!(row.end_y, 4.0);
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_save_sends_error_notice() {
    let (_temp, backend) = backend();
    let backend: Arc<dyn AnnotationBackend> = Arc::new(backend);
    let (mut dispatcher, mut notices) =
        SaveDispatcher::new(backend, tokio::runtime::Handle::current());

    dispatcher.dispatch(ImageId::from("missing"), Vec::new());
    dispatcher.flush().await;

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice, Notice::Error("Failed to save annotations".into()));
    assert!(notice.is_error());
}

#[tokio::test(flavor = "multi_thread")]
async fn successful_save_is_silent_and_persisted() {
    let (temp, file_backend) = backend();
    let source = write_png(temp.path(), "fox.png", 2, 2);
    let id = file_backend.upload_image(&source).await.unwrap().id;
    let backend: Arc<dyn AnnotationBackend> = Arc::new(file_backend.clone());
    let (mut dispatcher, mut notices) =
        SaveDispatcher::new(backend, tokio::runtime::Handle::current());

    let boxes = vec![BoundingBox::new(0.0, 0.0, 1.0, 1.0, "fox", RED)];
    dispatcher.dispatch(id.clone(), boxes);
    dispatcher.flush().await;

    assert!(notices.try_recv().is_err());
    assert_eq!(dispatcher.in_flight(), 0);
    let stored = file_backend.get_image(&id).await.unwrap();
    assert_eq!(stored.annotations.len(), 1);
}
