use bytes::Bytes;
use mockito::Matcher;
use wavesync_storage::{CloudinaryStorage, ContentKind, MediaAsset, Storage, StorageError};

fn storage(server: &mockito::ServerGuard) -> CloudinaryStorage {
    CloudinaryStorage::new("demo".into(), "key".into(), "secret".into())
        .unwrap()
        .with_api_base(server.url())
}

#[tokio::test]
async fn audio_upload_reports_floored_duration() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1_1/demo/auto/upload")
        .match_body(Matcher::Regex("wavesync/audio".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"secure_url":"https://res.cloudinary.com/demo/video/upload/v1/wavesync/audio/abc.mp3",
                "public_id":"wavesync/audio/abc","resource_type":"video","duration":185.4}"#,
        )
        .create_async()
        .await;

    let asset = MediaAsset::new(Bytes::from_static(b"ID3"), ContentKind::Audio, "wavesync/audio")
        .with_filename("Summer Vibes.mp3");
    let result = storage(&server).upload(asset).await.unwrap();

    mock.assert_async().await;
    assert_eq!(
        result.url,
        "https://res.cloudinary.com/demo/video/upload/v1/wavesync/audio/abc.mp3"
    );
    assert_eq!(result.key, "video/wavesync/audio/abc");
    assert_eq!(result.derived_duration_seconds, Some(185));
}

#[tokio::test]
async fn image_upload_ignores_duration() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1_1/demo/image/upload")
        .with_status(200)
        .with_body(
            r#"{"secure_url":"https://res.cloudinary.com/demo/image/upload/c.jpg",
                "public_id":"wavesync/covers/c","resource_type":"image"}"#,
        )
        .create_async()
        .await;

    let asset = MediaAsset::new(Bytes::from_static(b"jpeg"), ContentKind::Image, "wavesync/covers");
    let result = storage(&server).upload(asset).await.unwrap();

    assert_eq!(result.key, "image/wavesync/covers/c");
    assert_eq!(result.derived_duration_seconds, None);
}

#[tokio::test]
async fn rejected_upload_surfaces_cloudinary_message() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1_1/demo/auto/upload")
        .with_status(401)
        .with_body(r#"{"error":{"message":"Invalid Signature"}}"#)
        .create_async()
        .await;

    let asset = MediaAsset::new(Bytes::from_static(b"ID3"), ContentKind::Audio, "wavesync/audio");
    let err = storage(&server).upload(asset).await.unwrap_err();

    match err {
        StorageError::UploadFailed(message) => assert!(message.contains("Invalid Signature")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn delete_posts_destroy_for_resource_type() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1_1/demo/video/destroy")
        .match_body(Matcher::Regex("public_id=wavesync%2Faudio%2Fabc".to_string()))
        .with_status(200)
        .with_body(r#"{"result":"ok"}"#)
        .create_async()
        .await;

    storage(&server)
        .delete("video/wavesync/audio/abc")
        .await
        .unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn malformed_upload_response_is_a_backend_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/v1_1/demo/auto/upload")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let asset = MediaAsset::new(Bytes::from_static(b"ID3"), ContentKind::Audio, "wavesync/audio");
    let err = storage(&server).upload(asset).await.unwrap_err();

    assert!(matches!(err, StorageError::BackendError(ref m) if m.contains("Cloudinary response")));
}
