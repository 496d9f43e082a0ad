mod common;

use common::*;

use http::StatusCode;

// Happy path tests

#[tokio::test]
async fn test_request_image_upload_happy_path() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/upload?filename=Holiday%20Photo.png")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let path = body["object"]["path"].as_str().unwrap();
    assert!(
        object_key_pattern("holiday-photo", ".png").is_match(path),
        "unexpected key {path}"
    );

    assert_eq!(body["upload"]["method"], "PUT");
    assert!(body["upload"]["expires"].is_string());

    let url = body["upload"]["url"].as_str().unwrap();
    let encoded_path = path.replace('/', "%2F");
    assert!(url.starts_with(&format!(
        "https://storage.googleapis.com/{IMAGES_BUCKET}/{encoded_path}?"
    )));
    assert_eq!(query_param(url, "X-Goog-Algorithm"), "GOOG4-RSA-SHA256");
    assert_eq!(query_param(url, "X-Goog-Expires"), "900");
    assert_eq!(query_param(url, "X-Goog-SignedHeaders"), "host");
    assert_eq!(query_param(url, "X-Goog-Signature"), "deadbeef");
    assert!(query_param(url, "X-Goog-Credential").starts_with(SERVICE_ACCOUNT));

    assert_eq!(
        body["object"]["url"],
        format!("https://images.example.com/{path}")
    );
    assert_eq!(
        body["object"]["location"],
        format!("gs://{IMAGES_BUCKET}/{path}")
    );
    assert!(body["object"].get("dynamic_url").is_none());
}

#[tokio::test]
async fn test_request_file_upload_uses_files_bucket() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/files/upload?filename=Q3%20Report.pdf")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let path = body["object"]["path"].as_str().unwrap();
    assert!(object_key_pattern("q3-report", ".pdf").is_match(path));

    let url = body["upload"]["url"].as_str().unwrap();
    assert!(url.starts_with(&format!("https://storage.googleapis.com/{FILES_BUCKET}/")));
    assert_eq!(
        body["object"]["location"],
        format!("gs://{FILES_BUCKET}/{path}")
    );
}

#[tokio::test]
async fn test_request_upload_strips_client_directories() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/upload?filename=C%3A%5CUsers%5Cme%5Ccat.jpg")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    let path = body["object"]["path"].as_str().unwrap();
    assert!(object_key_pattern("cat", ".jpg").is_match(path), "unexpected key {path}");
}

#[tokio::test]
async fn test_request_upload_generates_unique_keys() {
    let setup = TestSetup::new();

    let mut paths = std::collections::HashSet::new();
    for _ in 0..20 {
        let response = setup
            .send_get_request("/upload?filename=same.png")
            .await
            .expect("Failed to send request");
        let body = parse_response_body(response).await;
        paths.insert(body["object"]["path"].as_str().unwrap().to_string());
    }

    assert_eq!(paths.len(), 20);
}

#[tokio::test]
async fn test_request_upload_uses_configured_expiry() {
    let setup = TestSetup::builder().expiry_secs(60).build();

    let response = setup
        .send_get_request("/upload?filename=a.gif")
        .await
        .expect("Failed to send request");

    let body = parse_response_body(response).await;
    let url = body["upload"]["url"].as_str().unwrap();
    assert_eq!(query_param(url, "X-Goog-Expires"), "60");
}

// Validation error tests

#[tokio::test]
async fn test_request_upload_missing_filename() {
    let setup = TestSetup::new();

    for route in ["/upload", "/upload?filename=", "/files/upload"] {
        let response = setup
            .send_get_request(route)
            .await
            .expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "Failed for route: {route}"
        );

        let body = parse_response_body(response).await;
        assert_eq!(body["error"]["kind"], "validation");
        assert_eq!(body["error"]["location"], "query");
        assert_eq!(body["error"]["param"], "filename");
        assert_eq!(body["error"]["example"], "string");
    }
}

#[tokio::test]
async fn test_request_upload_directory_only_filename() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/upload?filename=photos%2F")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["param"], "filename");
}

#[tokio::test]
async fn test_request_upload_rejects_disallowed_extensions() {
    let setup = TestSetup::new();

    let test_cases = [
        "/upload?filename=setup.exe",
        "/upload?filename=report.pdf",
        "/upload?filename=PHOTO.JPG",
        "/upload?filename=noextension",
        "/files/upload?filename=cat.png",
    ];

    for route in test_cases {
        let response = setup
            .send_get_request(route)
            .await
            .expect("Failed to send request");

        assert_eq!(
            response.status(),
            StatusCode::UNPROCESSABLE_ENTITY,
            "Failed for route: {route}"
        );

        let body = parse_response_body(response).await;
        assert_eq!(body["error"]["param"], "filename");
        assert!(body["error"]["message"]
            .as_str()
            .unwrap()
            .contains("invalid extension"));
    }
}

#[tokio::test]
async fn test_request_upload_lists_allowed_extensions() {
    let setup = TestSetup::new();

    let response = setup
        .send_get_request("/upload?filename=setup.exe")
        .await
        .expect("Failed to send request");

    let body = parse_response_body(response).await;
    assert_eq!(
        body["error"]["message"],
        "Parameter filename has an invalid extension, please only send .gif, .jpeg, .jpg, .png, .webp"
    );
}

// Signing failures

#[tokio::test]
async fn test_request_upload_signing_unavailable() {
    let setup = TestSetup::builder()
        .signer(StubSigner::failing(gcs_signing::SigningError::Unavailable(
            "connection refused".to_string(),
        )))
        .build();

    let response = setup
        .send_get_request("/upload?filename=a.png")
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"]["kind"], "abort");
    assert_eq!(body["error"]["message"], "Unable to sign the storage URL");
}
