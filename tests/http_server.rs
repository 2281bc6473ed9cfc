//! HTTP request-handling integration tests
//!
//! Each test starts an in-process server against a fresh temporary document
//! root and speaks plain HTTP to it.

mod common;

use common::{setup_basic_site, TestServer};
use reqwest::StatusCode;

async fn get(url: String) -> reqwest::Response {
    reqwest::get(url).await.expect("GET request failed")
}

#[actix_web::test]
async fn root_serves_the_default_document() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    let root_response = get(server.url_for("/")).await;
    assert_eq!(root_response.status(), StatusCode::OK);
    let root_body = root_response.text().await.unwrap();

    let index_response = get(server.url_for("/index.html")).await;
    assert_eq!(index_response.status(), StatusCode::OK);
    let index_body = index_response.text().await.unwrap();

    // `/` and `/index.html` are the same document
    assert_eq!(root_body, index_body);
    assert!(root_body.contains("Welcome"));

    server.handle.stop().await;
}

#[actix_web::test]
async fn content_type_follows_the_file_extension() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    for (path, expected) in [
        ("/index.html", "text/html"),
        ("/style.css", "text/css"),
        ("/data.json", "application/json"),
    ] {
        let response = get(server.url_for(path)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_string();
        assert!(
            content_type.starts_with(expected),
            "{} should be served as {}, got {}",
            path,
            expected,
            content_type
        );
    }

    server.handle.stop().await;
}

#[actix_web::test]
async fn responses_carry_the_server_signature() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    let response = get(server.url_for("/index.html")).await;
    let server_header = response
        .headers()
        .get("server")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("");
    assert_eq!(server_header, "onyesha");

    server.handle.stop().await;
}

#[actix_web::test]
async fn favicon_yields_no_content_without_a_file() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    let response = get(server.url_for("/favicon.ico")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    server.handle.stop().await;
}

#[actix_web::test]
async fn favicon_yields_no_content_even_with_a_file() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());
    std::fs::write(server.root().join("favicon.ico"), b"an actual icon").unwrap();

    let response = get(server.url_for("/favicon.ico")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert!(response.bytes().await.unwrap().is_empty());

    server.handle.stop().await;
}

#[actix_web::test]
async fn static_prefix_maps_into_the_static_directory() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    let images_dir = server.root().join("static/images");
    std::fs::create_dir_all(&images_dir).unwrap();
    let jpeg_bytes: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46];
    std::fs::write(images_dir.join("foo.jpg"), jpeg_bytes).unwrap();

    let response = get(server.url_for("/static/images/foo.jpg")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&response.bytes().await.unwrap()[..], jpeg_bytes);

    let missing = get(server.url_for("/static/images/missing.jpg")).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    server.handle.stop().await;
}

#[actix_web::test]
async fn missing_file_is_not_found() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    let response = get(server.url_for("/no-such-page.html")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    server.handle.stop().await;
}

#[actix_web::test]
async fn traversal_out_of_the_document_root_is_forbidden() {
    // The document root is a subdirectory; the secret lives one level up.
    let temp_dir = tempfile::TempDir::new().unwrap();
    let root = temp_dir.path().join("site");
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("index.html"), "<h1>site</h1>").unwrap();
    std::fs::write(temp_dir.path().join("secret.txt"), "do not serve").unwrap();

    let mut server = TestServer::start_with_root(temp_dir, &root);
    let addr = format!("127.0.0.1:{}", server.port);

    for path in [
        "/../secret.txt",
        "/%2e%2e/secret.txt",
        "/static/%2e%2e/%2e%2e/secret.txt",
    ] {
        let response = common::raw_get(&addr, path).await;
        assert!(
            response.starts_with("HTTP/1.1 403"),
            "{} should be forbidden, got: {}",
            path,
            response.lines().next().unwrap_or("")
        );
        assert!(
            !response.contains("do not serve"),
            "{} must not leak file content",
            path
        );
    }

    server.handle.stop().await;
}

#[actix_web::test]
async fn directory_request_serves_its_default_document() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    let docs_dir = server.root().join("docs");
    std::fs::create_dir_all(&docs_dir).unwrap();
    std::fs::write(docs_dir.join("index.html"), "<h1>Docs</h1>").unwrap();

    let response = get(server.url_for("/docs")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Docs"));

    server.handle.stop().await;
}

#[actix_web::test]
async fn percent_encoded_file_names_are_decoded() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());
    std::fs::write(server.root().join("my page.html"), "<h1>Spaced</h1>").unwrap();

    let response = get(server.url_for("/my%20page.html")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.text().await.unwrap().contains("Spaced"));

    server.handle.stop().await;
}

#[actix_web::test]
async fn concurrent_requests_receive_byte_exact_bodies() {
    let mut server = TestServer::start();
    setup_basic_site(server.root());

    // Three distinct binary files, large enough to span several socket reads
    let payloads: Vec<(String, Vec<u8>)> = (0u8..3)
        .map(|n| {
            let name = format!("blob{}.bin", n);
            let bytes: Vec<u8> = (0..64 * 1024).map(|i| (i as u8).wrapping_mul(n + 1)).collect();
            (name, bytes)
        })
        .collect();

    for (name, bytes) in &payloads {
        std::fs::write(server.root().join(name), bytes).unwrap();
    }

    let fetches = payloads.iter().map(|(name, _)| {
        let url = server.url_for(name);
        async move {
            let response = reqwest::get(url).await.expect("GET request failed");
            assert_eq!(response.status(), StatusCode::OK);
            response.bytes().await.expect("body read failed")
        }
    });

    let bodies = futures_util::future::join_all(fetches).await;

    for ((_, expected), body) in payloads.iter().zip(bodies) {
        assert_eq!(&body[..], &expected[..]);
    }

    server.handle.stop().await;
}
