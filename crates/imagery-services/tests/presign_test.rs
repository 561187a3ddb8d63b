mod helpers;

use helpers::TestContext;
use imagery_core::AppError;
use imagery_services::PresignRequest;
use uuid::Uuid;

fn request(content_type: &str, owner_type: &str, owner_id: &str) -> PresignRequest {
    PresignRequest {
        content_type: content_type.to_string(),
        filename: "front.png".to_string(),
        owner_type: owner_type.to_string(),
        owner_id: owner_id.to_string(),
        size: 1024,
    }
}

#[tokio::test]
async fn test_presign_draft_png_key_shape() {
    let ctx = TestContext::new();
    let response = ctx
        .presign_issuer()
        .create_presign(request("image/png", "product-draft", "d1"))
        .await
        .unwrap();

    let token = response
        .key
        .strip_prefix("product-drafts/d1/")
        .and_then(|rest| rest.strip_suffix(".png"))
        .expect("key must be product-drafts/d1/<token>.png");
    assert!(Uuid::parse_str(token).is_ok());

    assert_eq!(response.expires_in_seconds, 900);
    assert!(response.upload_url.contains(&response.key));
    assert_eq!(
        response.required_headers.get("Content-Type").map(String::as_str),
        Some("image/png")
    );
    assert_eq!(ctx.storage.presigned_keys(), vec![response.key.clone()]);
}

#[tokio::test]
async fn test_presign_prefix_per_owner_type() {
    let ctx = TestContext::new();
    let issuer = ctx.presign_issuer();

    for (owner_type, prefix) in [
        ("product", "products/o1/"),
        ("product-draft", "product-drafts/o1/"),
        ("user", "users/o1/"),
    ] {
        let response = issuer
            .create_presign(request("image/jpeg", owner_type, "o1"))
            .await
            .unwrap();
        assert!(response.key.starts_with(prefix), "{}", response.key);
        assert!(response.key.ends_with(".jpg"));
    }
}

#[tokio::test]
async fn test_presign_content_type_case_insensitive() {
    let ctx = TestContext::new();
    let response = ctx
        .presign_issuer()
        .create_presign(request("IMAGE/WEBP", "user", "u1"))
        .await
        .unwrap();
    assert!(response.key.ends_with(".webp"));
}

#[tokio::test]
async fn test_presign_unknown_owner_type() {
    let ctx = TestContext::new();
    let err = ctx
        .presign_issuer()
        .create_presign(request("image/png", "store", "s1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedOwnerType(ref t) if t == "store"));
    assert!(ctx.storage.presigned_keys().is_empty());
}

#[tokio::test]
async fn test_presign_unsupported_content_type() {
    let ctx = TestContext::new();
    let err = ctx
        .presign_issuer()
        .create_presign(request("image/gif", "user", "u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedContentType(_)));
}

#[tokio::test]
async fn test_presign_requires_owner_id() {
    let ctx = TestContext::new();
    let err = ctx
        .presign_issuer()
        .create_presign(request("image/png", "user", ""))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::InvalidInput(_)));
}

#[tokio::test]
async fn test_presign_does_not_persist() {
    let ctx = TestContext::new();
    ctx.presign_issuer()
        .create_presign(request("image/avif", "product-draft", "d1"))
        .await
        .unwrap();
    assert_eq!(ctx.repository.len(), 0);
}

#[tokio::test]
async fn test_presign_empty_or_long_owner_type_is_unsupported() {
    let ctx = TestContext::new();
    let issuer = ctx.presign_issuer();

    for owner_type in [String::new(), "x".repeat(51)] {
        let err = issuer
            .create_presign(request("image/png", &owner_type, "o1"))
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::UnsupportedOwnerType(ref t) if *t == owner_type),
            "{:?}",
            err
        );
    }
    assert!(ctx.storage.presigned_keys().is_empty());
}

#[tokio::test]
async fn test_presign_empty_content_type_is_unsupported() {
    let ctx = TestContext::new();
    let err = ctx
        .presign_issuer()
        .create_presign(request("", "user", "u1"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::UnsupportedContentType(ref t) if t.is_empty()));
}

#[tokio::test]
async fn test_presign_owner_id_must_be_single_segment() {
    let ctx = TestContext::new();
    let issuer = ctx.presign_issuer();

    for owner_id in ["u1/x", "..", "u1/../u2"] {
        let err = issuer
            .create_presign(request("image/png", "user", owner_id))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)), "{}", owner_id);
    }
    assert!(ctx.storage.presigned_keys().is_empty());
}
