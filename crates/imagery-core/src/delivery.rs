//! Signed delivery URLs for the image transformation proxy.
//!
//! URL layout: `{base_url}/{signature}{canonical_path}` where
//!
//! ```text
//! canonical_path = "/" + join("/", [rs, dpr?, q?, exp?]) + "/plain/" + source + ["@" + format]
//! signature      = base64url_no_pad(HMAC-SHA256(key, salt || canonical_path))
//! ```
//!
//! The proxy recomputes the signature over the exact path bytes, so the order
//! of directives and separators must not change.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

/// Transformation options for a delivery URL. Unset values fall back to the
/// proxy defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Resize type: fit, fill, fill-down, force or auto
    pub fit: Option<String>,
    /// 1..=100
    pub quality: Option<u32>,
    pub dpr: Option<f32>,
    /// webp, avif, jpeg (or jpg) or png; anything else keeps the source format
    pub format: Option<String>,
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct DeliveryUrlSigner {
    base_url: String,
    key: Vec<u8>,
    salt: Vec<u8>,
}

impl std::fmt::Debug for DeliveryUrlSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliveryUrlSigner")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl DeliveryUrlSigner {
    pub fn new(base_url: &str, key: Vec<u8>, salt: Vec<u8>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            key,
            salt,
        }
    }

    /// Build a signer from hex-encoded key and salt.
    pub fn from_hex(base_url: &str, key_hex: &str, salt_hex: &str) -> Result<Self, anyhow::Error> {
        if base_url.trim_end_matches('/').is_empty() {
            return Err(anyhow::anyhow!("imgproxy base URL is required"));
        }
        let key = hex::decode(key_hex)
            .map_err(|e| anyhow::anyhow!("Failed to decode imgproxy key: {}", e))?;
        let salt = hex::decode(salt_hex)
            .map_err(|e| anyhow::anyhow!("Failed to decode imgproxy salt: {}", e))?;
        Ok(Self::new(base_url, key, salt))
    }

    /// Build the full signed URL for `source` (e.g. `s3://bucket/key`).
    pub fn build_url(&self, source: &str, opts: &DeliveryOptions) -> String {
        let path = canonical_path(source, opts);
        let signature = self.sign(&path);
        format!("{}/{}{}", self.base_url, signature, path)
    }

    fn sign(&self, path: &str) -> String {
        let mut mac = Hmac::<Sha256>::new_from_slice(&self.key).expect("HMAC accepts any key size");
        // salt first, then the path including its leading "/"
        mac.update(&self.salt);
        mac.update(path.as_bytes());
        let tag = mac.finalize().into_bytes();
        base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag)
    }
}

/// The exact byte sequence the proxy verifies.
pub fn canonical_path(source: &str, opts: &DeliveryOptions) -> String {
    let mut parts = Vec::with_capacity(4);

    let fit = opts.fit.as_deref().filter(|f| !f.is_empty()).unwrap_or("fit");
    let width = opts.width.filter(|w| *w > 0).unwrap_or(0);
    let height = opts.height.filter(|h| *h > 0).unwrap_or(0);
    parts.push(format!("rs:{}:{}:{}", fit, width, height));

    if let Some(dpr) = opts.dpr.filter(|d| *d > 0.0) {
        parts.push(format!("dpr:{}", trim_float(dpr)));
    }
    if let Some(quality) = opts.quality.filter(|q| *q > 0) {
        parts.push(format!("q:{}", quality));
    }
    if let Some(expires) = opts.expires.filter(|e| e.timestamp() != 0) {
        parts.push(format!("exp:{}", expires.timestamp()));
    }

    let mut path = format!("/{}/plain/{}", parts.join("/"), source);
    if let Some(ext) = opts.format.as_deref().and_then(normalize_format) {
        path.push('@');
        path.push_str(ext);
    }
    path
}

fn normalize_format(format: &str) -> Option<&'static str> {
    match format.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "webp" => Some("webp"),
        "avif" => Some("avif"),
        "jpeg" | "jpg" => Some("jpeg"),
        "png" => Some("png"),
        _ => None,
    }
}

// 1.5 -> "1.5", 2.0 -> "2"
fn trim_float(value: f32) -> String {
    let formatted = value.to_string();
    if formatted.contains('.') {
        formatted
            .trim_end_matches('0')
            .trim_end_matches('.')
            .to_string()
    } else {
        formatted
    }
}
