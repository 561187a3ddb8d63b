use anyhow::Context;
use chrono::{TimeZone, Utc};
use clap::{Args, Parser, Subcommand};
use imagery_core::DeliveryOptions;
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(name = "imagery", about = "Catalog image lifecycle operations")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Issue a presigned upload URL
    Presign {
        /// Content type of the upload (image/jpeg, image/png, image/webp, image/avif)
        #[arg(long)]
        content_type: String,
        /// Owner type: product, product-draft or user
        #[arg(long)]
        owner_type: String,
        #[arg(long)]
        owner_id: String,
        #[arg(long, default_value = "")]
        filename: String,
        /// Declared size in bytes
        #[arg(long, default_value = "0")]
        size: i64,
    },
    /// Register an uploaded object as an image
    Confirm {
        #[arg(long)]
        key: String,
        #[arg(long)]
        owner_type: String,
        #[arg(long)]
        owner_id: String,
        #[arg(long)]
        mime: String,
        #[arg(long, default_value = "")]
        alt: String,
        #[arg(long, default_value = "")]
        role: String,
        #[arg(long)]
        checksum: Option<String>,
    },
    /// Promote draft images to a product
    Promote {
        #[arg(long)]
        draft_id: String,
        #[arg(long)]
        product_id: String,
        /// Restrict to these image ids (repeatable)
        #[arg(long = "image-id", value_name = "UUID")]
        image_ids: Vec<Uuid>,
    },
    /// Delete an image (soft unless --hard)
    Delete {
        id: Uuid,
        #[arg(long)]
        hard: bool,
    },
    /// Get a single image by ID
    Get { id: Uuid },
    /// Build a signed delivery URL
    DeliveryUrl {
        id: Uuid,
        #[command(flatten)]
        options: DeliveryArgs,
    },
    /// Handle a product event given as JSON
    HandleEvent {
        /// e.g. '{"type":"product-created","payload":{"productId":"p1"}}'
        json: String,
    },
}

#[derive(Args, Debug, Default)]
pub struct DeliveryArgs {
    #[arg(long)]
    pub width: Option<u32>,
    #[arg(long)]
    pub height: Option<u32>,
    /// Resize type: fit, fill, fill-down, force, auto
    #[arg(long)]
    pub fit: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub quality: Option<u32>,
    #[arg(long)]
    pub dpr: Option<f32>,
    /// Output format: webp, avif, jpeg, png
    #[arg(long)]
    pub format: Option<String>,
    /// Expiry as unix seconds
    #[arg(long, value_name = "UNIX_SECONDS")]
    pub expires: Option<i64>,
}

impl DeliveryArgs {
    pub fn to_options(&self) -> anyhow::Result<DeliveryOptions> {
        let expires = self
            .expires
            .map(|secs| {
                Utc.timestamp_opt(secs, 0)
                    .single()
                    .with_context(|| format!("Invalid expiry timestamp: {}", secs))
            })
            .transpose()?;

        Ok(DeliveryOptions {
            width: self.width,
            height: self.height,
            fit: self.fit.clone(),
            quality: self.quality,
            dpr: self.dpr,
            format: self.format.clone(),
            expires,
        })
    }
}
