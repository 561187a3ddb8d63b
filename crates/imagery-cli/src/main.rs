//! Imagery CLI: runs lifecycle operations against the configured storage and
//! metadata store.
//!
//! Configuration comes from the environment (or `.env`), see `imagery_core::Config`.

use anyhow::Context;
use clap::Parser;
use imagery_cli::cli::{Cli, Commands};
use imagery_cli::{init_tracing, setup};
use imagery_core::Config;
use imagery_services::{ConfirmUploadRequest, PresignRequest, ProductEvent};
use serde::Serialize;

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;
    let services = setup::build_services(&config).await?;

    match cli.command {
        Commands::Presign {
            content_type,
            owner_type,
            owner_id,
            filename,
            size,
        } => {
            let response = services
                .presign
                .create_presign(PresignRequest {
                    content_type,
                    filename,
                    owner_type,
                    owner_id,
                    size,
                })
                .await?;
            print_json(&response)?;
        }
        Commands::Confirm {
            key,
            owner_type,
            owner_id,
            mime,
            alt,
            role,
            checksum,
        } => {
            let image = services
                .confirmer
                .confirm(ConfirmUploadRequest {
                    key,
                    owner_type,
                    owner_id,
                    alt,
                    mime,
                    role,
                    checksum,
                })
                .await?;
            print_json(&image)?;
        }
        Commands::Promote {
            draft_id,
            product_id,
            image_ids,
        } => {
            let images = services
                .promoter
                .promote(&draft_id, &image_ids, &product_id)
                .await?;
            print_json(&images)?;
        }
        Commands::Delete { id, hard } => {
            services.deleter.delete(id, hard).await?;
            print_json(&serde_json::json!({ "success": true, "id": id, "hard": hard }))?;
        }
        Commands::Get { id } => {
            let image = services.queries.get_image_by_id(id).await?;
            print_json(&image)?;
        }
        Commands::DeliveryUrl { id, options } => {
            let options = options.to_options()?;
            let delivery = services.queries.get_delivery_url(id, &options).await?;
            print_json(&delivery)?;
        }
        Commands::HandleEvent { json } => {
            let event = ProductEvent::from_json(json.as_bytes())?;
            services.events.handle(event).await?;
            print_json(&serde_json::json!({ "success": true }))?;
        }
    }

    Ok(())
}
