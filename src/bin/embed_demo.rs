use std::env;
use std::fs;
use std::rc::Rc;

use anyhow::{Context, Result};
use blueink_embed::{EmbedController, EmbedSettings, EventKind, HtmlHost};
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEFAULT_PAGE: &str = "<!DOCTYPE html><html><body></body></html>";

fn main() -> Result<()> {
    let subscriber_result = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .try_init();
    if subscriber_result.is_err() {
        // tracing was already initialised; continue silently
    }

    let mut args = env::args().skip(1);
    let settings = match args.next() {
        Some(path) => EmbedSettings::load(&path)
            .with_context(|| format!("failed to load embed config from {path}"))?,
        None => EmbedSettings::from_env().context("failed to load embed config")?,
    };
    let page = match args.next() {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?,
        None => DEFAULT_PAGE.to_string(),
    };

    let host = Rc::new(HtmlHost::from_html(&page));
    let embed = EmbedController::new(&settings.public_api_key, Rc::clone(&host))
        .context("invalid public API key")?;

    embed.on(EventKind::Any, |event| {
        info!(event = %event.kind, data = %event.data, "embed event");
    });

    let mount_args = settings.mount_args();
    embed
        .mount(
            &settings.signing_url,
            Some(&mount_args.container),
            mount_args.options,
        )
        .context("failed to mount signing frame")?;

    if let (Some(frame), Some(origin)) = (embed.frame(), embed.origin()) {
        host.post_message_from(&frame, &origin, json!({ "eventType": EventKind::Ready }));
    }

    println!("{}", host.to_html());
    embed.unmount();
    Ok(())
}
