//! Browse command implementation
//!
//! Each stdin line is an address fragment. Lines are turned into hash-change
//! events for the controller's event loop, which prints the document title
//! after every navigation.

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;
use vitrine_core::{Navigation, NavigationEvent, SiteConfig};

use crate::utils::settings::starting_location;

const EVENT_BUFFER: usize = 16;

/// Execute the browse command
pub async fn execute(config: &SiteConfig, from: Option<&str>) -> Result<()> {
    let mut site = super::connect(config, from).await?;

    // Background warm-up keeps running while events are handled
    let warm_up = site
        .initialize()
        .await
        .context("Failed to show the initial page")?;
    debug!("Warming {} page(s) in the background", warm_up.len());
    println!("{}", site.shell().document_title());

    let (tx, rx) = mpsc::channel(EVENT_BUFFER);
    let reader_config = config.clone();
    let reader = tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let href = starting_location(&reader_config, Some(&line)).href().to_string();
            if tx.send(NavigationEvent::HashChange { href }).await.is_err() {
                break;
            }
        }
        Ok::<_, std::io::Error>(())
    });

    site.listen(rx, |navigation, shell| match navigation {
        Navigation::Activated(_) => println!("{}", shell.document_title()),
        Navigation::AnchorJump => println!("{} (anchor)", shell.document_title()),
    })
    .await;

    reader
        .await
        .context("stdin reader panicked")?
        .context("Failed to read from stdin")?;
    Ok(())
}
