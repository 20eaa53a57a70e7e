#![allow(missing_docs)]
use std::sync::Arc;

use anyhow::{Context, Result};
use specsplit_core::io::{load_document, write_fragments};
use specsplit_core::split::Splitter;
use specsplit_core::{ChannelReporter, SplitEvent};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info, warn};

use self::args::CliArgs;

mod args;

#[tokio::main]
async fn main() -> Result<()> {
    let Some(args) = CliArgs::parse(pico_args::Arguments::from_env())? else {
        return Ok(());
    };

    let level = if args.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();
    if !args.unused.is_empty() {
        warn!(unused = ?args.unused, "Warning: unused arguments left");
    }

    run(args).await
}

async fn run(args: CliArgs) -> Result<()> {
    let CliArgs {
        input,
        output,
        format,
        config,
        ..
    } = args;

    let document = load_document(&input)
        .with_context(|| format!("loading document '{}'", input.display()))?;
    info!(
        input = %input.display(),
        operations = document.operations().count(),
        method = %config.method,
        "document loaded"
    );

    let (reporter, events) = ChannelReporter::channel();
    let listener = tokio::spawn(listen(events));

    let result = Splitter::new(config)
        .split_concurrent(Arc::new(document), Arc::new(reporter))
        .await;
    let unresolved = listener.await.context("waiting for split events")?;
    let result = result.context("splitting document")?;

    let written = write_fragments(&output, &result, format)
        .with_context(|| format!("writing fragments to '{}'", output.display()))?;
    for path in &written {
        info!(path = %path.display(), "created");
    }

    info!(
        groups = result.fragment_count(),
        files = written.len(),
        unresolved,
        output = %output.display(),
        "split complete"
    );
    Ok(())
}

/// Logs split events until every sender is dropped, returns the unresolved reference count.
async fn listen(mut events: UnboundedReceiver<SplitEvent>) -> usize {
    let mut unresolved = 0;
    while let Some(event) = events.recv().await {
        match event {
            SplitEvent::GroupStarted { group, operations } => {
                debug!(%group, operations, "splitting group");
            }
            SplitEvent::UnresolvedReference { group, reference } => {
                unresolved += 1;
                warn!(%group, %reference, "unresolved reference");
            }
            SplitEvent::GroupAssembled {
                group,
                paths,
                components,
            } => {
                debug!(%group, paths, components, "group assembled");
            }
        }
    }
    unresolved
}
