//! Log setup
//!
//! Logging to stderr starts before the config is read, so warnings raised
//! while loading it are not lost. The optional log file named in the config is
//! attached afterwards through a [`LogFileHandle`].

use std::{fs::OpenOptions, path::Path, sync::Mutex};

use anyhow::Context;
use tracing::{Subscriber, level_filters::LevelFilter};
use tracing_subscriber::{
    Layer, Registry, filter,
    layer::{Identity, SubscriberExt},
    reload,
};

type FileLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Attaches a log file to an already installed subscriber
pub struct LogFileHandle(reload::Handle<FileLayer, Registry>);

impl LogFileHandle {
    /// Append every further log line to `path` as well, without ANSI colors.
    pub fn attach(&self, path: &Path) -> anyhow::Result<()> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;

        let layer = tracing_subscriber::fmt::layer()
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .boxed();

        self.0
            .reload(layer)
            .context("failed to attach log file")?;

        Ok(())
    }
}

/// Subscriber logging the crate's events to stderr, at trace level when `verbose`.
pub fn subscriber(verbose: bool) -> (impl Subscriber + Send + Sync + 'static, LogFileHandle) {
    let level = if verbose {
        LevelFilter::TRACE
    } else {
        LevelFilter::INFO
    };
    let filter = filter::Targets::new().with_targets(vec![("vigil", level)]);

    let (file_layer, handle) = reload::Layer::new(Identity::new().boxed());

    let subscriber = tracing_subscriber::registry()
        .with(file_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter);

    (subscriber, LogFileHandle(handle))
}
