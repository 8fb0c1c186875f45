use clap::Parser;
use tracing::{info, trace};
use tracing_subscriber::util::SubscriberInitExt;
use vigil::{config::read_config_file, logging, monitor};

#[derive(Debug, Clone, Parser)]
#[command(version, about)]
struct Args {
    /// Config file (YAML, or JSON with a .json extension)
    #[arg(short, long, default_value = "config.yml")]
    file: String,

    /// Log at trace level
    #[arg(short, long)]
    verbose: bool,
}

fn init(verbose: bool) -> logging::LogFileHandle {
    dotenv::dotenv().ok();

    let (subscriber, log_file) = logging::subscriber(verbose);
    subscriber.init();

    log_file
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = init(args.verbose);
    trace!("started with args: {args:?}");

    let config = read_config_file(&args.file)?;

    if let Some(path) = config.logging.file.as_deref() {
        log_file.attach(path)?;
    }

    tokio::select! {
        result = monitor::run(config) => result?,
        _ = tokio::signal::ctrl_c() => {
            info!("monitoring stopped by user");
        }
    }

    Ok(())
}
