//! `adb-channel` - serve the platform channel over stdio or a local socket.
//!
//! Frames go to stdout in stdio mode, so all logging is sent to stderr.
//! Set `RUST_LOG` to change the log level (default `info`).

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use adb_channel::probe::{SystemVersionProbe, VersionProbe};
use adb_channel::protocol::DEFAULT_MAX_PAYLOAD_SIZE;
use adb_channel::transport::{self, ChannelListener};
use adb_channel::{Channel, CHANNEL_NAME};

/// First delay after a failed accept.
const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(50);
/// Upper bound for the accept retry delay.
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(2);

/// Command line arguments for the channel service
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Unix socket path (named pipe on Windows) to listen on; stdio if omitted
    #[clap(short, long)]
    socket: Option<String>,

    /// Logical channel name
    #[clap(short, long, default_value = CHANNEL_NAME)]
    channel: String,

    /// Maximum accepted call payload in bytes
    #[clap(long, default_value_t = DEFAULT_MAX_PAYLOAD_SIZE)]
    max_payload: u32,

    /// Print the platform version and exit
    #[clap(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.once {
        println!("{}", SystemVersionProbe::new().probe());
        return Ok(());
    }

    let channel = Channel::builder()
        .name(&args.channel)
        .max_payload_size(args.max_payload)
        .with_platform_plugin()
        .build()
        .context("Failed to build channel")?;

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    match args.socket {
        Some(path) => serve_socket(&channel, &path, shutdown).await,
        None => {
            let (stdin, stdout) = transport::stdio();
            tokio::select! {
                served = channel.serve(stdin, stdout) => {
                    let stats = served.context("Channel failed on stdio")?;
                    tracing::info!(?stats, "Host disconnected");
                }
                _ = &mut shutdown => tracing::info!("Interrupted, shutting down"),
            }
            Ok(())
        }
    }
}

/// Delay before retrying after `failures` consecutive accept errors.
fn accept_backoff(failures: u32) -> Duration {
    ACCEPT_BACKOFF_BASE
        .saturating_mul(1 << failures.min(6))
        .min(ACCEPT_BACKOFF_MAX)
}

/// Accept hosts one after another until `shutdown` resolves.
///
/// The shutdown future is raced against both `accept` and the connection
/// being served, so an interrupt ends an active session too.
async fn serve_socket<F>(channel: &Channel, path: &str, mut shutdown: Pin<&mut F>) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let listener = ChannelListener::bind(path)
        .await
        .with_context(|| format!("Failed to listen on {}", path))?;

    let mut failures = 0u32;
    loop {
        let stream = tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok(stream) => {
                    failures = 0;
                    stream
                }
                Err(e) => {
                    let delay = accept_backoff(failures);
                    failures = failures.saturating_add(1);
                    tracing::error!(?delay, "Accept failed: {}", e);
                    tokio::time::sleep(delay).await;
                    continue;
                }
            },
            _ = &mut shutdown => {
                tracing::info!("Interrupted, shutting down");
                return Ok(());
            }
        };

        tokio::select! {
            served = channel.serve_stream(stream) => match served {
                Ok(stats) => tracing::info!(?stats, "Host disconnected"),
                Err(e) => tracing::warn!("Connection ended with error: {}", e),
            },
            _ = &mut shutdown => {
                tracing::info!("Interrupted with a host connected, shutting down");
                return Ok(());
            }
        }
    }
}
