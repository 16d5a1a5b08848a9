//! # receipt-relay CLI
//!
//! ## Usage
//!
//! ```bash
//! # Run every service listed in servers.json
//! receipt-relay serve --servers servers.json --printers printers.json
//!
//! # Show what a document turns into
//! receipt-relay transform receipt.txt --command starprnt --output receipt.bin
//!
//! # Send a document to a registered printer once
//! receipt-relay print kitchen receipt.txt
//! ```
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinSet;
use tracing::{error, info};

use receipt_relay::{
    Dispatcher, JobOutcome, PrinterRegistry, RelayError,
    config::ServicesConfig,
    markup::{ReceiptMarkup, Transformer},
    printer::{CommandSet, PrintOptions, config::DEFAULT_CPL},
    server::{self, AppState},
    transport,
};

/// Job timeout for the `print` command (milliseconds)
const DEFAULT_PRINT_TIMEOUT_MS: u64 = 300_000;

/// receipt-relay - Receipt printer gateway
#[derive(Parser, Debug)]
#[command(name = "receipt-relay")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start every service configured in the server registry
    Serve {
        /// Server registry
        #[arg(long, default_value = "servers.json")]
        servers: PathBuf,

        /// Printer registry (re-read for every job)
        #[arg(long, default_value = "printers.json")]
        printers: PathBuf,
    },

    /// Transform a document and write the printer commands
    Transform {
        /// Receipt markup document
        file: PathBuf,

        /// Command set: escpos, starprnt or svg
        #[arg(long, default_value = "escpos")]
        command: String,

        /// Characters per line
        #[arg(long, default_value_t = DEFAULT_CPL)]
        cpl: u16,

        /// Feed instead of cutting at `=` rows
        #[arg(long)]
        no_cut: bool,

        /// Output file (defaults to stdout)
        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Send a document to a registered printer once
    Print {
        /// Printer id in the printer registry
        printer: String,

        /// Receipt markup document
        file: PathBuf,

        /// Printer registry
        #[arg(long, default_value = "printers.json")]
        printers: PathBuf,

        /// Acknowledgment timeout in milliseconds
        #[arg(long, default_value_t = DEFAULT_PRINT_TIMEOUT_MS)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), RelayError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { servers, printers } => serve(&servers, printers).await,
        Commands::Transform {
            file,
            command,
            cpl,
            no_cut,
            output,
        } => {
            let command = CommandSet::parse(&command)
                .ok_or_else(|| RelayError::Config(format!("Unknown command set: {}", command)))?;
            let options = PrintOptions {
                cpl,
                command,
                cutting: !no_cut,
            };
            let document = std::fs::read_to_string(&file)?;
            let bytes =
                receipt_relay::markup::command_bytes(&ReceiptMarkup.transform(&document, &options));

            match output {
                Some(path) => {
                    std::fs::write(&path, &bytes)?;
                    println!("Wrote {} bytes to {}", bytes.len(), path.display());
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&bytes)?;
                }
            }
            Ok(())
        }
        Commands::Print {
            printer,
            file,
            printers,
            timeout,
        } => {
            let registry = PrinterRegistry::load(&printers).await?;
            let config = registry
                .get(&printer)
                .ok_or_else(|| RelayError::Config(format!("Unknown printer: {}", printer)))?;
            let document = std::fs::read_to_string(&file)?;

            let outcome = dispatcher()
                .dispatch(&document, config, Duration::from_millis(timeout))
                .await;
            println!("{}", outcome.as_str());
            match outcome {
                JobOutcome::Success => Ok(()),
                JobOutcome::Failure => Err(RelayError::Transport(format!(
                    "Printer {} did not accept the job",
                    printer
                ))),
            }
        }
    }
}

/// Dispatcher with the rasterizer this build supports.
fn dispatcher() -> Dispatcher {
    let dispatcher = Dispatcher::new(Arc::new(ReceiptMarkup));
    #[cfg(feature = "raster")]
    let dispatcher =
        dispatcher.with_rasterizer(Arc::new(receipt_relay::raster::SvgRasterizer));
    dispatcher
}

/// Bind every configured service, then run them until one stops.
async fn serve(servers: &Path, printers: PathBuf) -> Result<(), RelayError> {
    let config = ServicesConfig::load(servers)?;
    let mut services: JoinSet<Result<(), RelayError>> = JoinSet::new();

    if let Some(serial) = &config.serial {
        let listener = bind(&serial.addr()).await?;
        info!(
            addr = %serial.addr(),
            device = %serial.device.display(),
            "Serial-LAN bridge running"
        );
        #[cfg(unix)]
        {
            let device = transport::SerialDevice::new(&serial.device, serial.baud);
            services.spawn(async move {
                transport::serve_bridge(listener, device)
                    .await
                    .map_err(RelayError::from)
            });
        }
        #[cfg(not(unix))]
        {
            drop(listener);
            return Err(RelayError::Config(
                "The serial bridge is only supported on Unix".to_string(),
            ));
        }
    }

    if let Some(sink) = &config.print {
        let listener = bind(&sink.addr()).await?;
        info!(addr = %sink.addr(), "Virtual printer running");
        services.spawn(async move { transport::serve_sink(listener).await.map_err(RelayError::from) });
    }

    if let Some(http) = &config.http {
        let listener = bind(&http.addr()).await?;
        let dispatcher = dispatcher();
        info!(
            addr = %http.addr(),
            printers = %printers.display(),
            image_mode = dispatcher.has_rasterizer(),
            "Receipt server running at http://{}/",
            http.addr()
        );
        let state = AppState::new(http.clone(), printers, dispatcher);
        services.spawn(server::serve(listener, state));
    }

    if services.is_empty() {
        return Err(RelayError::Config(format!(
            "{} configures no services",
            servers.display()
        )));
    }

    while let Some(result) = services.join_next().await {
        match result {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                error!(error = %e, "service stopped");
                return Err(e);
            }
            Err(e) => {
                error!(error = %e, "service task failed");
                return Err(RelayError::Transport(format!("Service task failed: {}", e)));
            }
        }
    }
    Ok(())
}

async fn bind(addr: &str) -> Result<TcpListener, RelayError> {
    TcpListener::bind(addr).await.map_err(|source| RelayError::Bind {
        addr: addr.to_string(),
        source,
    })
}
