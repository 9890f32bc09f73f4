use std::os::linux::net::SocketAddrExt;
use std::os::unix::net::{SocketAddr, UnixListener};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context as _;
use clap::Parser;
use obelisk::{Gateway, GatewayConfig};
use tracing::{error, info, warn};

/// Gateway between a tecthulhu portal device and OPC pixel hardware.
#[derive(Parser, Debug)]
#[command(name = "obelisk", version)]
struct Cli {
    /// Print internal logging for this tool.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Pixel server address, or /dev/null to disable wire writes.
    #[arg(long, default_value = "127.0.0.1:7890")]
    opc_server: String,

    /// Portal device URL; repeat for multiple portals, first is home.
    #[arg(long = "portal-url", default_value = "http://127.0.0.1:8080/status/json")]
    portal_urls: Vec<String>,

    /// Device poll interval in milliseconds.
    #[arg(long, default_value_t = 1000)]
    poll_interval_ms: u64,

    /// Directory holding the sound effect library for the audio player.
    #[arg(long)]
    audio_dir: Option<PathBuf>,

    /// Log every portal status message.
    #[arg(long, default_value_t = false)]
    monitor: bool,

    /// Emit the simple 8-LED resonator health pattern instead of the
    /// animation.
    #[arg(long, default_value_t = false)]
    test_leds: bool,
}

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt::init();
    }

    // A second gateway fighting over the same LEDs helps nobody.
    let _lock = match exclusive("obelisk") {
        Ok(lock) => lock,
        Err(err) => {
            eprintln!("an instance of this process is already running: {err:#}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("{err:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&shutdown))
            .context("install signal handler")?;
    }

    let gateway = Gateway::start(&GatewayConfig {
        opc_server: cli.opc_server,
        portal_urls: cli.portal_urls,
        poll_interval: Duration::from_millis(cli.poll_interval_ms),
        debug_leds: cli.test_leds,
        monitor: cli.monitor,
    })
    .context("gateway startup")?;

    if let Some(dir) = &cli.audio_dir {
        // Playback is handled by an external player fed from these channels;
        // without one we just surface what would have been played.
        info!(dir = %dir.display(), "sound effect selection enabled");
        spawn_sfx_logger(&gateway);
    }

    while !shutdown.load(Ordering::Relaxed) {
        match gateway.errors.recv_timeout(Duration::from_millis(250)) {
            Ok(err) => error!(%err, "runtime error"),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => break,
        }
    }

    warn!("interrupt seen, shutting down");
    gateway.shutdown();
    Ok(())
}

fn spawn_sfx_logger(gateway: &Gateway) {
    let ambient = gateway.sfx.ambient.clone();
    let effects = gateway.sfx.effects.clone();
    std::thread::spawn(move || {
        loop {
            crossbeam_channel::select! {
                recv(ambient) -> track => {
                    let Ok(track) = track else { return };
                    info!(%track, "ambient track");
                }
                recv(effects) -> batch => {
                    let Ok(batch) = batch else { return };
                    info!(?batch, "sound effects");
                }
            }
        }
    });
}

/// Hold a process-wide single-instance lock.
///
/// Binds an abstract-namespace Unix socket whose name derives from the
/// process name; abstract names vanish with the process, so no stale lock
/// file survives a crash.
fn exclusive(name: &str) -> anyhow::Result<UnixListener> {
    let addr = SocketAddr::from_abstract_name(format!("/tmp/{name}").as_bytes())
        .context("abstract socket name")?;
    UnixListener::bind_addr(&addr).with_context(|| format!("single-instance lock '{name}'"))
}
