//! Supervisor wiring: bus, subscribers, pollers and shutdown.

use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, Sender};
use tracing::{debug, info};

use crate::bus::fanout::start_fanout;
use crate::device::tecthulhu::Tecthulhu;
use crate::foundation::error::{ObeliskError, ObeliskResult};
use crate::portal::status::PortalMsg;
use crate::sfx::{start_sfx, SfxEvents};
use crate::wire::emitter::{start_frame_emitter, EmitterConfig};

/// Everything the gateway needs to come up.
pub struct GatewayConfig {
    /// Pixel server address, or `/dev/null` to disable wire writes.
    pub opc_server: String,
    /// Portal device URLs; the first one is the home portal.
    pub portal_urls: Vec<String>,
    /// Device poll cadence.
    pub poll_interval: Duration,
    /// Emit the 8-LED debug pattern instead of the animation.
    pub debug_leds: bool,
    /// Log every bus message at debug level.
    pub monitor: bool,
}

/// A running gateway.
pub struct Gateway {
    quit_tx: Sender<()>,
    handles: Vec<JoinHandle<()>>,
    /// Publish port of the status bus, for callers injecting statuses.
    pub publish: Sender<PortalMsg>,
    /// Control port of the status bus, for late subscribers.
    pub subscribe: Sender<Sender<PortalMsg>>,
    /// Runtime errors surfaced by every component.
    pub errors: Receiver<ObeliskError>,
    /// Channels feeding the external audio player.
    pub sfx: SfxEvents,
}

impl Gateway {
    /// Wire and start every component.
    ///
    /// Configuration problems (bad URL, unknown scheme) fail startup; nothing
    /// is left running on error.
    pub fn start(cfg: &GatewayConfig) -> ObeliskResult<Self> {
        let (quit_tx, quit_rx) = bounded::<()>(0);
        let (error_tx, error_rx) = bounded::<ObeliskError>(16);

        let bus = start_fanout(quit_rx.clone());
        let mut handles = Vec::new();

        let (sfx, sfx_handle) = start_sfx(&bus.subscribe, quit_rx.clone())?;
        handles.push(sfx_handle);

        if cfg.monitor {
            handles.push(start_monitor(&bus.subscribe, quit_rx.clone())?);
        }

        handles.extend(start_frame_emitter(
            EmitterConfig {
                server: cfg.opc_server.clone(),
                debug_leds: cfg.debug_leds,
            },
            &bus.subscribe,
            error_tx.clone(),
            quit_rx.clone(),
        )?);

        // Validate every poller before spawning any so a bad URL aborts
        // startup cleanly.
        let mut pollers = Vec::with_capacity(cfg.portal_urls.len());
        for (idx, url) in cfg.portal_urls.iter().enumerate() {
            pollers.push(Tecthulhu::new(
                url,
                idx == 0,
                bus.publish.clone(),
                error_tx.clone(),
            )?);
        }
        let interval = cfg.poll_interval;
        for poller in pollers {
            let quit = quit_rx.clone();
            handles.push(std::thread::spawn(move || poller.run(interval, &quit)));
        }

        handles.push(bus.handle);

        info!(
            server = %cfg.opc_server,
            portals = cfg.portal_urls.len(),
            "gateway started"
        );

        Ok(Self {
            quit_tx,
            handles,
            publish: bus.publish,
            subscribe: bus.subscribe,
            errors: error_rx,
            sfx,
        })
    }

    /// Broadcast quit and wait for every task to reach its next suspension
    /// point and exit.
    pub fn shutdown(self) {
        debug!("gateway shutting down");
        // Dropping the only sender disconnects every quit receiver.
        drop(self.quit_tx);
        for handle in self.handles {
            let _ = handle.join();
        }
    }
}

/// Debug subscriber that logs every bus message.
fn start_monitor(
    subscribe: &Sender<Sender<PortalMsg>>,
    quit: Receiver<()>,
) -> ObeliskResult<JoinHandle<()>> {
    let (status_tx, status_rx) = bounded::<PortalMsg>(1);
    subscribe
        .send_timeout(status_tx, Duration::from_secs(1))
        .map_err(|_| ObeliskError::backpressure("could not subscribe monitor to bus"))?;

    Ok(std::thread::spawn(move || {
        loop {
            select! {
                recv(status_rx) -> msg => {
                    let Ok(msg) = msg else { return };
                    debug!(home = msg.home, faction = ?msg.status.faction, level = msg.status.level, "portal status");
                }
                recv(quit) -> _ => return,
            }
        }
    }))
}
