//! Single-writer broadcast of portal messages to subscribers.
//!
//! Delivery uses bounded channels and timed sends: a slow subscriber costs
//! the broadcaster at most the send timeout and loses only that message; a
//! subscriber whose channel has gone away is removed. Never both.

use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{bounded, select, Receiver, SendTimeoutError, Sender};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::portal::status::PortalMsg;

/// How long one subscriber may stall a broadcast.
pub const SEND_TIMEOUT: Duration = Duration::from_millis(250);

/// Subscriber registry shared with the broadcaster thread.
#[derive(Default)]
pub struct Subscribers {
    subs: Mutex<Vec<Sender<PortalMsg>>>,
}

/// Handle to a running fan-out.
///
/// The broadcaster exits when `quit` fires or when either port loses its
/// last sender, so whoever owns this keeps the bus alive.
pub struct StatusBus {
    /// Publish port: pollers push portal messages here.
    pub publish: Sender<PortalMsg>,
    /// Control port: push a channel sender here to start receiving.
    pub subscribe: Sender<Sender<PortalMsg>>,
    /// The broadcaster thread.
    pub handle: JoinHandle<()>,
}

impl StatusBus {
    /// Wait for the broadcaster thread to exit.
    pub fn join(self) {
        let _ = self.handle.join();
    }
}

/// Start the broadcast loop. The bus runs until `quit` disconnects or fires.
pub fn start_fanout(quit: Receiver<()>) -> StatusBus {
    let (publish, inbox) = bounded::<PortalMsg>(1);
    let (subscribe, control) = bounded::<Sender<PortalMsg>>(1);
    let subscribers = Arc::new(Subscribers::default());

    let registry = Arc::clone(&subscribers);
    let handle = std::thread::spawn(move || {
        loop {
            select! {
                recv(quit) -> _ => {
                    debug!("fanout stopped");
                    return;
                }
                recv(control) -> sub => {
                    let Ok(sub) = sub else { return };
                    registry.subs.lock().push(sub);
                    info!("subscription added");
                }
                recv(inbox) -> msg => {
                    let Ok(msg) = msg else { return };
                    broadcast(&registry, &msg);
                }
            }
        }
    });

    StatusBus {
        publish,
        subscribe,
        handle,
    }
}

/// Deliver `msg` to every subscriber, grooming out dead ones.
///
/// The registry lock is held for the whole broadcast; fan-out stays small.
fn broadcast(registry: &Subscribers, msg: &PortalMsg) {
    let mut subs = registry.subs.lock();
    subs.retain(|sub| match sub.send_timeout(msg.clone(), SEND_TIMEOUT) {
        Ok(()) => true,
        Err(SendTimeoutError::Timeout(_)) => {
            // Backpressure: the consumer is too slow. Drop the sample, keep
            // the subscription.
            warn!("subscription failed to send; message dropped");
            true
        }
        Err(SendTimeoutError::Disconnected(_)) => {
            warn!("subscription dropped, receiver is gone");
            false
        }
    });
}

#[cfg(test)]
#[path = "../../tests/unit/bus/fanout.rs"]
mod tests;
