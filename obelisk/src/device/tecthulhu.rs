//! Communication with the tecthulhu portal device.
//!
//! The device fronts portal state over HTTP; its firmware has produced two
//! different JSON shapes in the field and both are accepted here. A serial
//! transport is documented for the device but has never been implemented.

use std::time::Duration;

use crossbeam_channel::{select, tick, Receiver, Sender};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use tracing::error;

use crate::foundation::error::{ObeliskError, ObeliskResult};
use crate::portal::status::{Faction, Mod, PortalMsg, Resonator, Status};

/// Default poll cadence.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// How long a status publish may wait on the bus before the sample is
/// dropped.
const PUBLISH_TIMEOUT: Duration = Duration::from_millis(750);

/// Timeout for pushing an error onto the error channel.
const ERROR_PUBLISH_TIMEOUT: Duration = Duration::from_millis(500);

/// Longer timeout for the drop-notification error, which races a congested
/// bus by definition.
const DROP_NOTIFY_TIMEOUT: Duration = Duration::from_secs(2);

/// Poller for one portal device URL.
#[derive(Debug)]
pub struct Tecthulhu {
    url: Url,
    home: bool,
    client: Client,
    status_tx: Sender<PortalMsg>,
    error_tx: Sender<ObeliskError>,
}

impl Tecthulhu {
    /// Validate the device URL and build a poller for it.
    ///
    /// Only the `http` scheme is implemented; `serial` is reserved and
    /// refused with a clear error, as is anything else.
    pub fn new(
        url: &str,
        home: bool,
        status_tx: Sender<PortalMsg>,
        error_tx: Sender<ObeliskError>,
    ) -> ObeliskResult<Self> {
        let url = Url::parse(url)
            .map_err(|e| ObeliskError::config(format!("unparsable portal URL {url}: {e}")))?;
        match url.scheme() {
            "http" => {}
            "serial" => {
                return Err(ObeliskError::config(format!(
                    "scheme serial for the tecthulhu device is not yet implemented ({url})"
                )));
            }
            other => {
                return Err(ObeliskError::config(format!(
                    "unknown scheme {other} for the tecthulhu device URI ({url})"
                )));
            }
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| ObeliskError::config(format!("http client: {e}")))?;
        Ok(Self {
            url,
            home,
            client,
            status_tx,
            error_tx,
        })
    }

    /// Fetch and normalise the device's current status.
    fn check_portal(&self) -> ObeliskResult<Status> {
        let body = self
            .client
            .get(self.url.clone())
            .send()
            .and_then(reqwest::blocking::Response::text)
            .map_err(|e| ObeliskError::io(format!("portal poll {}: {e}", self.url)))?;
        parse_status(&body).map_err(|e| match e {
            ObeliskError::Parse(msg) => ObeliskError::Parse(format!("{}: {msg}", self.url)),
            other => other,
        })
    }

    /// One poll: publish the sample, or surface the failure and move on.
    fn send_status(&self) {
        let status = match self.check_portal() {
            Ok(status) => status,
            Err(err) => {
                if self
                    .error_tx
                    .send_timeout(err, ERROR_PUBLISH_TIMEOUT)
                    .is_err()
                {
                    error!("could not send error for portal status update");
                }
                return;
            }
        };

        let msg = PortalMsg {
            home: self.home,
            status,
        };
        if self.status_tx.send_timeout(msg, PUBLISH_TIMEOUT).is_err() {
            // The consumer is too slow; drop the sample rather than queue.
            let err = ObeliskError::backpressure(format!("portal status dropped ({})", self.url));
            if self.error_tx.send_timeout(err, DROP_NOTIFY_TIMEOUT).is_err() {
                error!("could not send error for portal status update");
            }
        }
    }

    /// Poll on `interval` until `quit` fires or disconnects.
    pub fn run(&self, interval: Duration, quit: &Receiver<()>) {
        let poll = tick(interval);
        loop {
            select! {
                recv(poll) -> _ => self.send_status(),
                recv(quit) -> _ => return,
            }
        }
    }
}

/// The "events" wire shape: single-character faction codes and mods as
/// `TYPE-RARITY` strings indexed by slot.
#[derive(Debug, Deserialize)]
struct EventsStatus {
    #[serde(default)]
    title: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    level: f32,
    #[serde(default)]
    health: f32,
    #[serde(rename = "controllingFaction", default)]
    faction: String,
    #[serde(default)]
    mods: Vec<String>,
    #[serde(default)]
    resonators: Vec<WireResonator>,
}

/// The "result" wire shape: faction spelled out, mods structured.
#[derive(Debug, Deserialize)]
struct ResultStatus {
    #[serde(default)]
    title: String,
    #[serde(default)]
    owner: String,
    #[serde(default)]
    level: f32,
    #[serde(default)]
    health: f32,
    #[serde(rename = "controllingFaction", default)]
    faction: String,
    #[serde(default)]
    mods: Vec<WireMod>,
    #[serde(default)]
    resonators: Vec<WireResonator>,
}

#[derive(Debug, Deserialize)]
struct WireResonator {
    #[serde(default)]
    position: String,
    #[serde(default)]
    level: f32,
    #[serde(default)]
    health: f32,
    #[serde(default)]
    owner: String,
}

#[derive(Debug, Deserialize)]
struct WireMod {
    #[serde(default)]
    slot: u8,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    rarity: String,
    #[serde(default)]
    owner: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WireShape {
    Events { status: EventsStatus },
    Result { result: ResultStatus, code: String },
}

fn excerpt(body: &str) -> String {
    const LIMIT: usize = 120;
    if body.len() <= LIMIT {
        body.to_owned()
    } else {
        let cut = body
            .char_indices()
            .take_while(|&(i, _)| i < LIMIT)
            .last()
            .map_or(0, |(i, c)| i + c.len_utf8());
        format!("{}...", &body[..cut])
    }
}

/// Parse either known wire shape into the canonical status.
pub fn parse_status(body: &str) -> ObeliskResult<Status> {
    let shape: WireShape = serde_json::from_str(body)
        .map_err(|e| ObeliskError::parse(format!("{e}; body: {}", excerpt(body))))?;

    Ok(match shape {
        WireShape::Events { status } => Status {
            title: status.title,
            owner: status.owner,
            level: status.level,
            health: status.health,
            faction: match status.faction.as_str() {
                "1" => Faction::Enlightened,
                "2" => Faction::Resistance,
                _ => Faction::Neutral,
            },
            mods: status
                .mods
                .iter()
                .enumerate()
                .map(|(slot, raw)| {
                    let (kind, rarity) = match raw.split_once('-') {
                        Some((kind, rarity)) => (kind.to_owned(), rarity.to_owned()),
                        None => (raw.clone(), String::new()),
                    };
                    Mod {
                        owner: String::new(),
                        slot: slot as u8,
                        kind,
                        rarity,
                    }
                })
                .collect(),
            resonators: status.resonators.into_iter().map(resonator).collect(),
        },
        WireShape::Result { result, code } => {
            if code != "OK" {
                return Err(ObeliskError::parse(format!(
                    "device reported code {code}; body: {}",
                    excerpt(body)
                )));
            }
            Status {
                title: result.title,
                owner: result.owner,
                level: result.level,
                health: result.health,
                faction: match result.faction.chars().next() {
                    Some('E' | 'e') => Faction::Enlightened,
                    Some('R' | 'r') => Faction::Resistance,
                    _ => Faction::Neutral,
                },
                mods: result
                    .mods
                    .into_iter()
                    .map(|m| Mod {
                        owner: m.owner,
                        slot: m.slot,
                        kind: m.kind,
                        rarity: m.rarity,
                    })
                    .collect(),
                resonators: result.resonators.into_iter().map(resonator).collect(),
            }
        }
    })
}

fn resonator(r: WireResonator) -> Resonator {
    Resonator {
        position: r.position,
        level: r.level,
        health: r.health,
        owner: r.owner,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/device/tecthulhu.rs"]
mod tests;
