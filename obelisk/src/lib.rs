//! Obelisk is a realtime gateway between an augmented-reality game "portal"
//! device and an LED sculpture of the portal.
//!
//! Portal state (owning faction, level, per-resonator health and level,
//! mods) is polled over HTTP, normalised, broadcast on a status bus, and fed
//! into a stateful animation engine whose frames stream to a pixel server
//! over the Open Pixel Control protocol at a 30 ms cadence.
//!
//! The pipeline, leaves first:
//!
//! - [`mapping`]: logical "universe" to physical strand pixel model
//! - [`effects`]: per-frame colour generators
//! - [`sequence`]: the step-graph sequencer advancing one frame per tick
//! - [`portal`]: canonical device state, content hashing, choreography
//! - [`bus`]: single-writer broadcast with bounded backpressure
//! - [`device`]: the tecthulhu HTTP poller
//! - [`wire`]: OPC framing, sinks and the frame pump
//! - [`gateway`]: supervisor wiring it all together
#![forbid(unsafe_code)]

pub mod bus;
pub mod color;
pub mod device;
pub mod effects;
pub mod foundation;
pub mod gateway;
pub mod mapping;
pub mod portal;
pub mod sequence;
pub mod sfx;
pub mod wire;

pub use crate::foundation::core::Rgba8;
pub use crate::foundation::error::{ObeliskError, ObeliskResult};
pub use crate::gateway::{Gateway, GatewayConfig};
pub use crate::mapping::universe::{PhysicalRange, PixelMap, UniverseId};
pub use crate::portal::status::{Faction, PortalMsg, Status};
