//! `onumon` Core Library
//!
//! This crate polls an 8311-firmware XGS-PON ONU stick over SSH and turns
//! one batched diagnostic command into a typed telemetry snapshot.
//!
//! # Crate Structure
//!
//! - [`config`] - Per-installation settings, overrides and resolution
//! - [`session`] - SSH transport (spawned `ssh` client, key-only auth)
//! - [`batch`] - The delimiter-framed diagnostic command batch
//! - [`parser`] / [`eeprom`] - Field decoders for text and SFP EEPROM output
//! - [`snapshot`] - The assembled [`snapshot::TelemetrySnapshot`] and its field table
//! - [`fetch`] - One all-or-nothing fetch cycle
//! - [`poller`] - Interval scheduler with a last-known-good cache
//! - [`keys`] - SSH key generation and rotation
//! - [`service`] - Control operations (reboot, credential rotation)
//! - [`error`] - Error taxonomy shared across the pipeline

#![warn(missing_docs)]

pub mod batch;
pub mod config;
pub mod eeprom;
pub mod error;
pub mod fetch;
pub mod keys;
pub mod parser;
pub mod poller;
pub mod service;
pub mod session;
pub mod snapshot;

pub use config::{OnuOptions, OnuSettings, ResolvedConfig};
pub use error::{FetchError, FetchResult, OnuError, OnuResult};
pub use fetch::fetch_snapshot;
pub use keys::{KeyPair, KeyStore, RotationOutcome};
pub use poller::{PollEvent, PollState, PollerHandle, start_poller};
pub use service::OnuService;
pub use session::{CommandRunner, SshSession};
pub use snapshot::{FieldCategory, FieldDescriptor, FieldValue, TelemetrySnapshot};
