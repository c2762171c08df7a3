//! # filelist-db: Query Engine for File-List Verification Protocols
//!
//! **Version**: 0.1.0
//!
//! filelist-db answers the questions a biometric verification experiment asks
//! of its protocol: which samples train the system, which samples enroll
//! model M, and which (probe, model) pairs must be scored. Protocols are
//! described entirely by whitespace-delimited list files under a base
//! directory; nothing is ever written back.
//!
//! ## Design Principles (Toyota Way Aligned)
//!
//! - **Poka-Yoke**: the dense/sparse scoring mode is committed once per base
//!   directory and every later protocol is checked against it
//! - **Jidoka**: a malformed list aborts the whole protocol build, no partial
//!   protocol is ever published
//! - **Muda elimination**: list files are parsed once per protocol and served
//!   from an immutable, shared index afterwards
//!
//! ## Layout
//!
//! ```text
//! ListConfig ─> protocol (resolve + commit mode) ─> list (parse rows)
//!           ─> record::builder (typed records) ─> index (lookups)
//!           ─> Database / query (filters) ─> caller or RecordSink
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use filelist_db::{Database, Filter, Group};
//!
//! let db = Database::builder("/data/protocols").build()?;
//!
//! for client in db.clients(&Filter::new().protocol("P1"))? {
//!     println!("client {client}");
//! }
//!
//! let pairs = db.probe_pairs(&Filter::new().protocol("P1").group(Group::Dev))?;
//! println!("{} pairs to score", pairs.len());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
mod database;
pub mod error;
pub mod index;
pub mod list;
pub mod protocol;
pub mod query;
pub mod record;
pub mod sink;
pub mod telemetry;

pub use config::ListConfig;
pub use database::{Database, DatabaseBuilder};
pub use error::{Error, Result};
pub use list::ListRole;
pub use protocol::{ProtocolId, ScoringMode};
pub use query::{Filter, Model, ProbePair};
pub use record::{Group, ProbeClass, Purpose, Record, Sample};
