//! Data layer: file readers, the volume model and slice queries.
//!
//! Architecture:
//! ```text
//!  results .csv            parameter file
//!        │                       │
//!        ▼                       ▼
//!   ┌──────────┐           ┌──────────┐
//!   │  header   │           │  params   │
//!   └──────────┘           └──────────┘
//!        │                       │
//!        └──────────┬────────────┘
//!                   ▼
//!             ┌──────────┐
//!             │  loader   │  rows → per-stat Array3, axes in cm
//!             └──────────┘
//!                   │
//!                   ▼
//!             ┌──────────┐
//!             │  Volume   │  read-only aggregate
//!             └──────────┘
//!                   │
//!                   ▼
//!             ┌──────────┐
//!             │  slice    │  bin lookup, 2-D cross sections
//!             └──────────┘
//! ```

pub mod error;
pub mod header;
pub mod loader;
pub mod model;
pub mod params;
pub mod slice;
pub mod units;
