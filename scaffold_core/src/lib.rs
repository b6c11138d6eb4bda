//! # scaffold_core - Scaffold Dimension and Parts-Optimization Engine
//!
//! `scaffold_core` computes a scaffold plan for a building: which parts
//! fill each face, the gap left on every side, the vertical staging, and
//! the total module count. All inputs and outputs are JSON-serializable so
//! web and mobile front ends can send form data in and store results as-is.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: [`calc_all`] is a pure function of its input
//! - **Never fails**: infeasible layouts are reported in the result, not as errors
//! - **JSON-First**: all records implement Serialize/Deserialize
//! - **Traceable**: decisions are logged through `tracing`, off unless a subscriber is installed
//!
//! ## Quick Start
//!
//! ```rust
//! use scaffold_core::{calc_all, ScaffoldInput};
//!
//! let input = ScaffoldInput {
//!     width_ns: 10_010,
//!     width_ew: 9_100,
//!     eaves_n: 500,
//!     eaves_e: 500,
//!     eaves_s: 500,
//!     eaves_w: 500,
//!     standard_height: 6_000,
//!     ..ScaffoldInput::default()
//! };
//!
//! let result = calc_all(&input);
//! let json = serde_json::to_string_pretty(&result).unwrap();
//! assert!(json.contains("nsSpanStructure"));
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - The engine: parts, margins, spans, faces, staging
//! - [`settings`] - Tunable clearances and step sizes
//! - [`form`] - Adapter from raw form fields to [`ScaffoldInput`]
//! - [`project`] - Project container holding calculation jobs
//! - [`file_io`] - `.sfp` project files: atomic saves, locked editing
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod errors;
pub mod file_io;
pub mod form;
pub mod project;
pub mod settings;

// Re-export commonly used types at crate root for convenience
pub use calculations::{calc_all, calc_all_with, RoofShape, ScaffoldInput, ScaffoldResult};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_project, save_project, ProjectEditor};
pub use form::FormInput;
pub use project::{Project, ProjectMetadata, ScaffoldJob};
pub use settings::EngineSettings;
