//! Core module - factor tables, PDE calculation, and configuration

pub mod config;
pub mod error;
pub mod factors;
pub mod pde;
pub mod report;

pub use config::{Config, ConfigWarning};
pub use error::PdeError;
pub use factors::{duration_keys, resolve_f1, resolve_f3, species_keys, DURATION_F3, SPECIES_F1};
pub use pde::{compute_pde, PdeInputs, PdeResult};
pub use report::{formula_lines, Advisory, PdeReport, GENERAL_CAVEATS};
