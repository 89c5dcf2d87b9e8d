//! pdecalc: Permitted Daily Exposure calculator
//!
//! Computes the PDE of a pharmaceutical impurity or residual solvent from
//! toxicological dose data:
//!
//! ```text
//! PDE = (NOAEL x body weight) / (F1 x F2 x F3 x F4 x F5)
//! ```
//!
//! The calculation lives in [`core`]; [`server`] exposes it over HTTP and
//! [`cli`] on the command line.

pub mod cli;
pub mod core;
pub mod server;
