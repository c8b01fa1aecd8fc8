#![doc = "text-reorg: reorganise folders of text files with a generative text service."]

//! The library holds the whole pipeline; the binary in `main.rs` only parses arguments,
//! sets up logging and calls [`cli::run`].
//!
//! - [`traverse`]: walks the input tree, skips finished files, writes mirrored outputs
//! - [`aggregate`]: combines one directory into `<name>.txt`, `.md` and `.odt`
//! - [`contract`]: the [`contract::TextTransformer`] / [`contract::DocumentConverter`] seams
//! - [`transform`], [`convert`]: production implementations of those seams

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod contract;
pub mod convert;
pub mod load_config;
pub mod logging;
pub mod persist;
pub mod transform;
pub mod traverse;

pub use cli::{run, Cli, Commands};
