//! Core library for the `icnp-merge` command line application.
//!
//! The library merges the ICNP terminology table with the SNOMED CT mapping
//! tables and exports the result. Configuration lives in
//! [`bifrost::terminology::config`], the term model in
//! [`bifrost::terminology::model`], spreadsheet and JSON adapters under
//! [`bifrost::terminology::io`], the cross-reference pass in
//! [`bifrost::terminology::enrich`], and the orchestration in
//! [`bifrost::terminology::pipeline`].

pub mod bifrost;

pub use bifrost::terminology::{
    Result, ToolError, config, enrich, error, io, layout, model, pipeline,
};
