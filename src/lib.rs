//! urtica - article corpus preprocessing and annotation agreement.
//!
//! Turns a directory of PDF articles into cleaned, lemmatized statements and
//! scores how well annotators agree when labelling them.

pub mod agreement;
pub mod catalog;
pub mod config;
pub mod extract;
pub mod pipeline;
pub mod terms;
pub mod text;
pub mod utils;
