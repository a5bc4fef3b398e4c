//! Combinatorial spike synthesis: the id grammar, its boundedly-enumerable
//! address space, and per-library spec generation.

mod error;
pub mod grammar;
mod synth;

pub use error::{GeneratorError, Result};
pub use grammar::{
    decode_index, is_generated_id, list_generated_ids_filtered, parse_generated_id, render_id,
    total_space, GeneratedIdComponents, GeneratedIdFilter, GEN_PREFIX, LANGS, LIBS, PATTERNS,
    STRIKE_PREFIX, STYLES,
};
pub use synth::{generate_spike, lang_name, source_ext};
