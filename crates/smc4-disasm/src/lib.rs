pub mod analyze;
pub mod model;

pub use analyze::{analyze_entries, block_edges, blocks, Analysis, Block, EdgeKind, EdgeOut};
pub use model::{is_mapped, load_labels, load_raw_bin, read_word, Image};
