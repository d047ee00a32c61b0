//! Output generation for aggregated news.
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2025-05-06/
//!     ├── DE.json
//!     ├── FR.json
//!     └── US.json
//! ```

pub mod json;
