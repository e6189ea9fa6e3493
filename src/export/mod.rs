//! Model package export
//!
//! Turns a servable model into an on-disk package the serving runtime can
//! load: a `<node_id>_<export_name>` directory holding the versioned model
//! artifact and its generated `config.pbtxt`.

mod fsutil;
mod predictor;

pub use fsutil::copy_dir_recursive;
pub use predictor::{PredictSavedModel, MODEL_SUBDIR};
