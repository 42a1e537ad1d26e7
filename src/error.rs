//! Error taxonomy for a single function's analysis. Debug-metadata
//! violations abort that function only; the caller moves on to the next.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum AnalysisError {
    /// The function was not compiled with source-line tracking; no
    /// provenance can be attached, so no partial profile is produced.
    #[error("function `{0}` carries no debug metadata")]
    MissingDebugInfo(String),

    /// Cross-compile-unit debug metadata (e.g. LTO-style inlining) is a
    /// documented limitation, not handled gracefully.
    #[error("function `{0}` spans {1} compile units, expected exactly 1")]
    MultipleCompileUnits(String, usize),

    /// A value bound to a local-variable declaration is used by something
    /// other than a debug-binding intrinsic. The correlation table would
    /// be silently wrong, so the whole function is rejected.
    #[error("debug binding for `{variable}` via `{value}` is not a debug intrinsic use")]
    MalformedDebugBinding { variable: String, value: String },

    /// A terminator names a successor block absent from the snapshot.
    #[error("terminator of `{from}` targets unknown block `{target}`")]
    UnknownBlock { from: String, target: String },
}
