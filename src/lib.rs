//! 顶层 re‑export，方便外部调用。

pub mod analysis;
pub mod cfg;
pub mod cfg_analysis;
pub mod debug_info;
pub mod debug_util;
pub mod decompose;
pub mod error;
pub mod expr;
pub mod ir;
pub mod profile;


pub use analysis::{analyze_function, analyze_module, AnalysisConfig};
pub use cfg::{build_cfg, Cfg, EdgeKind};
pub use cfg_analysis::{LoopNest, NaturalLoop};
pub use debug_info::{normalize_symbol, CorrelationTable};
pub use decompose::decompose;
pub use error::AnalysisError;
pub use expr::{Expr, ExprOp};
pub use ir::*;
pub use profile::*;
