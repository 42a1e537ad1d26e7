//! Correlation of internal value identities with declared source
//! variables, built once per function from the host's debug metadata.
//! Only local declarations are tracked; globals live in module-level
//! metadata this function-scoped snapshot does not carry.

use std::collections::BTreeMap;

use crate::debug_log;
use crate::error::AnalysisError;
use crate::ir::Function;
use crate::profile::DebugVariableInfo;

/// Strip the host's type-and-sigil prefix from a value identity and
/// return the bare identifier: `"i32 %limit"` → `"limit"`.
///
/// Contract: everything up to and including the *first* `%` is dropped;
/// later sigil-like characters are kept verbatim. Surrounding whitespace
/// is trimmed either way, so already-bare identifiers pass through.
pub fn normalize_symbol(raw: &str) -> &str {
    match raw.find('%') {
        Some(pos) => raw[pos + 1..].trim(),
        None => raw.trim(),
    }
}

/// Lookup table from normalized IR symbol name to the source variable
/// it implements. Read-only after construction, scoped to one function.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CorrelationTable {
    /// Checksum of the single compile unit's source file, when the host
    /// recorded one.
    pub source_file_checksum: Option<String>,
    entries: BTreeMap<String, DebugVariableInfo>,
}

impl CorrelationTable {
    pub fn build(func: &Function) -> Result<Self, AnalysisError> {
        let debug = func
            .debug
            .as_ref()
            .ok_or_else(|| AnalysisError::MissingDebugInfo(func.name.clone()))?;

        if debug.compile_units.len() != 1 {
            return Err(AnalysisError::MultipleCompileUnits(
                func.name.clone(),
                debug.compile_units.len(),
            ));
        }
        let source_file_checksum = debug.compile_units[0].checksum.clone();

        let mut entries = BTreeMap::new();
        for local in &debug.locals {
            for binding in &local.bindings {
                if !binding.intrinsic {
                    return Err(AnalysisError::MalformedDebugBinding {
                        variable: local.name.clone(),
                        value: binding.value.clone(),
                    });
                }
                let key = normalize_symbol(&binding.value).to_string();
                debug_log!(
                    "correlating {} with source variable {} (line {})",
                    key,
                    local.name,
                    local.line
                );
                entries.insert(
                    key.clone(),
                    DebugVariableInfo {
                        ir_symbol_name: key,
                        source_name: local.name.clone(),
                        line: local.line,
                    },
                );
            }
        }

        Ok(Self {
            source_file_checksum,
            entries,
        })
    }

    /// Lookup by normalized symbol name (see [`normalize_symbol`]).
    pub fn get(&self, normalized: &str) -> Option<&DebugVariableInfo> {
        self.entries.get(normalized)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
