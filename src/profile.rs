//! The analysis result: a per-function tree of program parts (function →
//! loops/blocks → ...), stored as an arena of nodes addressed by index.
//! Parents own their children's indices; the whole tree is dropped with
//! the arena. JSON and plain-text rendering live here as well.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Sentinel for information the host could not provide (no closed-form
/// trip count, unknown source location).
pub const UNDEF_VALUE: &str = "Undef";

/// Index of a part inside its [`FunctionProfile`] arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId(pub usize);

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Part {
    Function(FunctionPart),
    Loop(LoopPart),
    Block(BlockPart),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionPart {
    pub name: String,
    pub arguments: Vec<ArgumentInfo>,
    /// Top-level loops and free blocks, in discovery order.
    pub children: Vec<PartId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopPart {
    /// Header block name.
    pub name: String,
    /// Rendered closed-form trip count, or [`UNDEF_VALUE`].
    pub iterations: String,
    /// Source variables behind the atomic terms of the trip count.
    pub iterations_debug_info: Vec<DebugVariableInfo>,
    /// Nested loops first, then this loop's own blocks.
    pub children: Vec<PartId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BlockPart {
    pub name: String,
    /// Opcode → occurrence count, terminator included.
    pub instructions: BTreeMap<String, u32>,
    /// Call sites, annotation intrinsics excluded.
    pub calls: Vec<CallSiteInfo>,
    /// Successor block name → probability token.
    pub successors: BTreeMap<String, String>,
    pub terminator_location: DebugLocation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArgumentInfo {
    pub name: String,
    pub ty: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallSiteInfo {
    pub callee: String,
    pub args: Vec<ArgumentInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugVariableInfo {
    /// Normalized internal identity (see `debug_info::normalize_symbol`).
    pub ir_symbol_name: String,
    /// Declared name from debug metadata.
    pub source_name: String,
    pub line: u32,
}

/// Source location with the host's zero-means-unknown convention already
/// folded into `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebugLocation {
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl DebugLocation {
    pub fn from_raw(line: u32, column: u32) -> Self {
        Self {
            line: (line != 0).then_some(line),
            column: (column != 0).then_some(column),
        }
    }

    fn field_json(v: Option<u32>) -> Value {
        match v {
            Some(n) => json!(n.to_string()),
            None => json!(UNDEF_VALUE),
        }
    }
}

/// One function's complete result tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionProfile {
    parts: Vec<Part>,
    root: PartId,
}

impl FunctionProfile {
    pub fn new(parts: Vec<Part>, root: PartId) -> Self {
        Self { parts, root }
    }

    pub fn root(&self) -> PartId {
        self.root
    }

    pub fn part(&self, id: PartId) -> &Part {
        &self.parts[id.0]
    }

    pub fn parts(&self) -> &[Part] {
        &self.parts
    }

    /// Children of a part; blocks are leaves.
    pub fn children(&self, id: PartId) -> &[PartId] {
        match self.part(id) {
            Part::Function(f) => &f.children,
            Part::Loop(l) => &l.children,
            Part::Block(_) => &[],
        }
    }

    /* ---------- JSON rendering ---------- */

    pub fn to_json(&self) -> Value {
        self.part_json(self.root)
    }

    fn part_json(&self, id: PartId) -> Value {
        match self.part(id) {
            Part::Function(func) => {
                let mut obj = json!({
                    "type": "function",
                    "name": func.name,
                    "arguments": func.arguments.iter().map(argument_json).collect::<Vec<_>>(),
                });
                self.attach_children(&mut obj, &func.children);
                obj
            }
            Part::Loop(lp) => {
                let mut obj = json!({
                    "type": "loop",
                    "name": lp.name,
                    "iterations": lp.iterations,
                    "iterations_debug_info": lp
                        .iterations_debug_info
                        .iter()
                        .map(debug_variable_json)
                        .collect::<Vec<_>>(),
                });
                self.attach_children(&mut obj, &lp.children);
                obj
            }
            Part::Block(bb) => json!({
                "type": "basic block",
                "name": bb.name,
                "instructions": bb
                    .instructions
                    .iter()
                    .map(|(name, count)| json!({"instruction": name, "count": count}))
                    .collect::<Vec<_>>(),
                "function calls": bb
                    .calls
                    .iter()
                    .map(|call| json!({"function": call_site_json(call)}))
                    .collect::<Vec<_>>(),
                "successors": bb
                    .successors
                    .iter()
                    .map(|(succ, prob)| json!({"successor": succ, "probability": prob}))
                    .collect::<Vec<_>>(),
                "terminator_dbg_location": {
                    "line": DebugLocation::field_json(bb.terminator_location.line),
                    "column": DebugLocation::field_json(bb.terminator_location.column),
                },
            }),
        }
    }

    fn attach_children(&self, obj: &mut Value, children: &[PartId]) {
        if children.is_empty() {
            return;
        }
        let rendered: Vec<Value> = children.iter().map(|&c| self.part_json(c)).collect();
        obj["children"] = Value::Array(rendered);
    }

    /* ---------- text rendering ---------- */

    pub fn to_text(&self) -> String {
        let mut out = String::new();
        self.part_text(self.root, 0, &mut out);
        out
    }

    fn part_text(&self, id: PartId, level: usize, out: &mut String) {
        let pad = "\t".repeat(level);
        match self.part(id) {
            Part::Function(func) => {
                out.push_str(&format!("{}Function {}\n", pad, func.name));
                out.push_str(&format!("{}arguments:\n", pad));
                for a in &func.arguments {
                    out.push_str(&format!("{}\t{}: {}\n", pad, a.ty, a.name));
                }
                for &c in &func.children {
                    self.part_text(c, level + 1, out);
                }
            }
            Part::Loop(lp) => {
                out.push_str(&format!("{}Loop {}\n", pad, lp.name));
                out.push_str(&format!("{}iterations: {}\n", pad, lp.iterations));
                for info in &lp.iterations_debug_info {
                    out.push_str(&format!(
                        "{}\t{} = source `{}` (line {})\n",
                        pad, info.ir_symbol_name, info.source_name, info.line
                    ));
                }
                for &c in &lp.children {
                    self.part_text(c, level + 1, out);
                }
            }
            Part::Block(bb) => {
                out.push_str(&format!("{}Basic Block {}\n", pad, bb.name));
                out.push_str(&format!("{}instructions:\n", pad));
                for (name, count) in &bb.instructions {
                    out.push_str(&format!("{}\t{}: {}\n", pad, name, count));
                }
                for (succ, prob) in &bb.successors {
                    out.push_str(&format!("{}-> {} [{}]\n", pad, succ, prob));
                }
            }
        }
    }
}

fn argument_json(a: &ArgumentInfo) -> Value {
    json!({"name": a.name, "type": a.ty})
}

fn call_site_json(call: &CallSiteInfo) -> Value {
    json!({
        "type": "function",
        "name": call.callee,
        "arguments": call.args.iter().map(argument_json).collect::<Vec<_>>(),
    })
}

fn debug_variable_json(info: &DebugVariableInfo) -> Value {
    json!({
        "ir_symbol_name": info.ir_symbol_name,
        "source_code_name": info.source_name,
        "line": info.line,
    })
}
