//! 宿主编译器分析结果的快照模型（模块 / 函数 / 基本块 / 指令 / 调试元数据）
//! * 本 crate 不自己计算编译器后端分析（trip count、分支概率、调试绑定），
//!   这些由宿主导出，经 serde 反序列化后作为输入。
//! * 类型与值的文本形式由宿主渲染完毕（如 `"i32"`、`"i32 %limit"`），
//!   这里只按字符串携带。

use serde::{Deserialize, Serialize};

use crate::expr::Expr;

/* ---------- 模块 / 函数 ---------- */

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub functions: Vec<Function>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    #[serde(default)]
    pub params: Vec<Param>,
    /// 基本块按布局顺序排列
    pub blocks: Vec<BasicBlock>,
    /// 无调试信息时为 None（分析前置条件不满足）
    #[serde(default)]
    pub debug: Option<FunctionDebugInfo>,
    /// 宿主证明了循环不变闭式 trip count 的循环（按 header 块名索引）
    #[serde(default)]
    pub trip_counts: Vec<LoopTripCount>,
    /// 宿主分支概率估计，按控制边给出（仅测量模式使用）
    #[serde(default)]
    pub edge_weights: Vec<EdgeWeight>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Param {
    pub name: String,
    pub ty: String,
}

impl Function {
    /// 按名字查块的布局下标
    pub fn block_index(&self, name: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.name == name)
    }

    pub fn trip_count_for(&self, header: &str) -> Option<&Expr> {
        self.trip_counts
            .iter()
            .find(|tc| tc.header == header)
            .map(|tc| &tc.count)
    }

    pub fn edge_weight(&self, from: &str, to: &str) -> Option<&EdgeWeight> {
        self.edge_weights
            .iter()
            .find(|w| w.from == from && w.to == to)
    }
}

/* ---------- 基本块 / 指令 ---------- */

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BasicBlock {
    pub name: String,
    #[serde(default)]
    pub insts: Vec<Instruction>,
    /// 不可达的收尾块可能没有 terminator
    #[serde(default)]
    pub term: Option<Terminator>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub opcode: String,
    #[serde(default)]
    pub kind: InstKind,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum InstKind {
    #[default]
    Plain,
    Call {
        callee: String,
        #[serde(default)]
        args: Vec<CallArg>,
        /// assume / lifetime / dbg 等注解类 intrinsic，无运行期语义
        #[serde(default)]
        assume_like: bool,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CallArg {
    pub name: String,
    pub ty: String,
}

/* ---------- Terminator ---------- */

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Terminator {
    pub opcode: String,
    pub kind: TerminatorKind,
    #[serde(default)]
    pub loc: Option<SourceLoc>,
}

/// 后继结构的封闭枚举（代替对指令类型的运行时判别）
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum TerminatorKind {
    /// ret / unreachable：无后继
    Return,
    Unconditional { target: String },
    Conditional { on_true: String, on_false: String },
    /// switch / indirectbr 等多路分支
    MultiWay { targets: Vec<String> },
}

impl Terminator {
    /// 后继块名，按 terminator 自带顺序（条件分支先 true 后 false）
    pub fn successors(&self) -> Vec<&str> {
        match &self.kind {
            TerminatorKind::Return => Vec::new(),
            TerminatorKind::Unconditional { target } => vec![target.as_str()],
            TerminatorKind::Conditional { on_true, on_false } => {
                vec![on_true.as_str(), on_false.as_str()]
            }
            TerminatorKind::MultiWay { targets } => {
                targets.iter().map(|t| t.as_str()).collect()
            }
        }
    }
}

/// 宿主记录的源位置；0 表示未知（入结果树时归一化为 None）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLoc {
    pub line: u32,
    pub column: u32,
}

/* ---------- 调试元数据 ---------- */

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FunctionDebugInfo {
    pub compile_units: Vec<CompileUnit>,
    #[serde(default)]
    pub locals: Vec<LocalVariableDebug>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CompileUnit {
    pub file: String,
    #[serde(default)]
    pub checksum: Option<String>,
}

/// 一个源码局部变量声明，以及实现它的 IR 值绑定。
/// 全局变量不在此列：函数级快照拿不到模块级元数据。
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LocalVariableDebug {
    pub name: String,
    pub line: u32,
    #[serde(default)]
    pub bindings: Vec<DebugBinding>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DebugBinding {
    /// 宿主渲染的带类型值标识，如 `"i32 %limit"` 或 `"%add"`
    pub value: String,
    /// false 表示元数据被非调试绑定指令使用 —— 约定被破坏
    #[serde(default = "default_true")]
    pub intrinsic: bool,
}

fn default_true() -> bool {
    true
}

/* ---------- trip count / 分支概率 ---------- */

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoopTripCount {
    /// 循环 header 块名
    pub header: String,
    pub count: Expr,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeWeight {
    pub from: String,
    pub to: String,
    pub numerator: u32,
    pub denominator: u32,
}
