//! 复杂度剖析主流程：循环嵌套递归遍历 + 基本块访问 + 结果树装配
//! 访问顺序保证每个块只进结果树一次：
//! 1. 顶层循环按嵌套序递归（子循环先于本层块）
//! 2. 函数内剩余自由块按布局序补齐

use std::collections::BTreeSet;

use crate::cfg::build_cfg;
use crate::cfg_analysis::LoopNest;
use crate::debug_info::CorrelationTable;
use crate::debug_log;
use crate::decompose::decompose;
use crate::error::AnalysisError;
use crate::ir::{Function, InstKind, Module};
use crate::profile::{
    ArgumentInfo, BlockPart, CallSiteInfo, DebugLocation, FunctionPart, FunctionProfile,
    LoopPart, Part, PartId, UNDEF_VALUE,
};

/// 分支概率模式，每次分析选定一次（不读任何全局状态）
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// true：使用宿主测得的边概率；false（缺省）：引入符号概率变量
    pub use_branch_probability: bool,
}

/// 分析单个函数，返回结果树。
/// 调试元数据违约使整个函数失败，不产出部分结果。
pub fn analyze_function(
    func: &Function,
    config: AnalysisConfig,
) -> Result<FunctionProfile, AnalysisError> {
    let cfg = build_cfg(func)?;
    let nest = LoopNest::compute(&cfg);
    let table = CorrelationTable::build(func)?;

    let analysis = ProgramComplexity {
        func,
        table,
        config,
        visited: BTreeSet::new(),
        parts: Vec::new(),
    };
    Ok(analysis.run(&nest))
}

/// 逐函数分析整个模块。单个函数的失败不影响其余函数。
pub fn analyze_module(
    module: &Module,
    config: AnalysisConfig,
) -> Vec<(String, Result<FunctionProfile, AnalysisError>)> {
    module
        .functions
        .iter()
        .map(|f| (f.name.clone(), analyze_function(f, config)))
        .collect()
}

struct ProgramComplexity<'a> {
    func: &'a Function,
    table: CorrelationTable,
    config: AnalysisConfig,
    /// 已入树的块（布局下标），块访问的最后一步写入
    visited: BTreeSet<usize>,
    parts: Vec<Part>,
}

impl<'a> ProgramComplexity<'a> {
    fn run(mut self, nest: &LoopNest) -> FunctionProfile {
        let func = self.func;
        debug_log!("FUNCTION: {}", func.name);

        let mut children = Vec::new();

        // 循环及其块
        for &li in &nest.top_level {
            children.push(self.handle_loop(nest, li));
        }

        // 自由块（未被任何循环认领）
        for i in 0..func.blocks.len() {
            if self.visited.contains(&i) {
                continue;
            }
            children.push(self.handle_block(i));
        }
        debug_assert_eq!(self.visited.len(), func.blocks.len());

        let arguments = func
            .params
            .iter()
            .map(|p| ArgumentInfo {
                name: p.name.clone(),
                ty: p.ty.clone(),
            })
            .collect();

        let root = self.alloc(Part::Function(FunctionPart {
            name: func.name.clone(),
            arguments,
            children,
        }));
        FunctionProfile::new(self.parts, root)
    }

    /* ---------- 循环 ---------- */

    fn handle_loop(&mut self, nest: &LoopNest, li: usize) -> PartId {
        let func = self.func;
        let lp = &nest.loops[li];
        let header_name = func.blocks[lp.header.index()].name.clone();
        debug_log!("handling loop: {}", header_name);

        let mut children = Vec::new();

        // 先递归子循环，避免外层循环重复认领嵌套块
        if !lp.is_innermost() {
            for &sub in &lp.sub_loops {
                children.push(self.handle_loop(nest, sub));
            }
        }

        let (iterations, iterations_debug_info) = match func.trip_count_for(&header_name) {
            Some(expr) => {
                debug_log!("loop iteration count: {}", expr);
                (expr.to_string(), decompose(expr, &self.table))
            }
            None => {
                // 无循环不变闭式是正常结果，不是错误
                debug_log!("loop iteration count: undef");
                (UNDEF_VALUE.to_string(), Vec::new())
            }
        };

        // 本循环的块（含子循环块，靠 visited 去重），按布局序
        for &n in &lp.blocks {
            let bi = n.index();
            if self.visited.contains(&bi) {
                continue;
            }
            children.push(self.handle_block(bi));
        }

        self.alloc(Part::Loop(LoopPart {
            name: header_name,
            iterations,
            iterations_debug_info,
            children,
        }))
    }

    /* ---------- 基本块 ---------- */

    fn handle_block(&mut self, bi: usize) -> PartId {
        let func = self.func;
        let block = &func.blocks[bi];
        debug_log!("handling bb: {}", block.name);

        let mut instructions = std::collections::BTreeMap::new();
        let mut calls = Vec::new();
        for inst in &block.insts {
            match &inst.kind {
                InstKind::Call {
                    callee,
                    args,
                    assume_like,
                } => {
                    // 注解类 intrinsic 无运行期开销，整条忽略
                    if *assume_like {
                        continue;
                    }
                    calls.push(CallSiteInfo {
                        callee: callee.clone(),
                        args: args
                            .iter()
                            .map(|a| ArgumentInfo {
                                name: a.name.clone(),
                                ty: a.ty.clone(),
                            })
                            .collect(),
                    });
                }
                InstKind::Plain => {
                    *instructions.entry(inst.opcode.clone()).or_insert(0) += 1;
                }
            }
        }

        let mut successors = std::collections::BTreeMap::new();
        let mut terminator_location = DebugLocation::default();
        if let Some(term) = &block.term {
            // terminator 本身也计入直方图
            *instructions.entry(term.opcode.clone()).or_insert(0) += 1;

            let succs = term.successors();
            if succs.len() == 1 {
                // 单后继必达，两种模式下都记 "1"
                successors.insert(succs[0].to_string(), "1".to_string());
            } else if self.config.use_branch_probability {
                for s in &succs {
                    let prob = match func.edge_weight(&block.name, s) {
                        Some(w) if w.denominator != 0 => {
                            f64::from(w.numerator) / f64::from(w.denominator)
                        }
                        // 快照缺边或分母为 0 时退回宿主估计器的均分缺省
                        _ => 1.0 / succs.len() as f64,
                    };
                    successors.insert((*s).to_string(), format!("{:.6}", prob));
                }
            } else {
                match succs.as_slice() {
                    [first, second] => {
                        // 两后继：第一个记 x，第二个记 (1 - x)，代数上恒和为 1
                        let var =
                            format!("BranchProbability_{}_{}", block.name, first);
                        successors.insert((*first).to_string(), var.clone());
                        successors
                            .insert((*second).to_string(), format!("(1 - {})", var));
                    }
                    _ => {
                        // 0 或 ≥3 个后继：各自独立的符号概率变量
                        for s in &succs {
                            successors.insert(
                                (*s).to_string(),
                                format!("BranchProbability_{}_{}", block.name, s),
                            );
                        }
                    }
                }
            }

            if let Some(loc) = &term.loc {
                terminator_location = DebugLocation::from_raw(loc.line, loc.column);
            }
        }

        // 最后一步：标记已访问
        self.visited.insert(bi);

        self.alloc(Part::Block(BlockPart {
            name: block.name.clone(),
            instructions,
            calls,
            successors,
            terminator_location,
        }))
    }

    fn alloc(&mut self, part: Part) -> PartId {
        self.parts.push(part);
        PartId(self.parts.len() - 1)
    }
}
