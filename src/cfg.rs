//! 由函数快照的 terminator 构建控制流图 (CFG)
//! * 仅面向单函数。
//! * 使用 petgraph::Graph 表示 CFG，节点权重为块的布局下标。

use petgraph::graph::{Graph, NodeIndex};

use crate::error::AnalysisError;
use crate::ir::{Function, TerminatorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Uncond,
    CondTrue,
    CondFalse,
    Switch,
}

pub type Cfg = Graph<usize, EdgeKind>;

/// 布局下标 → 节点。节点按布局顺序加入，两者一一对应。
pub fn node_of(block_idx: usize) -> NodeIndex {
    NodeIndex::new(block_idx)
}

pub fn build_cfg(func: &Function) -> Result<Cfg, AnalysisError> {
    let mut g: Cfg = Graph::new();
    for (i, _) in func.blocks.iter().enumerate() {
        g.add_node(i);
    }

    let resolve = |from: &str, target: &str| {
        func.block_index(target)
            .map(node_of)
            .ok_or_else(|| AnalysisError::UnknownBlock {
                from: from.to_string(),
                target: target.to_string(),
            })
    };

    // -- edges --
    for (i, block) in func.blocks.iter().enumerate() {
        let Some(term) = &block.term else { continue };
        let src = node_of(i);
        match &term.kind {
            TerminatorKind::Return => {}
            TerminatorKind::Unconditional { target } => {
                let t = resolve(&block.name, target)?;
                g.update_edge(src, t, EdgeKind::Uncond);
            }
            TerminatorKind::Conditional { on_true, on_false } => {
                let t = resolve(&block.name, on_true)?;
                let f = resolve(&block.name, on_false)?;
                g.update_edge(src, t, EdgeKind::CondTrue);
                g.update_edge(src, f, EdgeKind::CondFalse);
            }
            TerminatorKind::MultiWay { targets } => {
                for target in targets {
                    let t = resolve(&block.name, target)?;
                    g.update_edge(src, t, EdgeKind::Switch);
                }
            }
        }
    }
    Ok(g)
}
