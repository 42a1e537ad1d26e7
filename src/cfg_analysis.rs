//! cfg_analysis.rs  –– 静态 CFG 分析工具集
//! 1. 直接支配树
//! 2. 回边 + 自然循环
//! 3. 循环嵌套层级（宿主 LoopInfo 的对应物）

use std::collections::{BTreeMap, BTreeSet};

use petgraph::{algo::dominators::simple_fast, graph::NodeIndex, Direction};

use crate::cfg::Cfg;

/// 单个自然循环。`blocks` 含子循环的全部节点（与宿主 Loop::getBlocks 一致），
/// 访问去重交给上层的 visited 集合。
#[derive(Debug, Clone)]
pub struct NaturalLoop {
    pub header: NodeIndex,
    pub blocks: BTreeSet<NodeIndex>,
    /// 直接子循环（`LoopNest::loops` 下标），按 header 布局序
    pub sub_loops: Vec<usize>,
    pub parent: Option<usize>,
}

impl NaturalLoop {
    pub fn is_innermost(&self) -> bool {
        self.sub_loops.is_empty()
    }
}

/// 综合分析结果
#[derive(Debug, Clone)]
pub struct LoopNest {
    pub loops: Vec<NaturalLoop>,
    /// 顶层循环（无父循环），按 header 布局序
    pub top_level: Vec<usize>,
}

impl LoopNest {
    pub fn compute(cfg: &Cfg) -> Self {
        // 空 CFG（纯声明函数）：无入口可做支配分析
        if cfg.node_count() == 0 {
            return Self { loops: Vec::new(), top_level: Vec::new() };
        }
        let idom = compute_idom(cfg);
        let bodies = collect_loop_bodies(cfg, &idom);
        Self::build_hierarchy(bodies)
    }

    /// 嵌套关系：body 包含即为祖先，最小真超集为直接父循环
    fn build_hierarchy(bodies: BTreeMap<NodeIndex, BTreeSet<NodeIndex>>) -> Self {
        let mut loops: Vec<NaturalLoop> = bodies
            .into_iter()
            .map(|(header, blocks)| NaturalLoop {
                header,
                blocks,
                sub_loops: Vec::new(),
                parent: None,
            })
            .collect();

        for i in 0..loops.len() {
            let mut parent: Option<usize> = None;
            for j in 0..loops.len() {
                if i == j || !loops[j].blocks.is_superset(&loops[i].blocks) {
                    continue;
                }
                // header 不同则超集必为真超集
                match parent {
                    Some(p) if loops[p].blocks.len() <= loops[j].blocks.len() => {}
                    _ => parent = Some(j),
                }
            }
            loops[i].parent = parent;
        }

        for i in 0..loops.len() {
            if let Some(p) = loops[i].parent {
                loops[p].sub_loops.push(i);
            }
        }
        // loops 本身按 header 升序构造，子循环列表随之有序

        let top_level = (0..loops.len())
            .filter(|&i| loops[i].parent.is_none())
            .collect();
        Self { loops, top_level }
    }
}

/* ---------- 基本算法 ---------- */

fn compute_idom(cfg: &Cfg) -> BTreeMap<NodeIndex, NodeIndex> {
    let entry = NodeIndex::new(0);
    let doms = simple_fast(cfg, entry);
    let mut out = BTreeMap::new();
    for n in cfg.node_indices() {
        if let Some(i) = doms.immediate_dominator(n) {
            out.insert(n, i);
        }
    }
    out
}

/// y dom x ?（含 x == y）
fn dominates(idom: &BTreeMap<NodeIndex, NodeIndex>, y: NodeIndex, mut x: NodeIndex) -> bool {
    if x == y {
        return true;
    }
    while let Some(&p) = idom.get(&x) {
        if p == y {
            return true;
        }
        if p == x {
            break;
        }
        x = p;
    }
    false
}

/* ---------- 回边 & 循环体 ---------- */

/// 回边 (tail, head)：head dom tail。同一 header 的多条回边合并为一个循环。
fn collect_loop_bodies(
    cfg: &Cfg,
    idom: &BTreeMap<NodeIndex, NodeIndex>,
) -> BTreeMap<NodeIndex, BTreeSet<NodeIndex>> {
    let mut bodies: BTreeMap<NodeIndex, BTreeSet<NodeIndex>> = BTreeMap::new();

    for tail in cfg.node_indices() {
        for head in cfg.neighbors_directed(tail, Direction::Outgoing) {
            if !dominates(idom, head, tail) {
                continue;
            }
            // (tail, head) is a back-edge
            let body = bodies.entry(head).or_default();
            body.insert(head);
            body.insert(tail);

            // 经典算法：从 tail 沿逆 CFG 收集，直到 head
            let mut work = vec![tail];
            while let Some(n) = work.pop() {
                if n == head {
                    continue;
                }
                for pred in cfg.neighbors_directed(n, Direction::Incoming) {
                    if body.insert(pred) {
                        work.push(pred);
                    }
                }
            }
        }
    }
    bodies
}
