//! JSON图谱工具库
//!
//! 把任意JSON类文本转成可导航的节点/边图谱：
//! 容错解析（含一次有界的启发式修复）、确定性的图谱生成、
//! 以及按路径后缀定位节点的搜索。渲染由外部协作方完成。

pub mod model;
pub mod utils;

// 重新导出主要类型
pub use model::data_core::{AppError, AppState, FocusInstruction, SearchOutcome};
pub use model::graph::{build_graph, GraphEdge, GraphNode, JsonGraph, NodeKind};
pub use model::parser::{parse, sanitize, ParseOutcome};
pub use model::search::{normalize_query, search};
