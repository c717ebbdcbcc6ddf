//! 路径匹配器：查询串归一化 + 按路径后缀定位节点
//!
//! 匹配是后缀式而非全路径锚定的，短查询可以命中树中任意深度的出现；
//! 按节点当前存储顺序扫描，取第一个命中者。未命中是正常返回值。

use crate::model::graph::GraphNode;

/// 归一化查询串：去除首尾空白，至多剥掉一个前导 `$`、再至多一个前导 `.`
///
/// 空白查询返回 None，表示不执行搜索。
pub fn normalize_query(query: &str) -> Option<String> {
    let trimmed = query.trim();
    if trimmed.is_empty() {
        return None;
    }
    let stripped = trimmed.strip_prefix('$').unwrap_or(trimmed);
    let stripped = stripped.strip_prefix('.').unwrap_or(stripped);
    Some(stripped.to_string())
}

/// 在节点列表中查找第一个路径后缀命中的节点
///
/// 命中条件：路径以归一化后缀结尾，或恰好等于 `$.后缀`。
pub fn search<'a>(nodes: &'a [GraphNode], query: &str) -> Option<&'a GraphNode> {
    let suffix = normalize_query(query)?;
    let anchored = format!("$.{}", suffix);
    nodes
        .iter()
        .find(|node| node.path.ends_with(&suffix) || node.path == anchored)
}
