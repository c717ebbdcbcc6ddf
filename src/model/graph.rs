//! 图谱变换器：把解析后的JSON值树转成带坐标的节点/边集合
//!
//! 前序深度优先遍历，节点编号每次生成都从1重新开始，
//! 同一输入重复生成的结果逐位一致，便于确定性测试。

use serde::Serialize;
use serde_json::Value;

/// 每层的水平间距
pub const NODE_X_GAP: f32 = 220.0;
/// 同一父节点下相邻兄弟的垂直间距
pub const NODE_Y_GAP: f32 = 120.0;
/// 根节点的路径哨兵
pub const ROOT_PATH: &str = "$";
/// 根节点的固定显示标签
pub const ROOT_LABEL: &str = "root";

/// 节点类型（供渲染端与小地图按类型着色）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NodeKind {
    Object,
    Array,
    Primitive,
}

/// 图谱节点：每个JSON值对应一个，id仅在同一代内可比较
#[derive(Debug, Clone, Serialize)]
pub struct GraphNode {
    pub id: u32,
    /// 路径表达式：根为 `$`，对象成员追加 `.key`，数组元素追加 `[idx]`
    pub path: String,
    pub value: Value,
    pub kind: NodeKind,
    pub label: String,
    pub x: f32,
    pub y: f32,
}

/// 父→子关系边，根节点没有入边
#[derive(Debug, Clone, Serialize)]
pub struct GraphEdge {
    pub id: String,
    pub source: u32,
    pub target: u32,
}

/// 一代图谱：一次生成产出的节点/边集合，整体替换、不做增量修补
#[derive(Debug, Clone, Default, Serialize)]
pub struct JsonGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

/// 从根值构建一代图谱，对任意合法的 `Value` 都不会失败
pub fn build_graph(root: &Value) -> JsonGraph {
    let mut graph = JsonGraph {
        nodes: Vec::with_capacity(64),
        edges: Vec::new(),
    };
    let mut next_id: u32 = 1;
    walk(
        &mut graph,
        &mut next_id,
        root,
        ROOT_PATH.to_string(),
        ROOT_LABEL,
        None,
        0,
        0.0,
    );
    graph
}

fn kind_of(v: &Value) -> NodeKind {
    match v {
        Value::Object(_) => NodeKind::Object,
        Value::Array(_) => NodeKind::Array,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => NodeKind::Primitive,
    }
}

/// 容器节点显示最后一段路径，叶子节点显示 `段名: 值文本`
fn label_of(v: &Value, segment: &str) -> String {
    match v {
        Value::Object(_) | Value::Array(_) => segment.to_string(),
        Value::String(s) => format!("{}: {}", segment, s),
        Value::Number(n) => format!("{}: {}", segment, n),
        Value::Bool(b) => format!("{}: {}", segment, b),
        Value::Null => format!("{}: null", segment),
    }
}

/// 布局规则：`x = depth * 220`；父节点把自己的 y 传给第一个子节点，
/// 之后每个兄弟 +120，按遍历顺序分配。不做跨子树的碰撞回避。
#[allow(clippy::too_many_arguments)]
fn walk(
    graph: &mut JsonGraph,
    next_id: &mut u32,
    v: &Value,
    path: String,
    segment: &str,
    parent: Option<u32>,
    depth: u32,
    y: f32,
) {
    let id = *next_id;
    *next_id += 1;

    graph.nodes.push(GraphNode {
        id,
        path: path.clone(),
        value: v.clone(),
        kind: kind_of(v),
        label: label_of(v, segment),
        x: depth as f32 * NODE_X_GAP,
        y,
    });
    if let Some(parent_id) = parent {
        graph.edges.push(GraphEdge {
            id: format!("e{}-{}", parent_id, id),
            source: parent_id,
            target: id,
        });
    }

    let mut child_y = y;
    match v {
        Value::Object(map) => {
            for (key, child) in map {
                let child_path = format!("{}.{}", path, key);
                walk(graph, next_id, child, child_path, key, Some(id), depth + 1, child_y);
                child_y += NODE_Y_GAP;
            }
        }
        Value::Array(arr) => {
            for (idx, child) in arr.iter().enumerate() {
                let segment = idx.to_string();
                let child_path = format!("{}[{}]", path, idx);
                walk(graph, next_id, child, child_path, &segment, Some(id), depth + 1, child_y);
                child_y += NODE_Y_GAP;
            }
        }
        _ => {}
    }
}
