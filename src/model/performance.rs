//! 性能基准测试模块
//!
//! 用于测试大文档的解析、修复扫描与图谱构建性能

use serde_json::{json, Value};
use std::time::Instant;

use crate::model::graph::build_graph;
use crate::model::parser;

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

/// 生成大型测试JSON数据
pub fn generate_large_json(depth: usize, width: usize) -> Value {
    fn create_nested_object(current_depth: usize, max_depth: usize, width: usize) -> Value {
        if current_depth >= max_depth {
            return json!("叶子节点值");
        }

        let mut obj = serde_json::Map::new();
        for i in 0..width {
            let key = format!("field_{}", i);
            let value = match i % 5 {
                0 => json!(format!("字符串值_{}", i)),
                1 => json!(i as i64),
                2 => json!(i % 2 == 0),
                3 => json!([1, 2, 3, i]),
                4 => create_nested_object(current_depth + 1, max_depth, width / 2),
                _ => json!(null),
            };
            obj.insert(key, value);
        }
        Value::Object(obj)
    }

    let mut root = serde_json::Map::new();
    root.insert(
        "metadata".to_string(),
        json!({
            "depth": depth,
            "width": width,
            "description": "性能测试用大型JSON文档"
        }),
    );
    root.insert("data".to_string(), create_nested_object(0, depth, width));

    let large_array: Vec<Value> = (0..width * 10)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("项目_{}", i),
                "value": i * 2,
                "active": i % 3 == 0
            })
        })
        .collect();
    root.insert("items".to_string(), json!(large_array));

    Value::Object(root)
}

/// 测试容错解析性能（含严格解析快路径）
pub fn benchmark_parse(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let result = parser::parse(json_str);
    let duration = start.elapsed();

    match result {
        Ok(outcome) => PerformanceResult::new(
            "容错解析",
            duration.as_millis(),
            true,
            &format!(
                "解析了 {} 字节, 修复={}",
                json_str.len(),
                outcome.was_sanitized
            ),
        ),
        Err(e) => PerformanceResult::new(
            "容错解析",
            duration.as_millis(),
            false,
            &format!("解析失败: {}", e),
        ),
    }
}

/// 测试修复扫描性能（对合法文本应为恒等变换）
pub fn benchmark_sanitize(json_str: &str) -> PerformanceResult {
    let start = Instant::now();
    let rewritten = parser::sanitize(json_str);
    let duration = start.elapsed();

    PerformanceResult::new(
        "修复扫描",
        duration.as_millis(),
        true,
        &format!(
            "扫描了 {} 字节, 改写={}",
            json_str.len(),
            rewritten != json_str
        ),
    )
}

/// 测试图谱构建性能
pub fn benchmark_graph_build(json_data: &Value) -> PerformanceResult {
    let start = Instant::now();
    let graph = build_graph(json_data);
    let duration = start.elapsed();

    let success = !graph.nodes.is_empty();
    let details = format!("构建了 {} 个节点, {} 条边", graph.nodes.len(), graph.edges.len());
    PerformanceResult::new("图谱构建", duration.as_millis(), success, &details)
}

/// 运行综合性能测试
pub fn run_performance_suite() -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    // 测试不同规模的数据
    let test_cases = [
        (3, 10), // 小型：深度3，宽度10
        (4, 20), // 中型：深度4，宽度20
        (5, 30), // 大型：深度5，宽度30
    ];

    for (depth, width) in test_cases {
        let start = Instant::now();
        let json_data = generate_large_json(depth, width);
        let generation_time = start.elapsed();

        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", depth, width),
            generation_time.as_millis(),
            true,
            &format!("生成了深度{}宽度{}的JSON", depth, width),
        ));

        let json_str = match serde_json::to_string(&json_data) {
            Ok(s) => s,
            Err(e) => {
                results.push(PerformanceResult::new(
                    &format!("JSON序列化({}x{})", depth, width),
                    0,
                    false,
                    &format!("序列化失败: {}", e),
                ));
                continue;
            }
        };

        results.push(benchmark_parse(&json_str));
        results.push(benchmark_sanitize(&json_str));
        results.push(benchmark_graph_build(&json_data));
    }

    results
}
