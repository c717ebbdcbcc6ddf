//! 程序入口：初始化日志、加载JSON文件、生成图谱并按需搜索
//!
//! 这里把节点/边表打印到标准输出，充当外部渲染端的替身。

use std::path::Path;
use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::fmt::SubscriberBuilder;

use json_tupu::{AppState, FocusInstruction, SearchOutcome};

fn main() -> ExitCode {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .try_init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("错误: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let Some(file) = args.next() else {
        anyhow::bail!("用法: json_tupu <JSON文件> [路径查询]");
    };
    let query = args.next();

    let mut state = AppState::default();
    let was_sanitized = state
        .load_file(Path::new(&file))
        .with_context(|| format!("无法加载 {}", file))?;
    if was_sanitized {
        // 告知性提示：解析成功，但经过了启发式修复
        println!("注意: 输入经过启发式修复（有损，重复键只保留最后一个值）");
        if let Some(text) = &state.sanitized_text {
            println!("修复后文本: {}", text);
        }
    }

    println!(
        "节点 {} 个，边 {} 条",
        state.graph.nodes.len(),
        state.graph.edges.len()
    );
    for node in &state.graph.nodes {
        println!(
            "#{:<4} {:<9} ({:>6}, {:>6}) {:<30} {}",
            node.id,
            format!("{:?}", node.kind),
            node.x,
            node.y,
            node.path,
            node.label
        );
    }
    for edge in &state.graph.edges {
        println!("  {} : {} -> {}", edge.id, edge.source, edge.target);
    }

    if let Some(q) = query {
        match state.search(&q) {
            SearchOutcome::Match { id, path, focus } => {
                println!("命中节点 #{}: {}", id, path);
                match focus {
                    FocusInstruction::CenterOn { x, y } => {
                        println!("视口居中到 ({}, {})", x, y)
                    }
                    FocusInstruction::FitAll => println!("视口适配整图"),
                }
            }
            SearchOutcome::NotFound => println!("未命中: {}", q),
        }
    }

    Ok(())
}
