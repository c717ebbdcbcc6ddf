//! AppState：应用核心状态，持有当前一代图谱并串联解析/生成/搜索

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::model::graph::{build_graph, JsonGraph};
use crate::model::parser;
use crate::model::search;
use crate::utils::fs::{read_text_file, write_json_file};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    /// 携带的是最初严格解析的诊断信息，不是修复尝试的二次错误
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("状态错误: {0}")]
    State(String),
}

/// 视口聚焦指令：由外部渲染端执行，居中不可用时退化为整图适配
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FocusInstruction {
    CenterOn { x: f32, y: f32 },
    FitAll,
}

/// 搜索结果：未命中是信息性结果而非错误
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Match {
        id: u32,
        path: String,
        focus: FocusInstruction,
    },
    NotFound,
}

/// 应用核心状态
///
/// `graph` 是当前一代节点/边集合，只在一次生成完整成功后整体替换；
/// 失败时上一代保持原样不动。`highlighted` 是渲染属性，与图结构分离。
#[derive(Debug, Default)]
pub struct AppState {
    pub source_path: Option<PathBuf>,
    pub raw_text: Option<String>,
    pub dom: Option<Value>,
    pub graph: JsonGraph,
    /// 最近一次修复产生的重写文本，供调用方选择采纳
    pub sanitized_text: Option<String>,
    /// 当前高亮的节点id（至多一个）
    pub highlighted: Option<u32>,
}

impl AppState {
    /// 加载JSON文件并生成图谱，返回是否应用过启发式修复
    pub fn load_file(&mut self, p: &Path) -> Result<bool, AppError> {
        let text = read_text_file(p)?;
        let was_sanitized = self.generate(&text)?;
        self.source_path = Some(p.to_path_buf());
        Ok(was_sanitized)
    }

    /// 从文本重新生成一代图谱
    ///
    /// 成功时整体替换节点/边集合并重置高亮；解析失败时当前图保持不变，
    /// 由调用方决定是否清空展示。返回值指示本次解析是否经过修复
    /// （告知性，调用方可据此提示用户）。
    pub fn generate(&mut self, text: &str) -> Result<bool, AppError> {
        let outcome = parser::parse(text)?;
        let graph = build_graph(&outcome.value);
        tracing::info!(
            "图谱已生成: {} 个节点, {} 条边, 修复={}",
            graph.nodes.len(),
            graph.edges.len(),
            outcome.was_sanitized
        );

        self.raw_text = Some(text.to_string());
        self.dom = Some(outcome.value);
        self.sanitized_text = outcome.sanitized_text;
        self.graph = graph;
        self.highlighted = None;
        Ok(outcome.was_sanitized)
    }

    /// 采纳最近一次修复产生的文本作为当前原文
    pub fn adopt_sanitized_text(&mut self) -> Result<(), AppError> {
        let text = self
            .sanitized_text
            .take()
            .ok_or_else(|| AppError::State("没有可采纳的修复文本".into()))?;
        self.raw_text = Some(text);
        Ok(())
    }

    /// 按路径后缀搜索当前图谱
    ///
    /// 命中时把高亮替换为恰好这一个节点并给出居中指令；
    /// 未命中不改动图谱，也不清除已有高亮。
    pub fn search(&mut self, query: &str) -> SearchOutcome {
        match search::search(&self.graph.nodes, query) {
            Some(node) => {
                self.highlighted = Some(node.id);
                SearchOutcome::Match {
                    id: node.id,
                    path: node.path.clone(),
                    focus: FocusInstruction::CenterOn {
                        x: node.x,
                        y: node.y,
                    },
                }
            }
            None => {
                tracing::warn!("未命中任何节点，查询: {}", query);
                SearchOutcome::NotFound
            }
        }
    }

    /// 将当前DOM格式化保存到指定路径
    pub fn save_to_file(&self, path: &Path) -> Result<(), AppError> {
        let dom = self
            .dom
            .as_ref()
            .ok_or_else(|| AppError::State("DOM尚未加载".into()))?;
        write_json_file(path, dom)?;
        Ok(())
    }
}
