//! IO helper: safe file read/write

use std::{fs::File, path::Path};

use crate::model::data_core::AppError;
use serde_json::Value;

/// 读取原始文本（容错解析器需要未经解析的原文，不能用 from_reader）
pub fn read_text_file(p: &Path) -> Result<String, AppError> {
    let text = std::fs::read_to_string(p)?;
    Ok(text)
}

/// 将JSON数据保存到文件（格式化输出）
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), AppError> {
    let f = File::create(p)?;
    serde_json::to_writer_pretty(f, value)?;
    Ok(())
}
