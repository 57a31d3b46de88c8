//! 项目文件（luma.json）
//!
//! CLI 特有的配置：入口脚本、脚本根目录、桥配置、日志设置和宿主变量

use crate::logging::LogFormat;
use luma_config::{BridgeConfig, LogLevel, VarRegistry};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// luma.json 结构
#[derive(Debug, Deserialize)]
pub struct ProjectFile {
    /// 入口脚本（相对脚本根目录）
    pub entry: String,
    /// 项目名，脚本里通过 `project_name()` 读取
    #[serde(default)]
    pub name: Option<String>,
    /// 脚本根目录（相对项目文件所在目录）
    #[serde(default = "default_root")]
    pub root: String,
    /// 脚本桥配置
    #[serde(default)]
    pub bridge: BridgeConfig,
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default)]
    pub log_format: LogFormat,
    /// 宿主变量覆盖，例如 `script_debugger_addr`
    #[serde(default)]
    pub vars: BTreeMap<String, String>,
}

fn default_root() -> String {
    ".".to_string()
}

impl ProjectFile {
    /// 读取并解析项目文件
    pub fn read(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Err(format!(
                "未找到 '{}'\n\n当前目录不是一个 Luma 项目。\n提示: 创建 '{}' 文件并指定 'entry' 字段",
                path.display(),
                path.display()
            ));
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("无法读取 '{}': {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("解析 '{}' 失败: {}", path.display(), e))
    }

    /// 解析项目文件内容
    pub fn parse(content: &str) -> Result<Self, String> {
        let project: ProjectFile = serde_json::from_str(content).map_err(|e| e.to_string())?;
        if project.entry.is_empty() {
            return Err("'entry' 字段不能为空".to_string());
        }
        project.bridge.validate().map_err(|e| e.to_string())?;
        Ok(project)
    }

    /// 脚本根目录：相对项目文件所在目录解析
    pub fn script_root(&self, project_path: &Path) -> PathBuf {
        let base_dir = project_path.parent().unwrap_or(Path::new("."));
        base_dir.join(&self.root)
    }

    /// 项目名，缺省时取根目录名
    pub fn display_name(&self, project_path: &Path) -> String {
        if let Some(name) = &self.name {
            return name.clone();
        }
        self.script_root(project_path)
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "luma".to_string())
    }

    /// 构建宿主变量表并应用覆盖
    pub fn var_registry(&self) -> Result<VarRegistry, String> {
        let vars = VarRegistry::with_bridge_vars();
        for (name, value) in &self.vars {
            vars.set(name, value.as_str()).map_err(|e| e.to_string())?;
        }
        Ok(vars)
    }
}
