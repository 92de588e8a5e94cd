//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::env::EnvResult;
use crate::overlay::error::{OverlayError, OverlayResult};

/// 整页翻译范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslateRange {
    /// 只翻译正文，跳过导航、页眉页脚等
    #[default]
    Main,
    /// 翻译全部内容，包括 shadow root
    All,
}

impl FromStr for TranslateRange {
    type Err = OverlayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "main" => Ok(TranslateRange::Main),
            "all" => Ok(TranslateRange::All),
            other => Err(OverlayError::ConfigError(format!("未知的翻译范围: {}", other))),
        }
    }
}

/// 覆盖层配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub range: TranslateRange,

    // 标签分类
    pub shallow_block_tags: Vec<String>,
    pub shallow_inline_tags: Vec<String>,
    pub force_inline_tags: Vec<String>,
    pub ignore_tags: Vec<String>,
    pub dont_walk_into_tags: Vec<String>,
    pub main_content_ignore_tags: Vec<String>,

    /// 整页翻译遇到已有译文时，即使原文未变也重新请求
    pub refresh_unchanged: bool,
}

fn to_owned_tags(tags: &[&str]) -> Vec<String> {
    tags.iter().map(|tag| tag.to_string()).collect()
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            range: TranslateRange::default(),
            shallow_block_tags: to_owned_tags(constants::SHALLOW_BLOCK_TAGS),
            shallow_inline_tags: to_owned_tags(constants::SHALLOW_INLINE_TAGS),
            force_inline_tags: to_owned_tags(constants::FORCE_INLINE_TAGS),
            ignore_tags: to_owned_tags(constants::IGNORE_TAGS),
            dont_walk_into_tags: to_owned_tags(constants::DONT_WALK_INTO_TAGS),
            main_content_ignore_tags: to_owned_tags(constants::MAIN_CONTENT_IGNORE_TAGS),
            refresh_unchanged: true,
        }
    }
}

impl OverlayConfig {
    /// 创建指定翻译范围的默认配置
    pub fn with_range(range: TranslateRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    /// 从TOML文本解析
    pub fn from_toml_str(content: &str) -> OverlayResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 验证配置
    pub fn validate(&self) -> OverlayResult<()> {
        if self.shallow_block_tags.is_empty() {
            return Err(OverlayError::ConfigError("块级标签列表不能为空".to_string()));
        }

        if self.dont_walk_into_tags.is_empty() {
            return Err(OverlayError::ConfigError("禁止深入标签列表不能为空".to_string()));
        }

        let block: HashSet<String> = self
            .shallow_block_tags
            .iter()
            .map(|tag| tag.to_ascii_lowercase())
            .collect();
        let mut overlap: Vec<&str> = self
            .shallow_inline_tags
            .iter()
            .filter(|tag| block.contains(&tag.to_ascii_lowercase()))
            .map(String::as_str)
            .collect();
        if !overlap.is_empty() {
            overlap.sort_unstable();
            return Err(OverlayError::ConfigError(format!(
                "标签不能同时属于块级和行内: {}",
                overlap.join(", ")
            )));
        }

        Ok(())
    }

    /// 应用环境变量覆盖
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{overlay, EnvVar};

        self.apply_overrides(overlay::Range::lookup(), overlay::RefreshUnchanged::lookup());
    }

    /// 无效的变量值只记录警告，保留原配置
    fn apply_overrides(
        &mut self,
        range: EnvResult<Option<TranslateRange>>,
        refresh_unchanged: EnvResult<Option<bool>>,
    ) {
        match range {
            Ok(Some(range)) => {
                tracing::info!("环境变量覆盖翻译范围: {:?}", range);
                self.range = range;
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
        }

        match refresh_unchanged {
            Ok(Some(refresh)) => self.refresh_unchanged = refresh,
            Ok(None) => {}
            Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
        }
    }
}

/// 简化的配置管理器
pub struct ConfigManager {
    config: OverlayConfig,
}

impl ConfigManager {
    /// 创建新的配置管理器
    pub fn new() -> OverlayResult<Self> {
        let mut config = Self::load_config()?;
        config.apply_env_overrides();
        config.validate()?;

        Ok(Self { config })
    }

    /// 使用给定配置创建管理器（不读取文件与环境变量）
    pub fn with_config(config: OverlayConfig) -> OverlayResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// 获取配置
    pub fn get_config(&self) -> &OverlayConfig {
        &self.config
    }

    /// 从文件加载配置
    fn load_config() -> OverlayResult<OverlayConfig> {
        use crate::env::{overlay, EnvVar};

        match overlay::ConfigPath::lookup() {
            Ok(Some(path)) => {
                let expanded_path = shellexpand::tilde(&path);
                tracing::info!("加载环境变量指定的配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
            Ok(None) => {}
            Err(e) => tracing::warn!("忽略无效的环境变量: {}", e),
        }

        for path in constants::CONFIG_PATHS {
            let expanded_path = shellexpand::tilde(path);
            if Path::new(expanded_path.as_ref()).exists() {
                tracing::info!("加载配置文件: {}", expanded_path);
                return Self::load_from_file(&expanded_path);
            }
        }

        tracing::info!("未找到配置文件，使用默认配置");
        Ok(OverlayConfig::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file(path: &str) -> OverlayResult<OverlayConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| OverlayError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .map_err(|e| OverlayError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| OverlayError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config(path: &str) -> OverlayResult<()> {
        let config = OverlayConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| OverlayError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| OverlayError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
