//! 覆盖层模块统一错误处理
//!
//! 引擎本身没有致命错误：翻译失败只会渲染为页面内的错误提示，
//! 这里的错误类型主要服务于配置加载、页面组装与翻译器实现。

use std::fmt;

use thiserror::Error;

/// 覆盖层错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OverlayError {
    /// 配置错误
    #[error("配置错误: {0}")]
    ConfigError(String),

    /// 解析错误
    #[error("解析错误: {0}")]
    ParseError(String),

    /// 跨源框架，引擎不会进入
    #[error("跨源框架无法处理: {0}")]
    CrossOriginFrame(String),

    /// 翻译调用失败
    #[error("翻译失败: {0}")]
    TranslationFailed(String),

    /// IO错误
    #[error("IO错误: {0}")]
    IoError(String),
}

impl OverlayError {
    /// 检查错误是否可重试
    ///
    /// 引擎不做重试，这个判断留给请求调度方使用
    pub fn is_retryable(&self) -> bool {
        match self {
            OverlayError::TranslationFailed(_) => true,
            OverlayError::IoError(_) => true,
            OverlayError::ConfigError(_) => false,
            OverlayError::ParseError(_) => false,
            OverlayError::CrossOriginFrame(_) => false,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let wrap = |msg: String| format!("{} (上下文: {})", msg, context);
        match self {
            OverlayError::ConfigError(msg) => OverlayError::ConfigError(wrap(msg)),
            OverlayError::ParseError(msg) => OverlayError::ParseError(wrap(msg)),
            OverlayError::CrossOriginFrame(msg) => OverlayError::CrossOriginFrame(wrap(msg)),
            OverlayError::TranslationFailed(msg) => OverlayError::TranslationFailed(wrap(msg)),
            OverlayError::IoError(msg) => OverlayError::IoError(wrap(msg)),
        }
    }
}

impl From<std::io::Error> for OverlayError {
    fn from(error: std::io::Error) -> Self {
        OverlayError::IoError(error.to_string())
    }
}

impl From<serde_json::Error> for OverlayError {
    fn from(error: serde_json::Error) -> Self {
        OverlayError::ParseError(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for OverlayError {
    fn from(error: toml::de::Error) -> Self {
        OverlayError::ParseError(format!("TOML解析错误: {}", error))
    }
}

impl From<url::ParseError> for OverlayError {
    fn from(error: url::ParseError) -> Self {
        OverlayError::ParseError(format!("URL解析错误: {}", error))
    }
}

/// 错误结果类型别名
pub type OverlayResult<T> = Result<T, OverlayError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 创建配置错误
    pub fn config_error<T: fmt::Display>(msg: T) -> OverlayError {
        OverlayError::ConfigError(msg.to_string())
    }

    /// 创建翻译失败错误，翻译器实现应使用它上报失败
    pub fn translation_error<T: fmt::Display>(msg: T) -> OverlayError {
        OverlayError::TranslationFailed(msg.to_string())
    }

    pub fn parse_error<T: fmt::Display>(msg: T) -> OverlayError {
        OverlayError::ParseError(msg.to_string())
    }
}
