//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问，用于覆盖配置文件中的值

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    /// 读取可选变量：未设置为 `Ok(None)`，无法解析为 `Err`
    fn lookup() -> EnvResult<Option<T>> {
        Self::parse_present(env::var(Self::NAME).ok().as_deref())
    }

    fn parse_present(value: Option<&str>) -> EnvResult<Option<T>> {
        value.map(Self::parse).transpose()
    }
}

/// 覆盖层相关环境变量
///
/// 这些变量都没有默认值：未设置时不覆盖配置文件
pub mod overlay {
    use super::*;
    use crate::overlay::config::TranslateRange;

    /// 翻译范围
    pub struct Range;
    impl EnvVar<TranslateRange> for Range {
        const NAME: &'static str = "OVERLAY_TRANSLATE_RANGE";
        const DESCRIPTION: &'static str = "Page translation range: main, all";

        fn parse(value: &str) -> EnvResult<TranslateRange> {
            value.parse().map_err(|_| EnvError {
                variable: Self::NAME.to_string(),
                message: format!("Invalid range '{}'. Use: main, all", value),
            })
        }
    }

    /// 配置文件路径
    pub struct ConfigPath;
    impl EnvVar<String> for ConfigPath {
        const NAME: &'static str = "OVERLAY_CONFIG_PATH";
        const DESCRIPTION: &'static str = "Path to an overlay config file (TOML or JSON)";

        fn parse(value: &str) -> EnvResult<String> {
            if value.trim().is_empty() {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Path cannot be empty".to_string(),
                });
            }
            Ok(value.trim().to_string())
        }
    }

    /// 整页翻译时是否刷新内容未变的单元
    pub struct RefreshUnchanged;
    impl EnvVar<bool> for RefreshUnchanged {
        const NAME: &'static str = "OVERLAY_REFRESH_UNCHANGED";
        const DESCRIPTION: &'static str =
            "Re-request translation for units whose source text did not change";

        fn parse(value: &str) -> EnvResult<bool> {
            parse_bool(value, Self::NAME)
        }
    }
}

fn parse_bool(value: &str, var_name: &str) -> EnvResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "enabled" => Ok(true),
        "false" | "0" | "no" | "off" | "disabled" => Ok(false),
        _ => Err(EnvError {
            variable: var_name.to_string(),
            message: format!(
                "Invalid boolean value '{}'. Use: true/false, 1/0, yes/no, on/off, enabled/disabled",
                value
            ),
        }),
    }
}

/// 生成环境变量文档
pub fn generate_env_docs() -> String {
    let mut docs = String::from("# Environment Variables\n\n");
    docs.push_str(&format!(
        "- `{}`: {}\n",
        overlay::Range::NAME,
        overlay::Range::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {}\n",
        overlay::ConfigPath::NAME,
        overlay::ConfigPath::DESCRIPTION
    ));
    docs.push_str(&format!(
        "- `{}`: {}\n",
        overlay::RefreshUnchanged::NAME,
        overlay::RefreshUnchanged::DESCRIPTION
    ));
    docs
}
