//! 覆盖层配置管理模块
//!
//! 提供标签分类、翻译范围等配置，支持环境变量、配置文件和默认值

pub mod manager;

pub use manager::{ConfigManager, OverlayConfig, TranslateRange};

/// 配置常量
pub mod constants {
    // 注入到页面中的类名
    pub const NOTRANSLATE_CLASS: &str = "notranslate";
    pub const CONTENT_WRAPPER_CLASS: &str = "overlay-translated-content-wrapper";
    pub const INLINE_CONTENT_CLASS: &str = "overlay-translated-inline-content";
    pub const BLOCK_CONTENT_CLASS: &str = "overlay-translated-block-content";
    pub const SPINNER_CLASS: &str = "overlay-spinner";
    pub const ERROR_CLASS: &str = "overlay-translation-error";
    pub const NO_TRUNCATE_CLASS: &str = "overlay-no-truncate";

    // 遍历标记属性
    pub const WALKED_ATTRIBUTE: &str = "data-overlay-walked";
    pub const PARAGRAPH_ATTRIBUTE: &str = "data-overlay-paragraph";
    pub const BLOCK_ATTRIBUTE: &str = "data-overlay-block";
    pub const INLINE_ATTRIBUTE: &str = "data-overlay-inline";
    pub const SOURCE_HASH_ATTRIBUTE: &str = "data-overlay-source";
    pub const STYLE_MARKER_ATTRIBUTE: &str = "data-overlay-style";

    /// 行内译文前的分隔
    pub const INLINE_SEPARATOR: &str = "  ";
    /// 错误提示的图标文本
    pub const ERROR_GLYPH: &str = "\u{26a0}";

    pub const SHALLOW_BLOCK_TAGS: &[&str] = &[
        "html", "body", "address", "article", "aside", "blockquote", "details", "dialog", "dd",
        "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
        "h4", "h5", "h6", "header", "hgroup", "hr", "li", "main", "nav", "ol", "p", "section",
        "table", "caption", "thead", "tbody", "tfoot", "tr", "td", "th", "ul", "summary", "menu",
        "center", "legend", "pre",
    ];

    pub const SHALLOW_INLINE_TAGS: &[&str] = &[
        "a", "abbr", "b", "bdi", "bdo", "big", "cite", "code", "data", "del", "dfn", "em", "font",
        "i", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span", "strike", "strong",
        "sub", "sup", "time", "tt", "u", "var", "button",
    ];

    pub const FORCE_INLINE_TAGS: &[&str] =
        &["a", "button", "label", "option", "select", "span", "summary"];

    pub const IGNORE_TAGS: &[&str] = &[
        "canvas", "embed", "iframe", "frame", "img", "input", "math", "object", "picture", "svg",
        "video", "audio", "br", "wbr",
    ];

    pub const DONT_WALK_INTO_TAGS: &[&str] = &[
        "script", "style", "noscript", "template", "textarea", "link", "meta", "head", "title",
        "base", "param", "source", "track",
    ];

    pub const MAIN_CONTENT_IGNORE_TAGS: &[&str] = &["header", "footer", "nav", "aside"];

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "overlay-translate.toml",
        ".overlay-translate.toml",
        "~/.config/overlay-translate/config.toml",
    ];
}

/// 向后兼容的配置加载函数，失败时回退到默认配置
pub fn load_overlay_config() -> OverlayConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.get_config().clone(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            OverlayConfig::default()
        }
    }
}
