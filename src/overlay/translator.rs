//! 翻译器接口
//!
//! 引擎只依赖这个 trait。提示词、模型、语言对、网络请求都由实现方负责。

use std::future::Future;
use std::rc::Rc;

use crate::overlay::error::OverlayResult;

/// 单个单元的文本翻译
///
/// 失败应返回 `OverlayError::TranslationFailed`，引擎会把错误渲染在页面上。
/// 返回空字符串或与原文相同的文本表示“无需翻译”。
pub trait Translator {
    fn translate(&self, text: &str) -> impl Future<Output = OverlayResult<String>>;
}

impl<T: Translator> Translator for Rc<T> {
    fn translate(&self, text: &str) -> impl Future<Output = OverlayResult<String>> {
        (**self).translate(text)
    }
}

/// 用闭包实现的同步翻译器，主要用于测试与简单集成
pub struct FnTranslator<F> {
    translate_fn: F,
}

impl<F> FnTranslator<F>
where
    F: Fn(&str) -> OverlayResult<String>,
{
    pub fn new(translate_fn: F) -> Self {
        Self { translate_fn }
    }
}

impl<F> Translator for FnTranslator<F>
where
    F: Fn(&str) -> OverlayResult<String>,
{
    async fn translate(&self, text: &str) -> OverlayResult<String> {
        (self.translate_fn)(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::overlay::error::helpers::translation_error;

    #[tokio::test]
    async fn test_fn_translator() {
        let translator = FnTranslator::new(|text: &str| Ok(text.to_uppercase()));
        assert_eq!(translator.translate("hello").await.unwrap(), "HELLO");

        let shared = Rc::new(translator);
        assert_eq!(shared.translate("abc").await.unwrap(), "ABC");
    }

    #[tokio::test]
    async fn test_failures_propagate() {
        let translator = FnTranslator::new(|_: &str| Err(translation_error("quota exceeded")));
        assert!(translator.translate("x").await.is_err());
    }
}
