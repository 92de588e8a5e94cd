//! 页面模型
//!
//! 一个页面由主文档和若干同源框架文档组成。引擎不拥有这些树，
//! 只是在触发时对它们就地修改；跨源框架在挂载时就被拒绝。

use std::rc::Rc;

use markup5ever_rcdom::{Handle, RcDom};
use url::Url;

use crate::overlay::error::{OverlayError, OverlayResult};

use super::dom::{find_nodes, get_node_attr, html_to_dom};

/// 嵌入在页面中的同源框架
#[derive(Debug, Clone)]
pub struct Frame {
    host: Handle,
    url: Option<Url>,
    document: Handle,
}

impl Frame {
    /// 承载框架的 `<iframe>`/`<frame>` 元素
    pub fn host(&self) -> &Handle {
        &self.host
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn document(&self) -> &Handle {
        &self.document
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    document: Handle,
    url: Option<Url>,
    frames: Vec<Frame>,
}

impl Page {
    pub fn new(dom: RcDom, url: Option<Url>) -> Self {
        Self {
            document: dom.document,
            url,
            frames: Vec::new(),
        }
    }

    /// 从 HTML 文本创建页面
    pub fn from_html(html: &str, url: Option<&str>) -> OverlayResult<Self> {
        let url = url.map(Url::parse).transpose()?;
        Ok(Self::new(html_to_dom(html.as_bytes(), "utf-8"), url))
    }

    pub fn document(&self) -> &Handle {
        &self.document
    }

    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    pub fn body(&self) -> Option<Handle> {
        body_of(&self.document)
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// 主文档加上所有同源框架文档
    pub fn documents(&self) -> Vec<Handle> {
        std::iter::once(self.document.clone())
            .chain(self.frames.iter().map(|frame| frame.document.clone()))
            .collect()
    }

    /// 判断框架地址是否与页面同源
    ///
    /// 没有地址、`about:blank`、`about:srcdoc` 的框架继承页面的源
    pub fn is_same_origin(&self, frame_url: Option<&Url>) -> bool {
        let Some(frame_url) = frame_url else {
            return true;
        };
        if frame_url.scheme() == "about" {
            return true;
        }
        match &self.url {
            Some(page_url) => {
                let origin = page_url.origin();
                origin.is_tuple() && origin == frame_url.origin()
            }
            None => false,
        }
    }

    /// 挂载一个框架文档
    pub fn attach_frame(
        &mut self,
        host: &Handle,
        frame_url: Option<Url>,
        dom: RcDom,
    ) -> OverlayResult<&Frame> {
        if !self.is_same_origin(frame_url.as_ref()) {
            let url = frame_url.map(|u| u.to_string()).unwrap_or_default();
            return Err(OverlayError::CrossOriginFrame(url));
        }

        self.frames.retain(|frame| !Rc::ptr_eq(&frame.host, host));
        self.frames.push(Frame {
            host: host.clone(),
            url: frame_url,
            document: dom.document,
        });

        let index = self.frames.len() - 1;
        Ok(&self.frames[index])
    }

    /// 解析所有带 `srcdoc` 的 iframe 并作为框架挂载，返回新挂载的数量
    ///
    /// 已挂载的框架里再嵌套的 srcdoc iframe 也会被加载
    pub fn load_srcdoc_frames(&mut self) -> usize {
        let mut loaded = 0;
        let mut pending = vec![self.document.clone()];

        while let Some(document) = pending.pop() {
            for iframe in find_nodes(&document, &["iframe"]) {
                if self.frames.iter().any(|frame| Rc::ptr_eq(&frame.host, &iframe)) {
                    continue;
                }
                let Some(srcdoc) = get_node_attr(&iframe, "srcdoc") else {
                    continue;
                };

                let dom = html_to_dom(srcdoc.as_bytes(), "utf-8");
                let frame_document = dom.document.clone();
                let srcdoc_url = Url::parse("about:srcdoc").ok();
                if self.attach_frame(&iframe, srcdoc_url, dom).is_ok() {
                    tracing::debug!("已加载 srcdoc 框架");
                    pending.push(frame_document);
                    loaded += 1;
                }
            }
        }

        loaded
    }
}

/// 获取文档的 body 元素
pub fn body_of(document: &Handle) -> Option<Handle> {
    find_nodes(document, &["html", "body"]).into_iter().next()
}
