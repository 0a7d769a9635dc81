//! HTML标签提取器
//! 负责从HTML中提取script-src和meta标签，一次分词得到 `ParsedDocument`

use std::cell::RefCell;
use html5ever::tokenizer::states::RawKind;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts
};
use markup5ever::interface::Attribute;
use tendril::StrTendril;
use tracing::debug;

use crate::config::DocumentParser;

/// 生成器 meta 标签名称
pub const GENERATOR_META_NAME: &str = "generator";

/// meta 标签（名称小写，content 可缺失）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaTag {
    pub name: String,
    pub content: Option<String>,
}

/// 解析后的文档
#[derive(Debug, Clone, Default)]
pub struct ParsedDocument {
    /// 响应体文本（按 UTF-8 容错解码）
    pub text: String,
    pub meta_tags: Vec<MetaTag>,
    pub script_srcs: Vec<String>,
    /// 解析错误信息（精确模式下包含详细上下文）
    pub parse_errors: Vec<String>,
}

impl ParsedDocument {
    /// 全部 generator meta 标签
    pub fn generator_tags(&self) -> Vec<&MetaTag> {
        self.meta_tags
            .iter()
            .filter(|tag| tag.name == GENERATOR_META_NAME)
            .collect()
    }

    /// 指定名称的 meta 标签内容
    pub fn meta_contents<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.meta_tags
            .iter()
            .filter(move |tag| tag.name == name)
            .filter_map(|tag| tag.content.as_deref())
    }
}

#[derive(Debug, Default, Clone)]
pub struct HtmlExtractor {
    script_srcs: RefCell<Vec<String>>,
    meta_tags: RefCell<Vec<MetaTag>>,
    parse_errors: RefCell<Vec<String>>,
}

impl TokenSink for HtmlExtractor {
    type Handle = ();

    fn process_token(&self, token: Token, _line: u64) -> TokenSinkResult<()> {
        match token {
            Token::TagToken(Tag {
                kind: TagKind::StartTag,
                name,
                attrs,
                ..
            }) => match name.as_ref() {
                "script" => {
                    self.extract_script_src(&attrs);
                    // 脚本内容不是标签
                    return TokenSinkResult::RawData(RawKind::ScriptData);
                }
                "meta" => self.extract_meta_tags(&attrs),
                "style" | "xmp" | "iframe" | "noembed" | "noframes" => {
                    return TokenSinkResult::RawData(RawKind::Rawtext);
                }
                "title" | "textarea" => return TokenSinkResult::RawData(RawKind::Rcdata),
                "plaintext" => return TokenSinkResult::Plaintext,
                _ => {}
            },
            Token::ParseError(message) => self.parse_errors.borrow_mut().push(message.into_owned()),
            _ => {}
        }
        TokenSinkResult::Continue
    }
}

impl HtmlExtractor {
    /// 创建新的提取器
    pub fn new() -> Self {
        Self::default()
    }

    /// 解析响应体
    pub fn parse(body: &[u8], parser: DocumentParser) -> ParsedDocument {
        let text = String::from_utf8_lossy(body).into_owned();
        let result = Self::new().extract(&text, parser);

        let parse_errors = result.parse_errors.into_inner();
        if !parse_errors.is_empty() {
            debug!("文档解析完成，解析错误数：{}，首个错误：{}", parse_errors.len(), parse_errors[0]);
        }

        ParsedDocument {
            meta_tags: result.meta_tags.into_inner(),
            script_srcs: result.script_srcs.into_inner(),
            parse_errors,
            text,
        }
    }

    /// 从HTML字符串提取标签
    pub fn extract(&self, html: &str, parser: DocumentParser) -> Self {
        let opts = TokenizerOpts {
            exact_errors: parser == DocumentParser::Html5everStrict,
            ..TokenizerOpts::default()
        };
        let tokenizer = Tokenizer::new(self.clone(), opts);
        let queue = BufferQueue::default();
        queue.push_back(StrTendril::from(html));

        let _ = tokenizer.feed(&queue);
        tokenizer.end();

        tokenizer.sink
    }

    /// 提取script-src
    fn extract_script_src(&self, attrs: &[Attribute]) {
        for attr in attrs {
            if attr.name.local.as_ref() == "src" {
                self.script_srcs.borrow_mut().push(attr.value.to_string());
                break;
            }
        }
    }

    /// 提取meta标签
    fn extract_meta_tags(&self, attrs: &[Attribute]) {
        let mut name = None;
        let mut content = None;

        for attr in attrs {
            match attr.name.local.as_ref() {
                "name" => name = Some(attr.value.to_string().trim().to_lowercase()),
                "content" => content = Some(attr.value.to_string()),
                _ => {}
            }
        }

        if let Some(name) = name {
            self.meta_tags.borrow_mut().push(MetaTag { name, content });
        }
    }

    /// 获取提取到的script-src列表
    pub fn get_script_srcs(&self) -> Vec<String> {
        self.script_srcs.borrow().clone()
    }

    /// 获取提取到的meta标签列表
    pub fn get_meta_tags(&self) -> Vec<MetaTag> {
        self.meta_tags.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_html_extractor() {
        let html = r#"
            <script src="/jquery.min.js"></script>
            <meta name="author" content="test_user">
            <meta name="Generator" content="WordPress 6.0" />
            <meta name="robots">
            <script src="/vue.global.js"></script>
        "#;

        let result = HtmlExtractor::new().extract(html, DocumentParser::Html5ever);

        assert_eq!(
            result.get_script_srcs(),
            vec!["/jquery.min.js".to_string(), "/vue.global.js".to_string()]
        );

        assert_eq!(
            result.get_meta_tags(),
            vec![
                MetaTag { name: "author".to_string(), content: Some("test_user".to_string()) },
                MetaTag { name: "generator".to_string(), content: Some("WordPress 6.0".to_string()) },
                MetaTag { name: "robots".to_string(), content: None },
            ]
        );
    }

    #[test]
    fn test_parse_document() {
        let body = br#"<html><head>
            <meta name="generator" content="Drupal 9 (https://www.drupal.org)">
            <meta name="generator">
        </head></html>"#;

        let document = HtmlExtractor::parse(body, DocumentParser::Html5ever);

        assert_eq!(document.generator_tags().len(), 2);
        assert_eq!(
            document.meta_contents("generator").collect::<Vec<_>>(),
            vec!["Drupal 9 (https://www.drupal.org)"]
        );
        assert!(document.text.contains("<head>"));
    }

    #[test]
    fn test_markup_inside_raw_text_is_not_tokenized() {
        let body = br#"<html><head>
            <meta name="generator" content="WordPress 5.4">
            <script>var tpl = '<meta name="generator" content="Elementor 3.0">';</script>
            <script>document.write('<script src="/injected.js"></scr' + 'ipt>');</script>
            <title><meta name="generator" content="in title"></title>
            <style>/* <meta name="generator" content="in style"> */</style>
            <script src="/real.js"></script>
        </head></html>"#;

        let document = HtmlExtractor::parse(body, DocumentParser::Html5ever);

        let generators: Vec<&str> = document.meta_contents(GENERATOR_META_NAME).collect();
        assert_eq!(generators, vec!["WordPress 5.4"]);
        assert_eq!(document.script_srcs, vec!["/real.js".to_string()]);
    }

    #[test]
    fn test_parse_errors_are_collected() {
        let body = b"<html><meta name=\"generator\" content=\"Ghost 5.0\"<p></html>";

        let strict = HtmlExtractor::parse(body, DocumentParser::Html5everStrict);
        assert!(!strict.parse_errors.is_empty());
        assert_eq!(strict.generator_tags().len(), 1);
    }
}
