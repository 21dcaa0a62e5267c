// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::traits::ParseError;
use crate::utils::url_utils::absolutize;
use chrono::{Month, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static NAV_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("ul.pageNav-main"));
static NAV_ITEM_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("li"));
static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static MAX_INPUT_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("input[max]"));
static NUMBER_INPUT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector("input[type=\"number\"][max]"));
static MESSAGE_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("div.message-content"));
static BODY_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("div.bbWrapper"));
static USER_CONTENT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| selector("div.message-userContent"));
static DIRECTORY_LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| selector("a.link--internal"));

static CAPTION_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][a-z]{2})[a-z]*\.?\s+(\d{1,2}),\s+(\d{4})\b")
        .expect("caption date regex is valid")
});

/// 消息元数据所在的属性
const CAPTION_ATTR: &str = "data-lb-caption-desc";

/// 作者或日期缺失时的占位值
pub const UNKNOWN_LABEL: &str = "Unknown";

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

/// 分页导航控件
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigationWidget {
    links: Vec<String>,
    max_page_hint: Option<u32>,
}

impl NavigationWidget {
    pub fn new(links: Vec<String>, max_page_hint: Option<u32>) -> Self {
        Self {
            links,
            max_page_hint,
        }
    }

    /// 控件中按文档顺序出现的页面链接（绝对URL）
    pub fn page_links(&self) -> &[String] {
        &self.links
    }

    /// 页码跳转输入框给出的最大页数
    pub fn max_page_hint(&self) -> Option<u32> {
        self.max_page_hint
    }
}

/// 单条论坛消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBlock {
    text: String,
    author: String,
    date: Option<NaiveDate>,
}

impl MessageBlock {
    pub fn new(text: impl Into<String>, author: impl Into<String>, date: Option<NaiveDate>) -> Self {
        Self {
            text: text.into(),
            author: author.into(),
            date,
        }
    }

    /// 消息正文（包含被引用的内容）
    pub fn raw_text(&self) -> &str {
        &self.text
    }

    /// 作者用户名
    pub fn author_label(&self) -> &str {
        &self.author
    }

    /// 发帖日期
    pub fn date_label(&self) -> Option<NaiveDate> {
        self.date
    }
}

/// 索引帖中的学校链接
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryLink {
    pub text: String,
    pub href: String,
}

/// 解析后的论坛页面
///
/// 解析在构造时一次性完成，结果不持有 DOM，可以跨 await 传递
#[derive(Debug, Clone, Default)]
pub struct ParsedPage {
    url: String,
    navigation: Option<NavigationWidget>,
    messages: Vec<MessageBlock>,
    directory_links: Vec<DirectoryLink>,
}

impl ParsedPage {
    /// 解析页面内容
    ///
    /// # 参数
    ///
    /// * `url` - 页面地址，用于补全相对链接
    /// * `body` - 响应体
    ///
    /// # 返回值
    ///
    /// * `Ok(ParsedPage)` - 解析结果
    /// * `Err(ParseError)` - 响应体为空或不是标记语言
    pub fn parse(url: &str, body: &str) -> Result<Self, ParseError> {
        if body.trim().is_empty() {
            return Err(ParseError::EmptyBody(url.to_string()));
        }
        if !body.contains('<') {
            return Err(ParseError::NotMarkup(url.to_string()));
        }

        let document = Html::parse_document(body);
        Ok(Self {
            url: url.to_string(),
            navigation: parse_navigation(&document, url),
            messages: parse_messages(&document),
            directory_links: parse_directory_links(&document, url),
        })
    }

    /// 由已知部件构造页面
    pub fn from_parts(
        url: impl Into<String>,
        navigation: Option<NavigationWidget>,
        messages: Vec<MessageBlock>,
    ) -> Self {
        Self {
            url: url.into(),
            navigation,
            messages,
            directory_links: Vec::new(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// 分页导航控件，单页帖子没有该控件
    pub fn find_navigation_widget(&self) -> Option<&NavigationWidget> {
        self.navigation.as_ref()
    }

    /// 按文档顺序排列的消息
    pub fn find_message_blocks(&self) -> &[MessageBlock] {
        &self.messages
    }

    /// 索引帖正文中的学校链接
    pub fn directory_links(&self) -> &[DirectoryLink] {
        &self.directory_links
    }
}

fn parse_navigation(document: &Html, base_url: &str) -> Option<NavigationWidget> {
    let widget = document.select(&NAV_SELECTOR).next()?;

    let links = widget
        .select(&NAV_ITEM_SELECTOR)
        .filter_map(|item| item.select(&LINK_SELECTOR).next())
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| absolutize(base_url, href))
        .collect();

    let max_page_hint = widget
        .select(&MAX_INPUT_SELECTOR)
        .chain(document.select(&NUMBER_INPUT_SELECTOR))
        .filter_map(|input| input.value().attr("max"))
        .find_map(|max| max.trim().parse::<u32>().ok());

    Some(NavigationWidget::new(links, max_page_hint))
}

fn parse_messages(document: &Html) -> Vec<MessageBlock> {
    document
        .select(&MESSAGE_SELECTOR)
        .filter_map(|content| {
            let body = content.select(&BODY_SELECTOR).next()?;
            let caption = content
                .select(&USER_CONTENT_SELECTOR)
                .next()
                .and_then(|user| user.value().attr(CAPTION_ATTR));
            let (author, date) = caption.map(parse_caption).unwrap_or_default();

            Some(MessageBlock::new(
                element_text(body),
                author.unwrap_or_else(|| UNKNOWN_LABEL.to_string()),
                date,
            ))
        })
        .collect()
}

fn parse_directory_links(document: &Html, base_url: &str) -> Vec<DirectoryLink> {
    let Some(listing) = document.select(&BODY_SELECTOR).next() else {
        return Vec::new();
    };

    listing
        .select(&DIRECTORY_LINK_SELECTOR)
        .filter_map(|link| {
            let href = absolutize(base_url, link.value().attr("href")?)?;
            Some(DirectoryLink {
                text: element_text(link),
                href,
            })
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// 解析 `"<author> · Jan 5, 2021 at 10:32 AM"` 形式的说明文字
pub fn parse_caption(caption: &str) -> (Option<String>, Option<NaiveDate>) {
    let author = caption.split_whitespace().next().map(str::to_string);
    let date = CAPTION_DATE.captures(caption).and_then(|caps| {
        let month = caps[1].parse::<Month>().ok()?;
        let day = caps[2].parse::<u32>().ok()?;
        let year = caps[3].parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
    });
    (author, date)
}
