// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::parsed_page::NavigationWidget;
use crate::engines::traits::{EngineError, FetchError, PageFetcher};
use std::collections::HashSet;
use tracing::{debug, warn};

/// 帖子的有序页面列表
///
/// 下标0为第一页；其余页面按页码严格递增且没有重复
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSequence(Vec<String>);

impl PageSequence {
    /// 使用已经排好序的URL构造
    pub fn new(urls: Vec<String>) -> Self {
        Self(urls)
    }

    /// 单页帖子
    pub fn single(url: impl Into<String>) -> Self {
        Self(vec![url.into()])
    }

    pub fn urls(&self) -> &[String] {
        &self.0
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 页码与URL之间的映射规则
pub trait PageNumberScheme: Send + Sync {
    /// 从URL中取出页码，没有页码时返回 `None`
    fn page_number(&self, url: &str) -> Option<u32>;

    /// 以 `template` 为基础生成第 `page` 页的URL
    fn page_url(&self, template: &str, page: u32) -> String;
}

/// `…/threads/slug.123/page-N` 形式的分页URL
#[derive(Debug, Clone, Copy, Default)]
pub struct DashSuffixScheme;

const PAGE_SEGMENT: &str = "page-";

impl PageNumberScheme for DashSuffixScheme {
    fn page_number(&self, url: &str) -> Option<u32> {
        url.trim_end_matches('/')
            .rsplit('-')
            .next()
            .and_then(|suffix| suffix.parse().ok())
    }

    fn page_url(&self, template: &str, page: u32) -> String {
        let base = match template.rfind(PAGE_SEGMENT) {
            Some(pos) => &template[..pos],
            None => template,
        };
        if base.ends_with('/') {
            format!("{}{}{}", base, PAGE_SEGMENT, page)
        } else {
            format!("{}/{}{}", base, PAGE_SEGMENT, page)
        }
    }
}

/// 分页重建策略
pub trait PaginationStrategy: Send + Sync {
    /// 根据导航控件构造页面列表
    fn build(&self, thread_url: &str, widget: Option<&NavigationWidget>) -> PageSequence;
}

/// 稀疏导航控件的补全策略
///
/// 论坛导航控件通常只给出首页、末页和附近几页。链接数超过 `min_links_for_gap_fill`
/// 时，在倒数第二个链接和最后一个链接的页码之间补全缺失的页面
#[derive(Debug, Clone)]
pub struct GapFillStrategy<S: PageNumberScheme = DashSuffixScheme> {
    scheme: S,
    /// 触发补全所需的链接数下限（不含）
    pub min_links_for_gap_fill: usize,
    /// 倒数第二个链接没有页码时使用的起点
    pub fallback_first_gap: u32,
}

impl Default for GapFillStrategy<DashSuffixScheme> {
    fn default() -> Self {
        Self::new(DashSuffixScheme)
    }
}

impl<S: PageNumberScheme> GapFillStrategy<S> {
    pub fn new(scheme: S) -> Self {
        Self {
            scheme,
            min_links_for_gap_fill: 3,
            fallback_first_gap: 3,
        }
    }

    /// 生成缺失页面的URL
    ///
    /// `first_gap` 取倒数第二个链接的页码，`last_gap` 取最后一个链接的页码（缺失时用最大页数提示），
    /// 生成两者之间（不含端点）的所有页面
    pub fn synthesize(&self, links: &[String], max_page_hint: Option<u32>) -> Vec<String> {
        if links.len() <= self.min_links_for_gap_fill {
            return Vec::new();
        }

        let first_gap = self
            .scheme
            .page_number(&links[links.len() - 2])
            .unwrap_or(self.fallback_first_gap);
        let Some(last_gap) = self
            .scheme
            .page_number(&links[links.len() - 1])
            .or(max_page_hint)
        else {
            return Vec::new();
        };

        (first_gap.saturating_add(1)..last_gap)
            .map(|page| self.scheme.page_url(&links[0], page))
            .collect()
    }
}

impl<S: PageNumberScheme> PaginationStrategy for GapFillStrategy<S> {
    fn build(&self, thread_url: &str, widget: Option<&NavigationWidget>) -> PageSequence {
        let Some(widget) = widget else {
            return PageSequence::single(thread_url);
        };
        let links = widget.page_links();
        let Some(first) = links.first() else {
            return PageSequence::single(thread_url);
        };

        let synthesized = self.synthesize(links, widget.max_page_hint());
        let first_page = self.scheme.page_number(first).unwrap_or(1);

        let mut numbered: Vec<(u32, &String)> = links[1..]
            .iter()
            .chain(synthesized.iter())
            .filter(|url| *url != first)
            .filter_map(|url| match self.scheme.page_number(url) {
                Some(page) => Some((page, url)),
                None => {
                    debug!(url = %url, "Dropping page link without a page number");
                    None
                }
            })
            .filter(|(page, _)| *page != first_page)
            .collect();
        numbered.sort_by_key(|(page, _)| *page);

        let mut seen = HashSet::new();
        let mut urls = vec![first.clone()];
        urls.extend(
            numbered
                .into_iter()
                .filter(|(page, _)| seen.insert(*page))
                .map(|(_, url)| url.clone()),
        );
        PageSequence(urls)
    }
}

/// 页面导航器
///
/// 抓取帖子首页，根据导航控件重建完整的页面列表
#[derive(Debug, Clone, Default)]
pub struct PageNavigator<P: PaginationStrategy = GapFillStrategy> {
    strategy: P,
}

impl<P: PaginationStrategy> PageNavigator<P> {
    pub fn new(strategy: P) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> &P {
        &self.strategy
    }

    /// 发现帖子的所有页面
    ///
    /// # 返回值
    ///
    /// * `Ok(PageSequence)` - 有序页面列表；页面无法解析时退化为单页
    /// * `Err(FetchError)` - 首页抓取失败（已重试）
    pub async fn discover<F: PageFetcher + ?Sized>(
        &self,
        fetcher: &F,
        thread_url: &str,
    ) -> Result<PageSequence, FetchError> {
        match fetcher.fetch_and_parse(thread_url).await {
            Ok(page) => {
                let pages = self
                    .strategy
                    .build(thread_url, page.find_navigation_widget());
                debug!(thread_url, pages = pages.len(), "Discovered thread pages");
                Ok(pages)
            }
            Err(EngineError::Parse(e)) => {
                warn!(thread_url, "Thread page could not be parsed, assuming one page: {}", e);
                Ok(PageSequence::single(thread_url))
            }
            Err(EngineError::Fetch(e)) => Err(e),
        }
    }
}

#[cfg(test)]
#[path = "page_navigator_test.rs"]
mod tests;
