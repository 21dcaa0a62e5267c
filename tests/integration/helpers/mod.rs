// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use axum::{
    extract::Extension,
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
    Router,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use threadsift::config::settings::CrawlSettings;
use threadsift::domain::services::crawl_service::CrawlService;
use threadsift::engines::reqwest_engine::ReqwestFetcher;
use threadsift::engines::traits::PageFetcher;
use threadsift::infrastructure::directory_cache::DirectoryCache;
use threadsift::presentation::handlers::query_handler::SharedCrawlService;
use tokio::net::TcpListener;

pub const YEAR: &str = "2021-2022";
pub const LISTING_PATH: &str = "/threads/2021-2022-alphabetical-listing-of-schools.1/";
pub const ALBANY_PATH: &str = "/threads/2021-2022-albany-medical-college.10/";
pub const DREW_PATH: &str = "/threads/2021-2022-charles-r-drew.11/";
pub const UCLA_PATH: &str = "/threads/2021-2022-ucla-geffen.12/";
pub const PENN_PATH: &str = "/threads/2021-2022-university-of-pennsylvania.13/";

enum Canned {
    Page(String),
    Status(StatusCode),
}

struct ForumState {
    pages: HashMap<String, Canned>,
    hits: Mutex<Vec<String>>,
}

/// 本地假论坛，每个测试独立一个端口
pub struct FakeForum {
    pub base_url: String,
    state: Arc<ForumState>,
}

impl FakeForum {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// 按请求顺序记录的路径
    pub fn hits(&self) -> Vec<String> {
        self.state.hits.lock().unwrap().clone()
    }

    pub fn hit_count(&self, path: &str) -> usize {
        self.hits().iter().filter(|hit| hit.as_str() == path).count()
    }
}

pub fn ucla_page(n: u32) -> String {
    if n == 1 {
        UCLA_PATH.to_string()
    } else {
        format!("{}page-{}", UCLA_PATH, n)
    }
}

fn message(author: &str, date: &str, body: &str) -> String {
    format!(
        r#"<article class="message message--post">
             <div class="message-inner"><div class="message-cell message-cell--main">
               <div class="message-content js-messageContent">
                 <div class="message-userContent lbContainer js-lbContainer" data-lb-caption-desc="{author} · {date} at 8:41 PM">
                   <article class="message-body js-selectToQuote"><div class="bbWrapper">{body}</div></article>
                 </div>
               </div>
             </div></div>
           </article>"#
    )
}

/// 只给出首页、第2、3页和末页的稀疏导航控件
fn ucla_nav() -> String {
    let items: String = [1, 2, 3, 7]
        .iter()
        .map(|n| format!(r#"<li class="pageNav-page"><a href="{}">{}</a></li>"#, ucla_page(*n), n))
        .collect();
    format!(
        r#"<nav class="pageNavWrapper"><div class="pageNav"><ul class="pageNav-main">{items}</ul></div></nav>"#
    )
}

fn page(nav: &str, messages: &[String]) -> String {
    format!(
        "<!DOCTYPE html><html><head><title>thread</title></head><body>{}{}</body></html>",
        nav,
        messages.concat()
    )
}

fn listing() -> String {
    let links = [
        (ALBANY_PATH, "Albany Medical College"),
        (DREW_PATH, "Charles R Drew University @ UCLA"),
        (UCLA_PATH, "University of California - Los Angeles (Geffen)"),
        (PENN_PATH, "University of Pennsylvania"),
    ]
    .iter()
    .map(|(path, name)| {
        format!(r#"<a href="{path}" class="link link--internal">2021-2022 {name}</a><br />"#)
    })
    .collect::<String>();
    page("", &[message("moderator", "Jun 1, 2021", &links)])
}

fn forum_pages() -> HashMap<String, Canned> {
    let nav = ucla_nav();
    let mut pages = HashMap::new();
    pages.insert(LISTING_PATH.to_string(), Canned::Page(listing()));
    pages.insert(
        ALBANY_PATH.to_string(),
        Canned::Page(page(
            "",
            &[
                message("hopeful1", "Jan 4, 2022", "Accepted! So excited, just got the email today."),
                message("hopeful2", "Jan 5, 2022", "A."),
                message("hopeful3", "Jan 6, 2022", "anyone hear back yet?"),
            ],
        )),
    );
    pages.insert(
        DREW_PATH.to_string(),
        Canned::Status(StatusCode::INTERNAL_SERVER_ERROR),
    );
    pages.insert(
        PENN_PATH.to_string(),
        Canned::Page(page("", &[message("quaker", "Aug 2, 2021", "Secondary received.")])),
    );

    let ucla_messages: [(u32, Vec<String>); 7] = [
        (1, vec![message("bruin1", "Jul 1, 2021", "Secondary received today, good luck all.")]),
        (2, vec![message("bruin2", "Aug 9, 2021", "Still waiting.")]),
        (3, vec![]),
        (4, vec![message("bruin4", "Sep 3, 2021", "II!")]),
        (5, vec![message("bruin5", "Sep 20, 2021", "Complete as of today.")]),
        (
            6,
            vec![message(
                "bruin6",
                "Oct 1, 2021",
                "bruin4 said: II! Click to expand... II! for 10/12",
            )],
        ),
        (
            7,
            vec![
                message("bruin7", "Nov 2, 2021", "Interview invite received!"),
                message("bruin8", "Nov 3, 2021", "anyone get an II yet?"),
            ],
        ),
    ];
    for (n, messages) in ucla_messages {
        pages.insert(ucla_page(n), Canned::Page(page(&nav, &messages)));
    }
    pages
}

async fn serve(Extension(state): Extension<Arc<ForumState>>, uri: Uri) -> Response {
    let path = uri.path().to_string();
    state.hits.lock().unwrap().push(path.clone());
    match state.pages.get(&path) {
        Some(Canned::Page(body)) => Html(body.clone()).into_response(),
        Some(Canned::Status(status)) => (*status, "upstream error").into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// 启动假论坛
pub async fn spawn_forum() -> FakeForum {
    let state = Arc::new(ForumState {
        pages: forum_pages(),
        hits: Mutex::new(Vec::new()),
    });
    let app = Router::new()
        .fallback(serve)
        .layer(Extension(Arc::clone(&state)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeForum {
        base_url: format!("http://{}", addr),
        state,
    }
}

/// 测试用的爬取配置：快速重试
pub fn test_settings() -> CrawlSettings {
    CrawlSettings {
        max_retries: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 5,
        request_timeout_secs: 5,
        ..CrawlSettings::default()
    }
}

/// 指向假论坛的爬取服务
pub fn crawl_service(forum: &FakeForum) -> SharedCrawlService {
    let settings = test_settings();
    let fetcher: Arc<dyn PageFetcher> = Arc::new(ReqwestFetcher::new(&settings).unwrap());
    let directories = Arc::new(DirectoryCache::new(HashMap::from([(
        YEAR.to_string(),
        forum.url(LISTING_PATH),
    )])));
    Arc::new(CrawlService::new(fetcher, directories, settings))
}
