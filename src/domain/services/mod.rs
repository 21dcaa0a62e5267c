// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域服务模块
///
/// 包含的服务：
/// - 爬取服务（crawl_service）：查询入口，协调名称解析、分页发现和关键词扫描
/// - 名称解析（directory_resolver）：把自由输入的学校名称映射到目录条目
/// - 分页导航（page_navigator）：重建帖子的完整页面列表
/// - 关键词提取（keyword_extractor）：按类别筛选简短的状态消息
/// - 结果汇总（result_aggregator）：导出 JSON 和 CSV
pub mod crawl_service;
pub mod directory_resolver;
pub mod keyword_extractor;
pub mod page_navigator;
pub mod result_aggregator;
