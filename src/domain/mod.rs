// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域层模块
///
/// - 领域模型（models）：查询、目录、消息和匹配结果
/// - 服务（services）：名称解析、分页重建、关键词匹配和结果汇总
///
/// 领域层只通过 [`crate::engines::traits::PageFetcher`] 访问论坛
pub mod models;
pub mod services;
