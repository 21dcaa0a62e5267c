// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 基础设施层模块
///
/// - 目录缓存（directory_cache）：按学年加载并缓存学校目录
/// - 指标（metrics）：Prometheus 导出器和计数器名称
pub mod directory_cache;
pub mod metrics;
