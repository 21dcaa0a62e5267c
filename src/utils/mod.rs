// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 工具模块
///
/// 重试退避策略、日志初始化和URL处理
pub mod retry_policy;
pub mod telemetry;
pub mod url_utils;
