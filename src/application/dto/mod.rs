// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 数据传输对象模块
///
/// HTTP 请求和响应与领域模型之间的转换
pub mod query_request;
pub mod query_response;
