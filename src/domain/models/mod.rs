// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

/// 领域模型模块
///
/// 该模块定义了系统的核心数据结构：
/// - 学校目录（directory）：学年内学校名称到讨论帖的映射
/// - 查询（query）：关键词类别、触发词集合与时间顺序模式
/// - 消息（message）：扫描时解析出的单条论坛消息
/// - 命中集合（match_set）：每个学校的命中结果和整次爬取结果
pub mod directory;
pub mod match_set;
pub mod message;
pub mod query;
