// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::engines::parsed_page::MessageBlock;
use chrono::NaiveDate;

/// 扫描过程中的单条消息
///
/// 只在产生它的那次扫描中存在
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub text: String,
    pub author: String,
    pub date: Option<NaiveDate>,
    /// 页码（从1开始）
    pub page_number: u32,
}

impl Message {
    pub fn from_block(block: &MessageBlock, page_number: u32) -> Self {
        Self {
            text: block.raw_text().to_string(),
            author: block.author_label().to_string(),
            date: block.date_label(),
            page_number,
        }
    }
}
