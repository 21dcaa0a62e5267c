// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

#[cfg(test)]
pub mod memory_engine;
pub mod parsed_page;
pub mod reqwest_engine;
pub mod traits;
