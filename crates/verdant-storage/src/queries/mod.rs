// SPDX-FileCopyrightText: 2026 Verdant Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query modules for CRUD operations on storage entities.

pub mod cart;
pub mod catalog;
pub mod chat;
pub mod checkpoint;
pub mod orders;
pub mod ratelimit;
