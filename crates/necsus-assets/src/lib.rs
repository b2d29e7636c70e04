// SPDX-FileCopyrightText: 2026 Necsus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Active content handling for rendered Necsus messages.
//!
//! Bot messages may embed images, media, stylesheets, scripts, and forms that
//! reference resources relative to the bot's own URL. [`AssetPipeline`] makes
//! that content behave as if it were native to the page, running each
//! embedded script exactly once.

pub mod forms;
pub mod pipeline;
pub mod registry;
pub mod urljoin;

pub use forms::{form_submission, wire_forms};
pub use pipeline::{AssetPipeline, InjectionReport};
pub use registry::AssetRegistry;
pub use urljoin::urljoin;
