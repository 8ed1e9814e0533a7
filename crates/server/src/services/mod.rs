//! Business services on top of the store layer.
//!
//! - [`settlement`] - checkout settlement coordinator
//! - [`analytics`] - on-demand business metrics
//! - [`notifier`] - background confirmation delivery

pub mod analytics;
pub mod notifier;
pub mod settlement;
