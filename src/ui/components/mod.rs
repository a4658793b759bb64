//! Reusable HTML building blocks.
//!
//! # Components
//!
//! - [`Button`]: button or button-styled link with variants
//! - [`card`], [`stat_card`]: card container
//! - [`badge`]: status badge
//! - [`Icon`]: inline SVG icons

mod badge;
mod button;
mod card;
mod icons;

pub use badge::{BadgeVariant, badge};
pub use button::{Button, ButtonSize, ButtonVariant};
pub use card::{card, stat_card};
pub use icons::Icon;
