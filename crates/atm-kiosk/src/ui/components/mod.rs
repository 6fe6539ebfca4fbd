//! Reusable UI components

pub mod button_column;
pub mod status_bar;
