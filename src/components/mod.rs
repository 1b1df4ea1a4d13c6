//! Reusable components.

pub mod org_chart;
