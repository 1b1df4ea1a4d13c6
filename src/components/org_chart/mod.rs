//! Collapsible org chart: the layout and view-state engine plus the Leptos
//! components that draw it.

mod card;
mod component;
mod controls;
pub mod hierarchy;
pub mod layout;
mod render;
mod search;
mod state;
pub mod theme;
mod types;
pub mod viewport;

pub use card::{CardContent, NodeCard, initials};
pub use component::OrgChart;
pub use controls::{SearchBar, ZoomControls};
pub use hierarchy::{Hierarchy, HierarchyNode, NodeId, NodeState};
pub use layout::{Bounds, CardSize, LayoutPass, Link, TreeLayout, connector};
pub use state::{ChartFrame, OrgChartState, VisibleLink, VisibleNode};
pub use theme::Theme;
pub use types::{ChartConfig, ChartError, FieldMapping, OrgNode};
pub use viewport::ViewTransform;
