//! Charts module - Map layer and chart rendering

mod choropleth;
mod plotter;

pub use choropleth::{build_map_layer, reds, MapError, MapLayer};
pub use plotter::ChartPlotter;
