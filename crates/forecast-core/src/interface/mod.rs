//! Client-facing surface
//!
//! The session that drives submissions and the projector that turns its
//! state into renderable artifacts.

pub mod session;
pub mod view;

pub use session::ForecastSession;
pub use view::{
    ForecastTable, ImageBlock, MetadataPanel, StatusBanner, TableRow, View, humanize_amount,
    metadata_panel, project,
};
