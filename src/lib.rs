// Public library interface for treemap-rs
// The binaries in src/main.rs and src/bin use these modules

pub mod chart;
pub mod colors;
pub mod config;
pub mod demo;
pub mod error;
pub mod layout;
pub mod scale;
pub mod tree;

pub use error::{Result, TreemapError};
pub use layout::{compute_layout, Layout, LayoutConfig, LayoutRect, Treemap};
pub use tree::arena::{Cell, NodeId, NodeTree, TreeNode};
