//! Turn records into the text tables printed each cycle.
//!
//! Columns of the node table are the variants of [`Column`], grouped into [`Category`]s. Which
//! ones are shown, and in which order, is decided once by [`Layout::new`] from the selected
//! categories and the configured thread pools; rows are produced by walking the resolved layout,
//! never by looking columns up by name. [`Renderer`] prints the cluster header and the node table
//! to any [`Write`](std::io::Write).

mod category;
mod column;
mod table;

#[rustfmt::skip]
pub use {
  category::Category,
  column::Align,
  column::Column,
  table::health_rows,
  table::Layout,
  table::Renderer,
};
