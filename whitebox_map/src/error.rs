// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::string::String;

/// Errors reported by map operations.
///
/// Hit tests outside every raster are not errors; they produce a sentinel
/// (see [`GridCell::NONE`](crate::GridCell::NONE)).
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    /// A data source named by a layer or project entry could not be opened.
    #[error("data source not found: {0}")]
    SourceNotFound(String),
    /// No layer has the given overlay number.
    #[error("no layer with overlay number {0}")]
    UnknownLayer(usize),
    /// A row/column pair lies outside the raster grid.
    #[error("cell ({row}, {column}) is outside the raster grid")]
    CellOutOfRange {
        /// Requested row.
        row: isize,
        /// Requested column.
        column: isize,
    },
    /// The source refuses single-cell writes.
    #[error("data source {0} is read-only")]
    ReadOnlySource(String),
    /// A project document could not be turned into a map.
    #[error("malformed project document: {0}")]
    MalformedProject(String),
    /// The operation needs a different kind of layer.
    #[error("layer {overlay} is not a {expected} layer")]
    UnsupportedLayerType {
        /// Overlay number of the offending layer.
        overlay: usize,
        /// Kind of layer the operation needs.
        expected: &'static str,
    },
}

/// Result alias for map operations.
pub type Result<T, E = MapError> = core::result::Result<T, E>;
