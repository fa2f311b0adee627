// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Whitebox Extent: world-space bounding boxes.
//!
//! Every map layer carries a *full extent* (the footprint of its data) and a
//! *current extent* (the part of it that is visible). The map itself carries a
//! view extent and a history of past view extents. All of them are
//! [`BoundingBox`] values:
//! - Axis-aligned, in world (geographic or projected) units.
//! - Normalized on construction so that `min <= max` on both axes.
//! - Plain `Copy` values; storing one never aliases another.
//!
//! Source data does not always run north-up and east-right. Rather than
//! letting every consumer cope with reversed boxes, the direction of the
//! source axes is recorded once in an [`Orientation`] when the box is built
//! from raw edges.
//!
//! ## Minimal example
//!
//! ```rust
//! use whitebox_extent::BoundingBox;
//!
//! let dem = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
//! let view = BoundingBox::new(50.0, -20.0, 150.0, 40.0);
//!
//! assert!(dem.does_intersect(&view));
//! let visible = dem.intersect(&view);
//! assert_eq!(visible, BoundingBox::new(50.0, 0.0, 100.0, 40.0));
//! ```
//!
//! ## Null boxes
//!
//! [`BoundingBox::NULL`] (also the [`Default`]) has `min = +inf` and
//! `max = -inf`. It is the identity for [`BoundingBox::union`], which makes
//! it the natural seed when reducing many layer extents into a full extent:
//!
//! ```rust
//! use whitebox_extent::BoundingBox;
//!
//! let layers = [
//!     BoundingBox::new(0.0, 0.0, 10.0, 10.0),
//!     BoundingBox::new(-5.0, 2.0, 3.0, 30.0),
//! ];
//! let full = layers.iter().fold(BoundingBox::NULL, |acc, b| acc.union(b));
//! assert_eq!(full, BoundingBox::new(-5.0, 0.0, 10.0, 30.0));
//! ```
//!
//! This crate is `no_std`.

#![no_std]

mod bounding_box;
mod orientation;

pub use bounding_box::BoundingBox;
pub use orientation::Orientation;
