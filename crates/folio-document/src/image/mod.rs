// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — data URI decoding and raster header validation.

pub mod data_uri;
pub mod raster;

pub use data_uri::{ImageDataUri, ImageSubtype};
pub use raster::{RasterFormat, RasterImage};
