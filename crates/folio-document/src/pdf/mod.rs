// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — page inspection, overlay placement, image embedding, and
// signature compositing.

pub mod compositor;
pub mod embed;
pub mod placement;
pub mod reader;

pub use compositor::{Composite, CompositeReport, SignatureCompositor, SkipReason, bake_signatures};
pub use placement::{Placement, place_overlay};
pub use reader::PdfReader;
