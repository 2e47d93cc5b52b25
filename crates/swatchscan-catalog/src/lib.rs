// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// swatchscan-catalog — From recognized text and sampled colors to catalog
// records: label interpretation, ground-truth repair of the reference palette,
// and nearest-color matching.

pub mod interpreter;
pub mod matcher;
pub mod palette;
pub mod validator;

pub use interpreter::{
    ReferenceText, SwatchText, TextInterpreter, parse_reference_text, parse_swatch_text,
    split_lines,
};
pub use matcher::ColorMatcher;
pub use palette::ExpectedPalette;
pub use validator::{ReferenceValidator, ValidationReport};
