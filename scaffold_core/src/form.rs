//! # Form Input Adapter
//!
//! Translates the user-facing form (free-text numeric fields, one boundary
//! toggle per compass side) into a [`ScaffoldInput`].
//!
//! ## Rules
//!
//! - Blank or absent numbers become 0; an absent target margin becomes 900
//! - Decimals are rounded to the nearest millimetre
//! - A boundary is `None` while its toggle is off, whatever the distance text
//!   says; a toggled-on boundary with a blank distance is 0
//! - Roof shape accepts `flat`, `sloped`, `deck` in any case; absent is flat
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::form::{FormInput, SideForm};
//!
//! let form = FormInput {
//!     width_ns: Some("10010".into()),
//!     width_ew: Some("9100".into()),
//!     north: SideForm::with_boundary("500", "640"),
//!     standard_height: Some("6000".into()),
//!     ..FormInput::default()
//! };
//!
//! let input = form.to_input().unwrap();
//! assert_eq!(input.boundary_n, Some(640));
//! assert_eq!(input.boundary_e, None);
//! assert_eq!(input.target_margin, 900);
//! ```

use serde::{Deserialize, Serialize};

use crate::calculations::{RoofShape, ScaffoldInput, DEFAULT_TARGET_MARGIN_MM};
use crate::errors::{CalcError, CalcResult};

/// Form fields for one compass side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SideForm {
    /// Eave overhang text (mm)
    pub eaves: Option<String>,

    /// Whether a site boundary applies on this side
    pub has_boundary: bool,

    /// Boundary distance text (mm); ignored unless `has_boundary`
    pub boundary: Option<String>,
}

impl SideForm {
    /// Side with eaves and no boundary
    pub fn eaves_only(eaves: impl Into<String>) -> Self {
        SideForm {
            eaves: Some(eaves.into()),
            has_boundary: false,
            boundary: None,
        }
    }

    /// Side with eaves and an active boundary
    pub fn with_boundary(eaves: impl Into<String>, boundary: impl Into<String>) -> Self {
        SideForm {
            eaves: Some(eaves.into()),
            has_boundary: true,
            boundary: Some(boundary.into()),
        }
    }
}

/// Raw calculation form as submitted by the UI.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInput {
    #[serde(rename = "widthNS")]
    pub width_ns: Option<String>,
    #[serde(rename = "widthEW")]
    pub width_ew: Option<String>,

    pub north: SideForm,
    pub east: SideForm,
    pub south: SideForm,
    pub west: SideForm,

    pub standard_height: Option<String>,
    pub roof_shape: Option<String>,
    pub tie_column: bool,
    pub railing_count: Option<String>,

    #[serde(rename = "use355NS")]
    pub use_355_ns: Option<String>,
    #[serde(rename = "use300NS")]
    pub use_300_ns: Option<String>,
    #[serde(rename = "use150NS")]
    pub use_150_ns: Option<String>,
    #[serde(rename = "use355EW")]
    pub use_355_ew: Option<String>,
    #[serde(rename = "use300EW")]
    pub use_300_ew: Option<String>,
    #[serde(rename = "use150EW")]
    pub use_150_ew: Option<String>,

    pub target_margin: Option<String>,
}

impl FormInput {
    /// Convert the form into an engine input.
    ///
    /// Only unparsable text is rejected; range checks are left to
    /// [`ScaffoldInput::validate`].
    pub fn to_input(&self) -> CalcResult<ScaffoldInput> {
        let roof_shape = match non_blank(&self.roof_shape) {
            Some(text) => text
                .parse::<RoofShape>()
                .map_err(|reason| CalcError::invalid_input("roofShape", text, reason))?,
            None => RoofShape::Flat,
        };

        let railing_count = parse_count("railingCount", &self.railing_count)?;
        let railing_count = u8::try_from(railing_count).map_err(|_| {
            CalcError::invalid_input("railingCount", railing_count.to_string(), "Must be between 0 and 3")
        })?;

        let target_margin = match non_blank(&self.target_margin) {
            Some(_) => parse_mm("targetMargin", &self.target_margin)?,
            None => DEFAULT_TARGET_MARGIN_MM,
        };

        Ok(ScaffoldInput {
            width_ns: parse_mm("widthNS", &self.width_ns)?,
            width_ew: parse_mm("widthEW", &self.width_ew)?,
            eaves_n: parse_mm("eavesN", &self.north.eaves)?,
            eaves_e: parse_mm("eavesE", &self.east.eaves)?,
            eaves_s: parse_mm("eavesS", &self.south.eaves)?,
            eaves_w: parse_mm("eavesW", &self.west.eaves)?,
            boundary_n: parse_boundary("boundaryN", &self.north)?,
            boundary_e: parse_boundary("boundaryE", &self.east)?,
            boundary_s: parse_boundary("boundaryS", &self.south)?,
            boundary_w: parse_boundary("boundaryW", &self.west)?,
            standard_height: parse_mm("standardHeight", &self.standard_height)?,
            roof_shape,
            tie_column: self.tie_column,
            railing_count,
            use_355_ns: parse_count("use355NS", &self.use_355_ns)?,
            use_300_ns: parse_count("use300NS", &self.use_300_ns)?,
            use_150_ns: parse_count("use150NS", &self.use_150_ns)?,
            use_355_ew: parse_count("use355EW", &self.use_355_ew)?,
            use_300_ew: parse_count("use300EW", &self.use_300_ew)?,
            use_150_ew: parse_count("use150EW", &self.use_150_ew)?,
            target_margin,
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Millimetre field; blank is 0, decimals round to the nearest mm
fn parse_mm(field: &str, value: &Option<String>) -> CalcResult<i64> {
    let Some(text) = non_blank(value) else {
        return Ok(0);
    };
    let number: f64 = text
        .parse()
        .map_err(|_| CalcError::invalid_input(field, text, "Not a number"))?;
    if !number.is_finite() || number.abs() > 1.0e12 {
        return Err(CalcError::invalid_input(field, text, "Out of range"));
    }
    Ok(number.round() as i64)
}

/// Whole, non-negative count field; blank is 0
fn parse_count(field: &str, value: &Option<String>) -> CalcResult<u32> {
    let Some(text) = non_blank(value) else {
        return Ok(0);
    };
    text.parse::<u32>()
        .map_err(|_| CalcError::invalid_input(field, text, "Must be a whole number of 0 or more"))
}

fn parse_boundary(field: &str, side: &SideForm) -> CalcResult<Option<i64>> {
    if !side.has_boundary {
        return Ok(None);
    }
    parse_mm(field, &side.boundary).map(Some)
}
