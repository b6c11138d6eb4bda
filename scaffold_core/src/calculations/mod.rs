//! # Scaffold Calculations
//!
//! The dimension and parts-optimization engine. Layers, leaves first:
//!
//! - [`parts`] - Part catalogs, base width, combination search, span text
//! - [`margins`] - Left/right gap distribution under boundary limits
//! - [`span`] - Parts layout for one face
//! - [`face`] - One face: layout, margins, threshold correction
//! - [`staging`] - Vertical stages, jack-up height, tie-column reduction
//!
//! [`calc_all`] ties them together: it runs the north-south face and the
//! east-west face independently, then the vertical staging, and returns a
//! single [`ScaffoldResult`].
//!
//! The scaffold runs perpendicular to the wall it protects, so the
//! north-south face produces the east and west gaps and the east-west face
//! produces the north and south gaps.
//!
//! The engine is a pure function of its input: no I/O, no shared state,
//! safe to call from any number of threads at once. It never fails;
//! infeasible layouts show up as `tie_ok = false`, `(+N)` annotations, or
//! entries in [`ScaffoldResult::warnings`].
//!
//! ## Example
//!
//! ```rust
//! use scaffold_core::calculations::{calc_all, RoofShape, ScaffoldInput};
//!
//! let input = ScaffoldInput {
//!     width_ns: 10_010,
//!     width_ew: 9_100,
//!     eaves_n: 500,
//!     eaves_e: 500,
//!     eaves_s: 500,
//!     eaves_w: 500,
//!     boundary_n: Some(640),
//!     boundary_s: Some(600),
//!     standard_height: 6_000,
//!     roof_shape: RoofShape::Flat,
//!     tie_column: true,
//!     railing_count: 3,
//!     use_355_ns: 1,
//!     use_150_ns: 1,
//!     target_margin: 1_000,
//!     ..ScaffoldInput::default()
//! };
//!
//! let result = calc_all(&input);
//! assert_eq!(result.num_stages, 2);
//! assert_eq!(result.north_gap, "560 mm(+150)");
//! assert!(result.tie_ok);
//! ```

pub mod face;
pub mod margins;
pub mod parts;
pub mod span;
pub mod staging;

use serde::{Deserialize, Serialize};
use tracing::{debug_span, warn};

use crate::errors::{CalcError, CalcResult};
use crate::settings::EngineSettings;

// Re-export commonly used types
pub use face::{calculate_face_dimensions, FaceDimensions, FaceRequest, SpecialParts};
pub use margins::{calculate_initial_margins, Margins, SideLimits};
pub use span::{calculate_span_with_boundaries, SpanLayout, SpanRequest};
pub use staging::{calculate_staging, RoofShape, Staging};

/// Default target margin on each side (mm)
pub const DEFAULT_TARGET_MARGIN_MM: i64 = 900;

fn default_target_margin() -> i64 {
    DEFAULT_TARGET_MARGIN_MM
}

/// Input record for a scaffold calculation. All lengths in millimetres.
///
/// Field names in JSON follow the product's form keys (`widthNS`,
/// `boundaryE`, `use355NS`, ...). A boundary of `null` means no boundary
/// constraint on that side.
///
/// ## JSON Example
///
/// ```json
/// {
///   "widthNS": 10010, "widthEW": 9100,
///   "eavesN": 500, "eavesE": 500, "eavesS": 500, "eavesW": 500,
///   "boundaryN": 640, "boundaryE": null, "boundaryS": 600, "boundaryW": null,
///   "standardHeight": 6000,
///   "roofShape": "flat",
///   "tieColumn": true,
///   "railingCount": 3,
///   "use355NS": 1, "use300NS": 0, "use150NS": 1,
///   "use355EW": 0, "use300EW": 0, "use150EW": 0,
///   "targetMargin": 1000
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldInput {
    /// Building footprint along the north-south face
    #[serde(rename = "widthNS")]
    pub width_ns: i64,

    /// Building footprint along the east-west face
    #[serde(rename = "widthEW")]
    pub width_ew: i64,

    #[serde(rename = "eavesN", default)]
    pub eaves_n: i64,
    #[serde(rename = "eavesE", default)]
    pub eaves_e: i64,
    #[serde(rename = "eavesS", default)]
    pub eaves_s: i64,
    #[serde(rename = "eavesW", default)]
    pub eaves_w: i64,

    /// Distance to the site boundary; `None` when unconstrained
    #[serde(rename = "boundaryN", default)]
    pub boundary_n: Option<i64>,
    #[serde(rename = "boundaryE", default)]
    pub boundary_e: Option<i64>,
    #[serde(rename = "boundaryS", default)]
    pub boundary_s: Option<i64>,
    #[serde(rename = "boundaryW", default)]
    pub boundary_w: Option<i64>,

    /// Reference height driving the vertical staging
    #[serde(rename = "standardHeight")]
    pub standard_height: i64,

    #[serde(rename = "roofShape", default)]
    pub roof_shape: RoofShape,

    /// Request the tie-column height reduction
    #[serde(rename = "tieColumn", default)]
    pub tie_column: bool,

    /// Handrail units (0-3)
    #[serde(rename = "railingCount", default)]
    pub railing_count: u8,

    #[serde(rename = "use355NS", default)]
    pub use_355_ns: u32,
    #[serde(rename = "use300NS", default)]
    pub use_300_ns: u32,
    #[serde(rename = "use150NS", default)]
    pub use_150_ns: u32,
    #[serde(rename = "use355EW", default)]
    pub use_355_ew: u32,
    #[serde(rename = "use300EW", default)]
    pub use_300_ew: u32,
    #[serde(rename = "use150EW", default)]
    pub use_150_ew: u32,

    /// Desired gap on each unconstrained side
    #[serde(rename = "targetMargin", default = "default_target_margin")]
    pub target_margin: i64,
}

impl Default for ScaffoldInput {
    fn default() -> Self {
        ScaffoldInput {
            width_ns: 0,
            width_ew: 0,
            eaves_n: 0,
            eaves_e: 0,
            eaves_s: 0,
            eaves_w: 0,
            boundary_n: None,
            boundary_e: None,
            boundary_s: None,
            boundary_w: None,
            standard_height: 0,
            roof_shape: RoofShape::Flat,
            tie_column: false,
            railing_count: 0,
            use_355_ns: 0,
            use_300_ns: 0,
            use_150_ns: 0,
            use_355_ew: 0,
            use_300_ew: 0,
            use_150_ew: 0,
            target_margin: DEFAULT_TARGET_MARGIN_MM,
        }
    }
}

impl ScaffoldInput {
    /// Optional caller-side validation.
    ///
    /// [`calc_all`] does not call this; out-of-range input produces
    /// meaningless but well-formed output there.
    pub fn validate(&self) -> CalcResult<()> {
        let positive = [
            ("widthNS", self.width_ns),
            ("widthEW", self.width_ew),
            ("standardHeight", self.standard_height),
        ];
        for (field, value) in positive {
            if value <= 0 {
                return Err(CalcError::invalid_input(field, value.to_string(), "Must be positive"));
            }
        }

        let non_negative = [
            ("eavesN", Some(self.eaves_n)),
            ("eavesE", Some(self.eaves_e)),
            ("eavesS", Some(self.eaves_s)),
            ("eavesW", Some(self.eaves_w)),
            ("boundaryN", self.boundary_n),
            ("boundaryE", self.boundary_e),
            ("boundaryS", self.boundary_s),
            ("boundaryW", self.boundary_w),
            ("targetMargin", Some(self.target_margin)),
        ];
        for (field, value) in non_negative {
            if let Some(v) = value.filter(|v| *v < 0) {
                return Err(CalcError::invalid_input(field, v.to_string(), "Cannot be negative"));
            }
        }

        if self.railing_count > 3 {
            return Err(CalcError::invalid_input(
                "railingCount",
                self.railing_count.to_string(),
                "Must be between 0 and 3",
            ));
        }
        Ok(())
    }

    /// Special parts requested for the north-south face
    pub fn ns_specials(&self) -> SpecialParts {
        SpecialParts {
            use_355: self.use_355_ns,
            use_300: self.use_300_ns,
            use_150: self.use_150_ns,
        }
    }

    /// Special parts requested for the east-west face
    pub fn ew_specials(&self) -> SpecialParts {
        SpecialParts {
            use_355: self.use_355_ew,
            use_300: self.use_300_ew,
            use_150: self.use_150_ew,
        }
    }

    /// North-south face: east end on the left, west end on the right
    pub fn ns_face(&self) -> FaceRequest {
        FaceRequest {
            width: self.width_ns,
            eaves_left: self.eaves_e,
            eaves_right: self.eaves_w,
            boundary_left: self.boundary_e,
            boundary_right: self.boundary_w,
            specials: self.ns_specials(),
            target_margin: self.target_margin,
        }
    }

    /// East-west face: south end on the left, north end on the right
    pub fn ew_face(&self) -> FaceRequest {
        FaceRequest {
            width: self.width_ew,
            eaves_left: self.eaves_s,
            eaves_right: self.eaves_n,
            boundary_left: self.boundary_s,
            boundary_right: self.boundary_n,
            specials: self.ew_specials(),
            target_margin: self.target_margin,
        }
    }
}

/// Output record of a scaffold calculation.
///
/// The `*_gap` and `*_span_structure` strings are display text; they are
/// not meant to be parsed back into numbers.
///
/// ## JSON Example
///
/// ```json
/// {
///   "nsTotalSpan": 11905, "ewTotalSpan": 10200,
///   "nsSpanStructure": "6span, 600, 355, 150",
///   "ewSpanStructure": "(+150)5span, 1200(+150)",
///   "northGap": "560 mm(+150)", "southGap": "540 mm(+150)",
///   "eastGap": "947 mm", "westGap": "948 mm",
///   "numStages": 2, "modulesCount": 14,
///   "jackUpHeight": 370, "firstLayerHeight": 2400,
///   "tieOk": true, "tieColumnUsed": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScaffoldResult {
    #[serde(rename = "nsTotalSpan")]
    pub ns_total_span: i64,
    #[serde(rename = "ewTotalSpan")]
    pub ew_total_span: i64,

    #[serde(rename = "nsSpanStructure")]
    pub ns_span_structure: String,
    #[serde(rename = "ewSpanStructure")]
    pub ew_span_structure: String,

    #[serde(rename = "northGap")]
    pub north_gap: String,
    #[serde(rename = "southGap")]
    pub south_gap: String,
    #[serde(rename = "eastGap")]
    pub east_gap: String,
    #[serde(rename = "westGap")]
    pub west_gap: String,

    #[serde(rename = "numStages")]
    pub num_stages: i64,

    /// Total module count including railing and jack-reduction modules
    #[serde(rename = "modulesCount")]
    pub modules_count: i64,

    #[serde(rename = "jackUpHeight")]
    pub jack_up_height: i64,
    #[serde(rename = "firstLayerHeight")]
    pub first_layer_height: i64,

    /// Whether the requested tie-column reduction was feasible
    #[serde(rename = "tieOk")]
    pub tie_ok: bool,

    /// Echo of the tie-column request
    #[serde(rename = "tieColumnUsed")]
    pub tie_column_used: bool,

    /// Diagnostics, e.g. a face whose parts could not cover the building
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// Run the full calculation with default settings.
pub fn calc_all(input: &ScaffoldInput) -> ScaffoldResult {
    calc_all_with(input, &EngineSettings::default())
}

/// Run the full calculation with explicit engine settings.
pub fn calc_all_with(input: &ScaffoldInput, settings: &EngineSettings) -> ScaffoldResult {
    let ns = {
        let _span = debug_span!("face", axis = "NS").entered();
        calculate_face_dimensions(&input.ns_face(), settings)
    };
    let ew = {
        let _span = debug_span!("face", axis = "EW").entered();
        calculate_face_dimensions(&input.ew_face(), settings)
    };

    let staging = calculate_staging(
        input.standard_height,
        input.roof_shape,
        input.tie_column,
        input.railing_count,
        settings,
    );

    let mut warnings = Vec::new();
    for (axis, face, width) in [("NS", &ns, input.width_ns), ("EW", &ew, input.width_ew)] {
        if !face.layout.covers_width {
            warn!(axis, total_span = face.total_span, width, "span does not cover building width");
            warnings.push(format!(
                "{} span {} mm does not cover building width {} mm",
                axis, face.total_span, width
            ));
        }
    }

    ScaffoldResult {
        ns_total_span: ns.total_span,
        ew_total_span: ew.total_span,
        north_gap: ew.right_note,
        south_gap: ew.left_note,
        east_gap: ns.left_note,
        west_gap: ns.right_note,
        ns_span_structure: ns.span_text,
        ew_span_structure: ew.span_text,
        num_stages: staging.num_stages,
        modules_count: staging.modules_count,
        jack_up_height: staging.jack_up_height,
        first_layer_height: staging.first_layer_height,
        tie_ok: staging.tie_ok,
        tie_column_used: input.tie_column,
        warnings,
    }
}
