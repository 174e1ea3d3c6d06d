//! Anchored placement solver for floating overlays.
//!
//! [`compute_position`] is pure: it never measures anything itself. Callers snapshot the trigger
//! box, the overlay size, and the viewport, and receive fixed-position coordinates plus the side
//! that was actually used after the single opposite-side flip.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Gap (in px) kept between a clamped overlay and the viewport edges.
pub const VIEWPORT_PADDING: f64 = 8.0;
/// Default distance (in px) between trigger and overlay.
pub const DEFAULT_OFFSET: f64 = 8.0;
/// Width used for an overlay that has not been painted yet.
pub const ESTIMATED_OVERLAY_WIDTH: f64 = 220.0;
/// Height used for an overlay that has not been painted yet.
pub const ESTIMATED_OVERLAY_HEIGHT: f64 = 160.0;

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Snapshot of an element's bounding box in viewport coordinates.
pub struct Rect {
    /// Distance from the viewport top edge.
    pub top: f64,
    /// Distance from the viewport left edge.
    pub left: f64,
    /// Box width.
    pub width: f64,
    /// Box height.
    pub height: f64,
    /// `left + width`.
    pub right: f64,
    /// `top + height`.
    pub bottom: f64,
}

impl Rect {
    /// Builds a rect from its origin and size, deriving `right`/`bottom`.
    ///
    /// Non-finite inputs become `0` and negative sizes collapse to `0`.
    pub fn new(top: f64, left: f64, width: f64, height: f64) -> Self {
        let top = finite_or_zero(top);
        let left = finite_or_zero(left);
        let width = finite_or_zero(width).max(0.0);
        let height = finite_or_zero(height).max(0.0);
        Self {
            top,
            left,
            width,
            height,
            right: left + width,
            bottom: top + height,
        }
    }

    /// A zero-size rect at the given viewport point.
    pub fn point(left: f64, top: f64) -> Self {
        Self::new(top, left, 0.0, 0.0)
    }

    /// Re-derives the rect from `top`/`left`/`width`/`height`, discarding any inconsistent or
    /// non-finite `right`/`bottom` values.
    pub fn normalized(self) -> Self {
        Self::new(self.top, self.left, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Width and height of a floating overlay.
pub struct Size {
    /// Width in px.
    pub width: f64,
    /// Height in px.
    pub height: f64,
}

impl Size {
    /// Creates a size without validation.
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// The estimate used before the overlay has a measurable size.
    pub const fn estimate() -> Self {
        Self::new(ESTIMATED_OVERLAY_WIDTH, ESTIMATED_OVERLAY_HEIGHT)
    }

    /// Substitutes the estimate for each dimension that is zero, negative, or non-finite.
    pub fn measured_or_estimate(self) -> Self {
        let pick = |value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                fallback
            }
        };
        Self {
            width: pick(self.width, ESTIMATED_OVERLAY_WIDTH),
            height: pick(self.height, ESTIMATED_OVERLAY_HEIGHT),
        }
    }
}

impl Default for Size {
    fn default() -> Self {
        Self::estimate()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Visible viewport dimensions and the edge padding applied while clamping.
pub struct Viewport {
    /// Viewport width in px.
    pub width: f64,
    /// Viewport height in px.
    pub height: f64,
    /// Minimum gap kept between an overlay and the viewport edges.
    pub padding: f64,
}

impl Viewport {
    /// Viewport with the default [`VIEWPORT_PADDING`].
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: finite_or_zero(width).max(0.0),
            height: finite_or_zero(height).max(0.0),
            padding: VIEWPORT_PADDING,
        }
    }

    /// Replaces the clamp padding.
    pub fn with_padding(self, padding: f64) -> Self {
        Self {
            padding: finite_or_zero(padding).max(0.0),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
/// Errors raised while parsing placement tokens.
pub enum PlacementError {
    /// The side token was not one of `top`, `right`, `bottom`, `left`.
    #[error("unknown placement side `{0}`")]
    UnknownSide(String),
    /// The align token was not one of `start`, `center`, `end`.
    #[error("unknown placement align `{0}`")]
    UnknownAlign(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Primary edge of the trigger an overlay is placed against.
pub enum Side {
    /// Above the trigger.
    Top,
    /// Right of the trigger.
    Right,
    /// Below the trigger.
    #[default]
    Bottom,
    /// Left of the trigger.
    Left,
}

impl Side {
    /// The directly opposite side.
    pub fn opposite(self) -> Self {
        match self {
            Self::Top => Self::Bottom,
            Self::Right => Self::Left,
            Self::Bottom => Self::Top,
            Self::Left => Self::Right,
        }
    }

    /// Whether the overlay sits above or below the trigger (vertical primary axis).
    pub fn is_vertical(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }

    /// Stable DOM token, used for `data-ui-side`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Right => "right",
            Self::Bottom => "bottom",
            Self::Left => "left",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Side {
    type Err = PlacementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "right" => Ok(Self::Right),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            _ => Err(PlacementError::UnknownSide(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
/// Cross-axis alignment relative to the trigger.
pub enum Align {
    /// Leading edges aligned.
    #[default]
    Start,
    /// Midpoints aligned.
    Center,
    /// Trailing edges aligned.
    End,
}

impl Align {
    /// Stable DOM token, used for `data-ui-align`.
    pub fn token(self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Center => "center",
            Self::End => "end",
        }
    }
}

impl fmt::Display for Align {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for Align {
    type Err = PlacementError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "start" => Ok(Self::Start),
            "center" => Ok(Self::Center),
            "end" => Ok(Self::End),
            _ => Err(PlacementError::UnknownAlign(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
/// Caller-supplied placement preferences.
pub struct PlacementRequest {
    /// Preferred side.
    pub side: Side,
    /// Cross-axis alignment.
    pub align: Align,
    /// Gap between trigger and overlay, in px.
    pub offset: f64,
    /// Size the overlay to the trigger width.
    pub match_trigger_width: bool,
}

impl PlacementRequest {
    /// Request for `side`/`align` with the default offset.
    pub fn new(side: Side, align: Align) -> Self {
        Self {
            side,
            align,
            ..Self::default()
        }
    }

    /// Replaces the trigger gap.
    pub fn with_offset(self, offset: f64) -> Self {
        Self { offset, ..self }
    }

    /// Enables or disables trigger-width matching.
    pub fn with_trigger_width(self, match_trigger_width: bool) -> Self {
        Self {
            match_trigger_width,
            ..self
        }
    }
}

impl Default for PlacementRequest {
    fn default() -> Self {
        Self {
            side: Side::Bottom,
            align: Align::Start,
            offset: DEFAULT_OFFSET,
            match_trigger_width: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
/// Solver output for a single placement pass.
pub struct ResolvedPlacement {
    /// Fixed-position top coordinate.
    pub top: f64,
    /// Fixed-position left coordinate.
    pub left: f64,
    /// Forced overlay width when the request matches the trigger width.
    pub width: Option<f64>,
    /// Side used after flipping.
    pub actual_side: Side,
}

impl ResolvedPlacement {
    /// Inline CSS declarations for a portaled overlay element.
    pub fn to_css(&self) -> String {
        let mut css = format!(
            "position:fixed;top:{}px;left:{}px;",
            self.top.round(),
            self.left.round()
        );
        if let Some(width) = self.width {
            css.push_str(&format!("width:{}px;", width.round()));
        }
        css
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// Room between the trigger and each viewport edge. Values are negative when the trigger itself
/// sits past that edge.
pub struct AvailableSpace {
    /// Space above the trigger.
    pub top: f64,
    /// Space right of the trigger.
    pub right: f64,
    /// Space below the trigger.
    pub bottom: f64,
    /// Space left of the trigger.
    pub left: f64,
}

impl AvailableSpace {
    /// Measures the four gaps for `trigger` inside `viewport`.
    pub fn around(trigger: Rect, viewport: Viewport) -> Self {
        Self {
            top: trigger.top,
            right: viewport.width - trigger.right,
            bottom: viewport.height - trigger.bottom,
            left: trigger.left,
        }
    }

    /// Space on `side`.
    pub fn on(&self, side: Side) -> f64 {
        match side {
            Side::Top => self.top,
            Side::Right => self.right,
            Side::Bottom => self.bottom,
            Side::Left => self.left,
        }
    }
}

/// Picks the side to use: the requested one, or its opposite when the requested side cannot
/// fit `extent + offset` and the opposite has strictly more room.
pub fn resolve_side(requested: Side, space: &AvailableSpace, extent: f64, offset: f64) -> Side {
    let here = space.on(requested);
    let there = space.on(requested.opposite());
    if here < extent + offset && there > here {
        requested.opposite()
    } else {
        requested
    }
}

fn align_on_axis(start: f64, length: f64, overlay_length: f64, align: Align) -> f64 {
    match align {
        Align::Start => start,
        Align::Center => start + length / 2.0 - overlay_length / 2.0,
        Align::End => start + length - overlay_length,
    }
}

/// Unclamped `(top, left)` for an overlay of `overlay` size placed on `side` of `trigger`.
pub fn anchor_point(trigger: Rect, overlay: Size, side: Side, align: Align, offset: f64) -> (f64, f64) {
    match side {
        Side::Bottom => (
            trigger.bottom + offset,
            align_on_axis(trigger.left, trigger.width, overlay.width, align),
        ),
        Side::Top => (
            trigger.top - overlay.height - offset,
            align_on_axis(trigger.left, trigger.width, overlay.width, align),
        ),
        Side::Right => (
            align_on_axis(trigger.top, trigger.height, overlay.height, align),
            trigger.right + offset,
        ),
        Side::Left => (
            align_on_axis(trigger.top, trigger.height, overlay.height, align),
            trigger.left - overlay.width - offset,
        ),
    }
}

/// Clamps `value` into `[padding, viewport_extent - overlay_extent - padding]`, falling back to
/// `padding` when that range is empty.
pub fn clamp_to_viewport(value: f64, viewport_extent: f64, overlay_extent: f64, padding: f64) -> f64 {
    let padding = finite_or_zero(padding).max(0.0);
    let max = viewport_extent - overlay_extent - padding;
    if max.is_nan() || max < padding {
        return padding;
    }
    finite_or_zero(value).clamp(padding, max)
}

/// Computes the fixed-position placement of an overlay anchored to `trigger`.
pub fn compute_position(
    trigger: Rect,
    overlay: Size,
    viewport: Viewport,
    request: &PlacementRequest,
) -> ResolvedPlacement {
    let viewport = Viewport::new(viewport.width, viewport.height).with_padding(viewport.padding);
    let trigger = trigger.normalized();
    let offset = finite_or_zero(request.offset);
    let mut overlay = overlay.measured_or_estimate();
    let forced_width = if request.match_trigger_width && trigger.width > 0.0 {
        overlay.width = trigger.width;
        Some(trigger.width)
    } else {
        None
    };

    let space = AvailableSpace::around(trigger, viewport);
    let extent = if request.side.is_vertical() {
        overlay.height
    } else {
        overlay.width
    };
    let side = resolve_side(request.side, &space, extent, offset);
    let (top, left) = anchor_point(trigger, overlay, side, request.align, offset);

    ResolvedPlacement {
        top: clamp_to_viewport(top, viewport.height, overlay.height, viewport.padding),
        left: clamp_to_viewport(left, viewport.width, overlay.width, viewport.padding),
        width: forced_width,
        actual_side: side,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn request(side: Side, align: Align) -> PlacementRequest {
        PlacementRequest::new(side, align)
    }

    #[test]
    fn flips_to_top_when_bottom_is_cramped() {
        let trigger = Rect::new(700.0, 100.0, 80.0, 30.0);
        let placed = compute_position(
            trigger,
            Size::new(220.0, 160.0),
            Viewport::new(800.0, 768.0),
            &request(Side::Bottom, Align::Start),
        );

        assert_eq!(
            placed,
            ResolvedPlacement {
                top: 532.0,
                left: 100.0,
                width: None,
                actual_side: Side::Top,
            }
        );
    }

    #[test]
    fn keeps_requested_side_when_it_fits() {
        let placed = compute_position(
            Rect::new(100.0, 100.0, 80.0, 30.0),
            Size::new(220.0, 160.0),
            Viewport::new(800.0, 768.0),
            &request(Side::Bottom, Align::Start),
        );
        assert_eq!(placed.actual_side, Side::Bottom);
        assert_eq!(placed.top, 138.0);
        assert_eq!(placed.left, 100.0);
    }

    #[test]
    fn does_not_flip_when_opposite_is_not_roomier() {
        // 60px above, 60px below: neither fits, so the request wins.
        let trigger = Rect::new(60.0, 100.0, 80.0, 30.0);
        let placed = compute_position(
            trigger,
            Size::new(220.0, 160.0),
            Viewport::new(800.0, 150.0),
            &request(Side::Top, Align::Start),
        );
        assert_eq!(placed.actual_side, Side::Top);
    }

    #[test]
    fn flips_top_to_bottom_and_left_to_right() {
        let near_top = Rect::new(20.0, 300.0, 80.0, 30.0);
        let placed = compute_position(
            near_top,
            Size::new(200.0, 100.0),
            Viewport::new(800.0, 600.0),
            &request(Side::Top, Align::Start),
        );
        assert_eq!(placed.actual_side, Side::Bottom);
        assert_eq!(placed.top, 58.0);

        let near_left = Rect::new(300.0, 30.0, 40.0, 40.0);
        let placed = compute_position(
            near_left,
            Size::new(200.0, 100.0),
            Viewport::new(800.0, 600.0),
            &request(Side::Left, Align::Start),
        );
        assert_eq!(placed.actual_side, Side::Right);
        assert_eq!(placed.left, 78.0);
        assert_eq!(placed.top, 300.0);
    }

    #[test]
    fn flips_right_to_left_near_the_right_edge() {
        let trigger = Rect::new(300.0, 700.0, 40.0, 40.0);
        let placed = compute_position(
            trigger,
            Size::new(200.0, 100.0),
            Viewport::new(800.0, 600.0),
            &request(Side::Right, Align::Center),
        );
        assert_eq!(placed.actual_side, Side::Left);
        assert_eq!(placed.left, 492.0);
        assert_eq!(placed.top, 270.0);
    }

    #[test]
    fn never_flips_to_a_perpendicular_side() {
        // No room above or below, plenty to the right.
        let trigger = Rect::new(10.0, 10.0, 40.0, 80.0);
        let placed = compute_position(
            trigger,
            Size::new(100.0, 100.0),
            Viewport::new(800.0, 100.0),
            &request(Side::Bottom, Align::Start),
        );
        assert!(placed.actual_side.is_vertical(), "side={:?}", placed.actual_side);
    }

    #[test]
    fn center_alignment_matches_midpoints_before_clamping() {
        let trigger = Rect::new(200.0, 300.0, 120.0, 30.0);
        let overlay = Size::new(220.0, 160.0);
        let (_, left) = anchor_point(trigger, overlay, Side::Bottom, Align::Center, 8.0);
        assert_eq!(left + overlay.width / 2.0, trigger.left + trigger.width / 2.0);

        let placed = compute_position(
            trigger,
            overlay,
            Viewport::new(1200.0, 900.0),
            &request(Side::Bottom, Align::Center),
        );
        assert_eq!(placed.left, left);
    }

    #[test]
    fn end_alignment_matches_trailing_edges() {
        let trigger = Rect::new(200.0, 500.0, 120.0, 30.0);
        let placed = compute_position(
            trigger,
            Size::new(220.0, 160.0),
            Viewport::new(1200.0, 900.0),
            &request(Side::Bottom, Align::End),
        );
        assert_eq!(placed.left + 220.0, trigger.right);

        let (top, _) = anchor_point(trigger, Size::new(80.0, 50.0), Side::Left, Align::End, 4.0);
        assert_eq!(top + 50.0, trigger.bottom);
    }

    #[test]
    fn coordinates_stay_inside_padded_viewport() {
        let viewport = Viewport::new(640.0, 480.0);
        let overlay = Size::new(180.0, 120.0);
        let sides = [Side::Top, Side::Right, Side::Bottom, Side::Left];
        let aligns = [Align::Start, Align::Center, Align::End];

        for top in (-100..=600).step_by(37) {
            for left in (-100..=760).step_by(41) {
                let trigger = Rect::new(f64::from(top), f64::from(left), 60.0, 24.0);
                for side in sides {
                    for align in aligns {
                        let placed =
                            compute_position(trigger, overlay, viewport, &request(side, align));
                        assert!(
                            placed.top >= 8.0 && placed.top <= 480.0 - 120.0 - 8.0,
                            "top={} trigger={trigger:?} side={side} align={align}",
                            placed.top
                        );
                        assert!(
                            placed.left >= 8.0 && placed.left <= 640.0 - 180.0 - 8.0,
                            "left={} trigger={trigger:?} side={side} align={align}",
                            placed.left
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn oversized_overlay_clamps_to_padding() {
        let placed = compute_position(
            Rect::new(100.0, 100.0, 40.0, 20.0),
            Size::new(900.0, 700.0),
            Viewport::new(400.0, 300.0),
            &request(Side::Bottom, Align::Center),
        );
        assert_eq!(placed.top, 8.0);
        assert_eq!(placed.left, 8.0);
    }

    #[test]
    fn zero_size_trigger_is_treated_as_a_point() {
        let placed = compute_position(
            Rect::point(200.0, 150.0),
            Size::new(100.0, 60.0),
            Viewport::new(800.0, 600.0),
            &request(Side::Bottom, Align::Center),
        );
        assert_eq!(placed.top, 158.0);
        assert_eq!(placed.left, 150.0);
        assert_eq!(placed.actual_side, Side::Bottom);
    }

    #[test]
    fn unmeasured_overlay_uses_the_estimate() {
        let trigger = Rect::new(100.0, 100.0, 80.0, 30.0);
        let viewport = Viewport::new(800.0, 768.0);
        let req = request(Side::Bottom, Align::End);

        let unmeasured = compute_position(trigger, Size::new(0.0, f64::NAN), viewport, &req);
        let estimated = compute_position(trigger, Size::estimate(), viewport, &req);
        assert_eq!(unmeasured, estimated);
        assert!(unmeasured.top.is_finite() && unmeasured.left.is_finite());
    }

    #[test]
    fn non_finite_trigger_values_never_leak_nan() {
        let trigger = Rect {
            top: f64::NAN,
            left: f64::INFINITY,
            width: 40.0,
            height: f64::NEG_INFINITY,
            right: f64::NAN,
            bottom: f64::NAN,
        };
        let placed = compute_position(
            trigger,
            Size::new(100.0, 60.0),
            Viewport::new(f64::NAN, 600.0),
            &PlacementRequest::default().with_offset(f64::NAN),
        );
        assert!(placed.top.is_finite());
        assert!(placed.left.is_finite());
    }

    #[test]
    fn hand_built_non_finite_viewport_never_panics() {
        let viewport = Viewport {
            width: f64::NAN,
            height: 600.0,
            padding: VIEWPORT_PADDING,
        };
        let placed = compute_position(
            Rect::new(100.0, 100.0, 40.0, 20.0),
            Size::new(100.0, 60.0),
            viewport,
            &PlacementRequest::default(),
        );
        assert_eq!(placed.left, VIEWPORT_PADDING);
        assert!(placed.top.is_finite());

        let unbounded = Viewport {
            width: f64::INFINITY,
            height: f64::NEG_INFINITY,
            padding: f64::NAN,
        };
        let placed = compute_position(
            Rect::new(100.0, 100.0, 40.0, 20.0),
            Size::new(100.0, 60.0),
            unbounded,
            &PlacementRequest::default(),
        );
        assert!(placed.top.is_finite() && placed.left.is_finite());
    }

    #[test]
    fn clamp_falls_back_to_padding_for_nan_extents() {
        assert_eq!(clamp_to_viewport(50.0, f64::NAN, 100.0, 8.0), 8.0);
        assert_eq!(clamp_to_viewport(f64::NAN, 800.0, 100.0, 8.0), 8.0);
        assert_eq!(clamp_to_viewport(50.0, 800.0, 100.0, 8.0), 50.0);
    }

    #[test]
    fn matching_trigger_width_reports_and_uses_trigger_width() {
        let trigger = Rect::new(100.0, 760.0, 300.0, 32.0);
        let placed = compute_position(
            trigger,
            Size::new(120.0, 200.0),
            Viewport::new(1024.0, 768.0),
            &PlacementRequest::default().with_trigger_width(true),
        );
        assert_eq!(placed.width, Some(300.0));
        // Clamped against the matched width, not the measured one.
        assert_eq!(placed.left, 1024.0 - 300.0 - 8.0);
    }

    #[test]
    fn identical_inputs_produce_identical_outputs() {
        let trigger = Rect::new(321.5, 87.25, 44.0, 18.0);
        let req = request(Side::Left, Align::Center).with_offset(6.0);
        let first = compute_position(trigger, Size::new(150.0, 90.0), Viewport::new(500.0, 700.0), &req);
        for _ in 0..16 {
            let again =
                compute_position(trigger, Size::new(150.0, 90.0), Viewport::new(500.0, 700.0), &req);
            assert_eq!(again, first);
        }
    }

    #[test]
    fn css_contains_fixed_position_and_optional_width() {
        let placed = ResolvedPlacement {
            top: 532.0,
            left: 100.4,
            width: Some(240.0),
            actual_side: Side::Top,
        };
        assert_eq!(placed.to_css(), "position:fixed;top:532px;left:100px;width:240px;");
    }

    #[test]
    fn side_and_align_tokens_parse() {
        assert_eq!("Top".parse::<Side>(), Ok(Side::Top));
        assert_eq!(" end ".parse::<Align>(), Ok(Align::End));
        assert_eq!(
            "middle".parse::<Align>(),
            Err(PlacementError::UnknownAlign("middle".to_string()))
        );
        assert_eq!(Side::Left.opposite(), Side::Right);
    }

    #[test]
    fn partial_request_config_fills_defaults() {
        let req: PlacementRequest =
            serde_json::from_str(r#"{ "side": "right", "matchTriggerWidth": true }"#)
                .expect("parse request");
        assert_eq!(
            req,
            PlacementRequest {
                side: Side::Right,
                align: Align::Start,
                offset: DEFAULT_OFFSET,
                match_trigger_width: true,
            }
        );
    }
}
