//! Position-computation strategies for containers.
//!
//! A layout maps a slot count and a container area onto one local position
//! per slot. Empty slots get a position too, so a card later dropped into a
//! placeholder animates toward a sensible spot.
//!
//! Layouts must be pure: the layer calls them freely while computing
//! layout and animation targets.

use std::f32::consts::{FRAC_PI_2, TAU};

use serde::{Deserialize, Serialize};

use crate::actors::CardActor;
use crate::core::Vec2;

/// Alignment of content along the main axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Align {
    Start,
    #[default]
    Center,
    End,
}

impl Align {
    /// Offset of content of length `content` inside a span of length `span`.
    #[must_use]
    pub fn offset(self, span: f32, content: f32) -> f32 {
        match self {
            Align::Start => 0.0,
            Align::Center => (span - content) / 2.0,
            Align::End => span - content,
        }
    }
}

/// Strategy computing target positions for a container's slots.
pub trait CardLayout: std::fmt::Debug {
    /// One local position per slot, lower corner of the card.
    fn slot_positions(&self, slot_count: usize, area: Vec2, card_size: Vec2) -> Vec<Vec2>;

    /// Fixed-capacity layouts only allow replacing slots.
    fn is_fixed_capacity(&self) -> bool {
        false
    }

    /// Piles draw only their top card at rest.
    fn shows_single_card(&self) -> bool {
        false
    }

    /// Extra offset applied to highlighted actors.
    fn highlight_offset(&self) -> Vec2 {
        Vec2::ZERO
    }

    /// Slot index for a dragged group at `point` (local space).
    ///
    /// `None` means the layout does not support in-place rearrangement.
    fn insertion_index(
        &self,
        _point: Vec2,
        _slot_count: usize,
        _area: Vec2,
        _card_size: Vec2,
    ) -> Option<usize> {
        None
    }

    /// Called once a batch has placed every actor of the container.
    fn on_animation_end(&self, slots: &mut [Option<CardActor>]) {
        for actor in slots.iter_mut().flatten() {
            actor.visible = true;
        }
    }
}

/// Linear fan of cards, as used for hands.
///
/// Spacing between neighbouring cards is the largest value in
/// `[min_spacing, max_spacing]` that fits the area. Negative spacing
/// overlaps cards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandLayout {
    pub min_spacing: f32,
    pub max_spacing: f32,
    pub align: Align,
    /// Space reserved before the first card.
    pub clip_start: f32,
    /// Space reserved after the last card.
    pub clip_end: f32,
    pub highlight_offset: Vec2,
}

impl Default for HandLayout {
    fn default() -> Self {
        Self {
            min_spacing: -40.0,
            max_spacing: 8.0,
            align: Align::Center,
            clip_start: 0.0,
            clip_end: 0.0,
            highlight_offset: Vec2::new(0.0, 20.0),
        }
    }
}

impl HandLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_spacing(mut self, min: f32, max: f32) -> Self {
        self.min_spacing = min;
        self.max_spacing = max.max(min);
        self
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    #[must_use]
    pub fn with_clip(mut self, start: f32, end: f32) -> Self {
        self.clip_start = start;
        self.clip_end = end;
        self
    }

    #[must_use]
    pub fn with_highlight_offset(mut self, offset: Vec2) -> Self {
        self.highlight_offset = offset;
        self
    }

    /// Gap between neighbouring cards for `n` cards in `available` width.
    fn spacing(&self, n: usize, available: f32, card_width: f32) -> f32 {
        if n < 2 {
            return 0.0;
        }
        let fit = (available - n as f32 * card_width) / (n - 1) as f32;
        fit.min(self.max_spacing).max(self.min_spacing)
    }
}

impl CardLayout for HandLayout {
    fn slot_positions(&self, slot_count: usize, area: Vec2, card_size: Vec2) -> Vec<Vec2> {
        if slot_count == 0 {
            return Vec::new();
        }

        let available = (area.x - self.clip_start - self.clip_end).max(0.0);
        let spacing = self.spacing(slot_count, available, card_size.x);
        let step = card_size.x + spacing;
        let total = slot_count as f32 * card_size.x + (slot_count - 1) as f32 * spacing;

        let x = self.clip_start + self.align.offset(available, total);
        let y = (area.y - card_size.y) / 2.0;

        (0..slot_count)
            .map(|i| Vec2::new(x + i as f32 * step, y))
            .collect()
    }

    fn highlight_offset(&self) -> Vec2 {
        self.highlight_offset
    }

    fn insertion_index(
        &self,
        point: Vec2,
        slot_count: usize,
        area: Vec2,
        card_size: Vec2,
    ) -> Option<usize> {
        let half = card_size.x / 2.0;
        let nearest = self
            .slot_positions(slot_count, area, card_size)
            .iter()
            .enumerate()
            .map(|(i, p)| (i, (p.x + half - point.x).abs()))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map_or(0, |(i, _)| i);
        Some(nearest)
    }
}

/// A single pile: every slot at the same position.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StackLayout {
    pub align: Align,
}

impl StackLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }
}

impl CardLayout for StackLayout {
    fn slot_positions(&self, slot_count: usize, area: Vec2, card_size: Vec2) -> Vec<Vec2> {
        let position = Vec2::new(
            self.align.offset(area.x, card_size.x),
            (area.y - card_size.y) / 2.0,
        );
        vec![position; slot_count]
    }

    fn shows_single_card(&self) -> bool {
        true
    }

    fn on_animation_end(&self, slots: &mut [Option<CardActor>]) {
        let top = slots.iter().rposition(Option::is_some);
        for (i, actor) in slots.iter_mut().enumerate() {
            if let Some(actor) = actor {
                actor.visible = Some(i) == top;
            }
        }
    }
}

/// Radius of a trick layout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum Radius {
    /// Largest radius keeping every card inside the area.
    #[default]
    Auto,
    Manual(f32),
}

/// Fixed-capacity circle of cards, as used for a trick in play.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrickLayout {
    pub radius: Radius,
    /// Angle of slot 0, in radians.
    pub start_angle: f32,
}

impl Default for TrickLayout {
    fn default() -> Self {
        Self {
            radius: Radius::Auto,
            start_angle: -FRAC_PI_2,
        }
    }
}

impl TrickLayout {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_radius(mut self, radius: Radius) -> Self {
        self.radius = radius;
        self
    }

    #[must_use]
    pub fn with_start_angle(mut self, radians: f32) -> Self {
        self.start_angle = radians;
        self
    }

    /// Radius used for the given area.
    #[must_use]
    pub fn resolved_radius(&self, area: Vec2, card_size: Vec2) -> f32 {
        match self.radius {
            Radius::Manual(r) => r,
            Radius::Auto => ((area.x - card_size.x).min(area.y - card_size.y) / 2.0).max(0.0),
        }
    }
}

impl CardLayout for TrickLayout {
    fn slot_positions(&self, slot_count: usize, area: Vec2, card_size: Vec2) -> Vec<Vec2> {
        let center = area * 0.5;
        let radius = self.resolved_radius(area, card_size);
        let half = card_size * 0.5;

        (0..slot_count)
            .map(|i| {
                let angle = self.start_angle + TAU * i as f32 / slot_count as f32;
                let offset = Vec2::new(radius * angle.cos(), radius * angle.sin());
                center + offset - half
            })
            .collect()
    }

    fn is_fixed_capacity(&self) -> bool {
        true
    }
}
