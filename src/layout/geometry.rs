// Plane geometry shared by the force generators: a small 2D vector and an
// axis-aligned rectangle stored as min/max corners.

use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, MulAssign, Neg, Sub, SubAssign};

/// Vectors shorter than this normalize to zero instead of an arbitrary direction.
pub const NORMALIZE_EPS: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length_sq(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(self) -> f32 {
        self.length_sq().sqrt()
    }

    /// Unit vector in the same direction, or zero for a degenerate vector.
    pub fn normalized(self) -> Self {
        let len = self.length();
        if !len.is_finite() || len <= NORMALIZE_EPS {
            return Vec2::ZERO;
        }
        Vec2::new(self.x / len, self.y / len)
    }

    /// Direction scaled to `magnitude`; zero when the direction is degenerate.
    pub fn with_length(self, magnitude: f32) -> Self {
        self.normalized() * magnitude
    }

    pub fn is_near_zero(self) -> bool {
        self.length_sq() <= NORMALIZE_EPS * NORMALIZE_EPS
    }

    pub fn midpoint(self, other: Vec2) -> Vec2 {
        Vec2::new((self.x + other.x) * 0.5, (self.y + other.y) * 0.5)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl MulAssign<f32> for Vec2 {
    fn mul_assign(&mut self, rhs: f32) {
        self.x *= rhs;
        self.y *= rhs;
    }
}

impl Neg for Vec2 {
    type Output = Vec2;

    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl From<(f32, f32)> for Vec2 {
    fn from((x, y): (f32, f32)) -> Self {
        Vec2::new(x, y)
    }
}

/// Axis-aligned box. `Rect::default()` is the canonical empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Rect {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Rect {
    pub const EMPTY: Rect = Rect {
        min: Vec2::new(f32::MAX, f32::MAX),
        max: Vec2::new(f32::MIN, f32::MIN),
    };

    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    pub const fn from_coords(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min: Vec2::new(min_x, min_y),
            max: Vec2::new(max_x, max_y),
        }
    }

    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self::new(center - half, center + half)
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Inclusive on every edge.
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersection(&self, other: &Rect) -> Rect {
        if self.min.x > other.max.x
            || self.min.y > other.max.y
            || self.max.x < other.min.x
            || self.max.y < other.min.y
        {
            return Rect::EMPTY;
        }
        Rect::from_coords(
            self.min.x.max(other.min.x),
            self.min.y.max(other.min.y),
            self.max.x.min(other.max.x),
            self.max.y.min(other.max.y),
        )
    }

    pub fn area(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        self.width() * self.height()
    }

    pub fn center(&self) -> Vec2 {
        self.min.midpoint(self.max)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width(), self.height())
    }

    /// Grows the box by `margin` on every side.
    pub fn inflate(&self, margin: f32) -> Rect {
        let pad = Vec2::new(margin, margin);
        Rect::new(self.min - pad, self.max + pad)
    }

    /// Smallest translation that moves this box inside `border`.
    ///
    /// Each axis is handled on its own: an overhang past the border's min edge
    /// is checked first and an overhang past the max edge second, so a box
    /// wider than the border on some axis ends up aligned to the max edge.
    pub fn shift_to_fit(&self, border: &Rect) -> Vec2 {
        let mut shift = Vec2::ZERO;

        if self.min.x < border.min.x {
            shift.x = border.min.x - self.min.x;
        }
        if self.min.y < border.min.y {
            shift.y = border.min.y - self.min.y;
        }
        if self.max.x > border.max.x {
            shift.x = border.max.x - self.max.x;
        }
        if self.max.y > border.max.y {
            shift.y = border.max.y - self.max.y;
        }

        shift
    }

    /// True when the box is wider or taller than `border`, i.e. no shift can fit it.
    pub fn exceeds(&self, border: &Rect) -> (bool, bool) {
        (self.width() > border.width(), self.height() > border.height())
    }

    pub fn translate(&self, offset: Vec2) -> Rect {
        Rect::new(self.min + offset, self.max + offset)
    }
}
