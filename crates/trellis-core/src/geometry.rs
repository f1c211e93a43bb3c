use bitflags::bitflags;

/// Pixel insets used for padding and margins. Start/end are already resolved
/// to left/right for the active layout direction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Insets {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Insets {
    pub const ZERO: Insets = Insets {
        left: 0,
        right: 0,
        top: 0,
        bottom: 0,
    };

    pub fn all(v: i32) -> Self {
        Insets {
            left: v,
            right: v,
            top: v,
            bottom: v,
        }
    }

    pub fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// One axis of a child's requested size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Dimension {
    MatchParent,
    #[default]
    WrapContent,
    Px(i32),
}

impl Dimension {
    pub fn from_px(px: Option<i32>, fallback: Dimension) -> Self {
        px.map(Dimension::Px).unwrap_or(fallback)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HorizontalGravity {
    #[default]
    Start,
    Center,
    End,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum VerticalGravity {
    #[default]
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Gravity {
    pub horizontal: HorizontalGravity,
    pub vertical: VerticalGravity,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

bitflags! {
    /// Corners of a view, named relative to the layout direction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Corners: u8 {
        const TOP_START = 1 << 0;
        const TOP_END = 1 << 1;
        const BOTTOM_END = 1 << 2;
        const BOTTOM_START = 1 << 3;
        const ALL = Self::TOP_START.bits()
            | Self::TOP_END.bits()
            | Self::BOTTOM_END.bits()
            | Self::BOTTOM_START.bits();
    }
}

impl Corners {
    /// A zero bitmask in the model means every corner is rounded.
    pub fn from_model_bits(bits: u32) -> Self {
        if bits == 0 {
            Corners::ALL
        } else {
            Corners::from_bits_truncate(bits as u8)
        }
    }

    /// Swaps start and end corners for right-to-left layouts.
    pub fn to_physical(self, direction: TextDirection) -> Self {
        if direction == TextDirection::Ltr {
            return self;
        }
        let mut out = Corners::empty();
        if self.contains(Corners::TOP_START) {
            out |= Corners::TOP_END;
        }
        if self.contains(Corners::TOP_END) {
            out |= Corners::TOP_START;
        }
        if self.contains(Corners::BOTTOM_START) {
            out |= Corners::BOTTOM_END;
        }
        if self.contains(Corners::BOTTOM_END) {
            out |= Corners::BOTTOM_START;
        }
        out
    }
}

/// dp to px, rounded to the nearest pixel.
pub fn dp_to_px(dp: f32, density: f32) -> i32 {
    (dp * density).round() as i32
}

pub fn px_to_dp(px: i32, density: f32) -> f32 {
    if density <= 0.0 {
        return px as f32;
    }
    px as f32 / density
}
