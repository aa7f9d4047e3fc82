use compact_str::{format_compact, CompactString};

use crate::tree::arena::NodeTree;

/// The 20-colour categorical palette (pairs of dark/light hues).
pub const PALETTE: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Fill used when nothing else applies.
pub const DEFAULT_FILL: &str = "steelblue";

/// RGBA colour with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AppColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl AppColor {
    pub const fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#rrggbb` or `#rgb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        let channel = |s: &str| u8::from_str_radix(s, 16).ok().map(|v| v as f32 / 255.0);
        match digits.len() {
            6 => Some(Self::new(
                channel(digits.get(0..2)?)?,
                channel(digits.get(2..4)?)?,
                channel(digits.get(4..6)?)?,
            )),
            3 => {
                let short = |i: usize| {
                    let d = digits.get(i..i + 1)?;
                    channel(&d.repeat(2))
                };
                Some(Self::new(short(0)?, short(1)?, short(2)?))
            }
            _ => None,
        }
    }

    pub fn to_hex(self) -> CompactString {
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format_compact!("#{:02x}{:02x}{:02x}", byte(self.r), byte(self.g), byte(self.b))
    }

    /// Create a lighter version.
    pub fn lighten(self, amount: f32) -> Self {
        Self {
            r: (self.r + amount).min(1.0),
            g: (self.g + amount).min(1.0),
            b: (self.b + amount).min(1.0),
            a: self.a,
        }
    }

    /// Create a darker version.
    pub fn darken(self, amount: f32) -> Self {
        Self {
            r: (self.r - amount).max(0.0),
            g: (self.g - amount).max(0.0),
            b: (self.b - amount).max(0.0),
            a: self.a,
        }
    }
}

/// Palette entry for position `i`, wrapping around.
pub fn palette_color(i: usize) -> &'static str {
    PALETTE[i % PALETTE.len()]
}

/// Stable palette entry for a name, so a group keeps its colour across runs.
pub fn color_for_name(name: &str) -> &'static str {
    palette_color(fnv1a(name) as usize)
}

/// Fill every node that has no colour: leaves by sibling position, internal
/// nodes by name (darkened so they read as groups behind their children).
pub fn assign_colors(tree: &mut NodeTree) {
    for parent in tree.descendants(tree.root) {
        let children: Vec<_> = tree.children(parent).collect();
        for (i, id) in children.into_iter().enumerate() {
            if tree.get(id).color.is_some() {
                continue;
            }
            let color = if tree.is_leaf(id) {
                CompactString::new(palette_color(i))
            } else {
                AppColor::from_hex(color_for_name(&tree.get(id).name))
                    .map(|c| c.darken(0.15).to_hex())
                    .unwrap_or_else(|| CompactString::new(DEFAULT_FILL))
            };
            tree.get_mut(id).color = Some(color);
        }
    }
}

fn fnv1a(s: &str) -> u32 {
    let mut h: u32 = 2166136261;
    for &b in s.as_bytes() {
        h ^= b as u32;
        h = h.wrapping_mul(16777619);
    }
    h
}
