//! Theme colors and font sizes, plus the nucleotide draw classes they feed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::StyleError;
use crate::types::{rgb, Color};

/// An IUPAC nucleotide code, or the alignment gap `-`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[allow(missing_docs)]
pub enum Nucleotide {
    A,
    G,
    C,
    T,
    N,
    R,
    Y,
    K,
    M,
    S,
    W,
    B,
    D,
    H,
    V,
    Gap,
}

impl Nucleotide {
    /// Every code, in pool registration order.
    pub const ALL: [Nucleotide; 16] = [
        Nucleotide::A,
        Nucleotide::G,
        Nucleotide::C,
        Nucleotide::T,
        Nucleotide::N,
        Nucleotide::R,
        Nucleotide::Y,
        Nucleotide::K,
        Nucleotide::M,
        Nucleotide::S,
        Nucleotide::W,
        Nucleotide::B,
        Nucleotide::D,
        Nucleotide::H,
        Nucleotide::V,
        Nucleotide::Gap,
    ];

    /// Parse a base, ignoring case.
    pub fn from_char(base: char) -> Option<Self> {
        let nucleotide = match base.to_ascii_uppercase() {
            'A' => Nucleotide::A,
            'G' => Nucleotide::G,
            'C' => Nucleotide::C,
            'T' => Nucleotide::T,
            'N' => Nucleotide::N,
            'R' => Nucleotide::R,
            'Y' => Nucleotide::Y,
            'K' => Nucleotide::K,
            'M' => Nucleotide::M,
            'S' => Nucleotide::S,
            'W' => Nucleotide::W,
            'B' => Nucleotide::B,
            'D' => Nucleotide::D,
            'H' => Nucleotide::H,
            'V' => Nucleotide::V,
            '-' => Nucleotide::Gap,
            _ => return None,
        };
        Some(nucleotide)
    }

    /// Parse a base, falling back to `N` for anything unrecognized.
    pub fn from_char_lossy(base: char) -> Self {
        Self::from_char(base).unwrap_or_else(|| {
            log::debug!("unrecognized base {base:?}, drawing as N");
            Nucleotide::N
        })
    }

    /// The letter drawn for this code. Gaps have no letter.
    pub fn letter(self) -> Option<&'static str> {
        Some(match self {
            Nucleotide::A => "A",
            Nucleotide::G => "G",
            Nucleotide::C => "C",
            Nucleotide::T => "T",
            Nucleotide::N => "N",
            Nucleotide::R => "R",
            Nucleotide::Y => "Y",
            Nucleotide::K => "K",
            Nucleotide::M => "M",
            Nucleotide::S => "S",
            Nucleotide::W => "W",
            Nucleotide::B => "B",
            Nucleotide::D => "D",
            Nucleotide::H => "H",
            Nucleotide::V => "V",
            Nucleotide::Gap => return None,
        })
    }

    /// Draw class of the colored block.
    pub fn rect_class(self) -> &'static str {
        match self {
            Nucleotide::A => "ARect",
            Nucleotide::G => "GRect",
            Nucleotide::C => "CRect",
            Nucleotide::T => "TRect",
            Nucleotide::N => "NRect",
            Nucleotide::R => "RRect",
            Nucleotide::Y => "YRect",
            Nucleotide::K => "KRect",
            Nucleotide::M => "MRect",
            Nucleotide::S => "SRect",
            Nucleotide::W => "WRect",
            Nucleotide::B => "BRect",
            Nucleotide::D => "DRect",
            Nucleotide::H => "HRect",
            Nucleotide::V => "VRect",
            Nucleotide::Gap => GAP_CLASS,
        }
    }

    /// Draw class of the colored letter glyph.
    pub fn text_class(self) -> &'static str {
        match self {
            Nucleotide::A => "AText",
            Nucleotide::G => "GText",
            Nucleotide::C => "CText",
            Nucleotide::T => "TText",
            Nucleotide::N => "NText",
            Nucleotide::R => "RText",
            Nucleotide::Y => "YText",
            Nucleotide::K => "KText",
            Nucleotide::M => "MText",
            Nucleotide::S => "SText",
            Nucleotide::W => "WText",
            Nucleotide::B => "BText",
            Nucleotide::D => "DText",
            Nucleotide::H => "HText",
            Nucleotide::V => "VText",
            Nucleotide::Gap => GAP_CLASS,
        }
    }

    /// Draw class for one base at `nuc_width` pixels per base.
    pub fn draw_class(self, nuc_width: f32) -> &'static str {
        if nuc_width > LETTER_THRESHOLD {
            self.text_class()
        } else {
            self.rect_class()
        }
    }
}

/// Draw class reserved for gap characters.
pub const GAP_CLASS: &str = "GAP";

/// Pixels per base above which bases are drawn as letters instead of
/// blocks.
pub const LETTER_THRESHOLD: f32 = 10.0;

/// A 24-bit color written as a hex string (`#rrggbb`, `0xrrggbb` or
/// `rrggbb`).
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HexColor(pub u32);

impl HexColor {
    /// Parse a hex code.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidHex`] if `hex` is not a 24-bit hex
    /// number.
    pub fn parse(hex: &str) -> Result<Self, StyleError> {
        let digits = hex.trim_start_matches("0x").trim_start_matches('#');
        match u32::from_str_radix(digits, 16) {
            Ok(value) if digits.len() <= 6 => Ok(HexColor(value)),
            _ => Err(StyleError::InvalidHex(hex.to_owned())),
        }
    }

    /// Opaque color for drawing.
    pub fn color(self) -> Color {
        rgb(self.0)
    }
}

impl TryFrom<String> for HexColor {
    type Error = StyleError;

    fn try_from(hex: String) -> Result<Self, Self::Error> {
        HexColor::parse(&hex)
    }
}

impl From<HexColor> for String {
    fn from(color: HexColor) -> Self {
        color.to_string()
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

/// One color per nucleotide code.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[allow(missing_docs)]
pub struct NucleotideColors {
    pub a: HexColor,
    pub g: HexColor,
    pub c: HexColor,
    pub t: HexColor,
    pub n: HexColor,
    pub r: HexColor,
    pub y: HexColor,
    pub k: HexColor,
    pub m: HexColor,
    pub s: HexColor,
    pub w: HexColor,
    pub b: HexColor,
    pub d: HexColor,
    pub h: HexColor,
    pub v: HexColor,
    pub gap: HexColor,
}

impl NucleotideColors {
    /// Color of one code.
    pub fn get(&self, nucleotide: Nucleotide) -> HexColor {
        match nucleotide {
            Nucleotide::A => self.a,
            Nucleotide::G => self.g,
            Nucleotide::C => self.c,
            Nucleotide::T => self.t,
            Nucleotide::N => self.n,
            Nucleotide::R => self.r,
            Nucleotide::Y => self.y,
            Nucleotide::K => self.k,
            Nucleotide::M => self.m,
            Nucleotide::S => self.s,
            Nucleotide::W => self.w,
            Nucleotide::B => self.b,
            Nucleotide::D => self.d,
            Nucleotide::H => self.h,
            Nucleotide::V => self.v,
            Nucleotide::Gap => self.gap,
        }
    }
}

impl Default for NucleotideColors {
    fn default() -> Self {
        let grey = HexColor(0x80_80_80);
        Self {
            a: HexColor(0xff_00_00),
            g: HexColor(0x00_ff_00),
            c: HexColor(0x00_00_ff),
            t: HexColor(0xa0_20_f0),
            n: grey,
            r: grey,
            y: grey,
            k: grey,
            m: grey,
            s: grey,
            w: grey,
            b: grey,
            d: grey,
            h: grey,
            v: grey,
            gap: grey,
        }
    }
}

fn default_deletion() -> HexColor {
    HexColor(0x22_22_22)
}

fn default_insertion() -> HexColor {
    HexColor(0x6a_3d_9a)
}

fn default_tooltip_background() -> HexColor {
    HexColor(0x24_3f_47)
}

/// Structural colors.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorConfig {
    /// Canvas and deletion panel background.
    pub background: HexColor,
    /// Text and label color.
    pub foreground: HexColor,
    /// Read bodies, caps and pair lines.
    pub alignment: HexColor,
    /// Background of track labels.
    pub track_label_background: HexColor,
    /// Text drawn on dark backgrounds, such as the tooltip.
    pub secondary_text: HexColor,
    /// Deletion rules and ref-skip connectors.
    #[serde(default = "default_deletion")]
    pub deletion: HexColor,
    /// Insertion markers.
    #[serde(default = "default_insertion")]
    pub insertion: HexColor,
    /// Tooltip background.
    #[serde(default = "default_tooltip_background")]
    pub tooltip_background: HexColor,
    /// Per-base colors.
    pub nucleotide_colors: NucleotideColors,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: HexColor(0xf2_f2_f2),
            foreground: HexColor(0x22_22_22),
            alignment: HexColor(0x96_95_92),
            track_label_background: HexColor(0x24_3f_47),
            secondary_text: HexColor(0xf2_f2_f2),
            deletion: default_deletion(),
            insertion: default_insertion(),
            tooltip_background: default_tooltip_background(),
            nucleotide_colors: NucleotideColors::default(),
        }
    }
}

fn default_base_font_size() -> f32 {
    14.0
}

fn default_label_font_size() -> f32 {
    10.0
}

/// Font sizes in pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontConfig {
    /// Tooltip text.
    pub tooltip_font_size: f32,
    /// Nucleotide letters.
    #[serde(default = "default_base_font_size")]
    pub base_font_size: f32,
    /// Deletion and insertion labels.
    #[serde(default = "default_label_font_size")]
    pub label_font_size: f32,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            tooltip_font_size: 18.0,
            base_font_size: default_base_font_size(),
            label_font_size: default_label_font_size(),
        }
    }
}

/// Immutable theme handed to scenes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    /// Colors.
    pub colors: ColorConfig,
    /// Font sizes.
    pub fonts: FontConfig,
}

impl StyleConfig {
    /// Parse a JSON theme.
    ///
    /// # Errors
    ///
    /// Fails on malformed JSON, missing required fields or invalid hex
    /// codes.
    pub fn from_json(json: &str) -> Result<Self, StyleError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Drawing color of one nucleotide code.
    pub fn nucleotide_color(&self, nucleotide: Nucleotide) -> Color {
        self.colors.nucleotide_colors.get(nucleotide).color()
    }
}
