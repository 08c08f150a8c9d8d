//! Pure color resolution: attribute tags + theme + palette overrides -> RGBA.
//!
//! Every function here is pure and allocation-free beyond its return value;
//! identical inputs always yield identical outputs.

use std::collections::HashMap;

use crate::{
    error::Error,
    state::{CellAttr, ColorTag},
    theme::{Rgba, Theme},
};

/// Looks up a palette index, honoring overrides, falling back when missing.
///
/// Negative/NaN indices aren't representable in `u16`, so callers pass an
/// `Option<u8>`; `None` resolves directly to `fallback`. Indices 0-15 read
/// `theme.palette.ansi`; indices 16+ read `extended[i-16]`, falling back
/// when the extended table doesn't cover that index.
pub fn resolve_palette_entry(
    theme: &Theme,
    overrides: &HashMap<u8, Rgba>,
    index: Option<u8>,
    fallback: Rgba,
) -> Rgba {
    let Some(index) = index else { return fallback };

    if let Some(&color) = overrides.get(&index) {
        return color;
    }

    if let Some(&color) = theme.palette.ansi.get(index as usize) {
        return color;
    }

    theme
        .palette
        .extended
        .get(index as usize - 16)
        .copied()
        .unwrap_or(fallback)
}

/// Resolves a `ColorTag` to an RGBA value, or `None` for `Default` when
/// `treat_default_as_null` is set (used for background, where `None` means
/// "don't paint" rather than "paint the fallback").
pub fn terminal_color_to_rgba(
    color: ColorTag,
    theme: &Theme,
    overrides: &HashMap<u8, Rgba>,
    fallback: Rgba,
    treat_default_as_null: bool,
) -> Option<Rgba> {
    match color {
        ColorTag::Default => {
            if treat_default_as_null {
                None
            } else {
                Some(fallback)
            }
        },
        ColorTag::Ansi(i) => Some(resolve_palette_entry(theme, overrides, Some(i), fallback)),
        ColorTag::AnsiBright(i) => {
            Some(resolve_palette_entry(theme, overrides, Some(i.saturating_add(8)), fallback))
        },
        ColorTag::Palette(i) => Some(resolve_palette_entry(theme, overrides, Some(i), fallback)),
        ColorTag::Rgb(r, g, b) => Some(Rgba::opaque(r, g, b)),
    }
}

/// Resolves a cell's final foreground/background, applying `inverse` and
/// `hidden`. `background` keeps "null == don't paint"
/// semantics; `foreground` does not (a missing foreground always falls back).
pub fn resolve_cell_colors(
    attr: &CellAttr,
    theme: &Theme,
    overrides: &HashMap<u8, Rgba>,
    fallback_fg: Rgba,
    fallback_bg: Rgba,
) -> (Option<Rgba>, Option<Rgba>) {
    let mut fg = terminal_color_to_rgba(attr.foreground, theme, overrides, fallback_fg, false);
    let mut bg = terminal_color_to_rgba(attr.background, theme, overrides, fallback_bg, true);

    if attr.inverse {
        let fg_val = fg.unwrap_or(fallback_fg);
        let bg_val = bg.unwrap_or(fallback_bg);
        fg = Some(bg_val);
        bg = Some(fg_val);
    }

    if attr.hidden {
        fg = None;
    }

    (fg, bg)
}

/// Parses `#rgb`, `#rgba`, `#rrggbb`, `#rrggbbaa`, `rgb(...)`, `rgba(...)`
/// (including percent components) — `rendererColorToCss`'s
/// parsing counterpart, `parse_css_color`.
pub fn parse_css_color(s: &str) -> Result<Rgba, Error> {
    let s = s.trim();

    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex_color(hex).ok_or_else(|| Error::UnsupportedColor(s.to_string()));
    }

    if let Some(inner) = s.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        return parse_component_list(inner, true).ok_or_else(|| Error::UnsupportedColor(s.to_string()));
    }

    if let Some(inner) = s.strip_prefix("rgb(").and_then(|r| r.strip_suffix(')')) {
        return parse_component_list(inner, false).ok_or_else(|| Error::UnsupportedColor(s.to_string()));
    }

    Err(Error::UnsupportedColor(s.to_string()))
}

fn parse_hex_color(hex: &str) -> Option<Rgba> {
    let expand = |c: char| -> Option<u8> {
        let v = c.to_digit(16)? as u8;
        Some(v * 16 + v)
    };

    match hex.len() {
        3 => {
            let mut chars = hex.chars();
            let r = expand(chars.next()?)?;
            let g = expand(chars.next()?)?;
            let b = expand(chars.next()?)?;
            Some(Rgba::opaque(r, g, b))
        },
        4 => {
            let mut chars = hex.chars();
            let r = expand(chars.next()?)?;
            let g = expand(chars.next()?)?;
            let b = expand(chars.next()?)?;
            let a = expand(chars.next()?)?;
            Some(Rgba(r, g, b, a))
        },
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Rgba::opaque(r, g, b))
        },
        8 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
            Some(Rgba(r, g, b, a))
        },
        _ => None,
    }
}

fn parse_component_list(inner: &str, has_alpha: bool) -> Option<Rgba> {
    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    let expected = if has_alpha { 4 } else { 3 };
    if parts.len() != expected {
        return None;
    }

    let channel = |s: &str| -> Option<u8> {
        if let Some(pct) = s.strip_suffix('%') {
            let v: f32 = pct.parse().ok()?;
            Some(clamp_round(v / 100.0 * 255.0))
        } else {
            let v: f32 = s.parse().ok()?;
            Some(clamp_round(v))
        }
    };

    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = if has_alpha {
        let v: f32 = parts[3].parse().ok()?;
        clamp_round(v * 255.0)
    } else {
        255
    };

    Some(Rgba(r, g, b, a))
}

fn clamp_round(v: f32) -> u8 {
    v.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_index_falls_back() {
        let theme = Theme::default();
        let overrides = HashMap::new();
        let fallback = Rgba::opaque(1, 2, 3);
        assert_eq!(resolve_palette_entry(&theme, &overrides, None, fallback), fallback);
    }

    #[test]
    fn override_beats_palette() {
        let theme = Theme::default();
        let mut overrides = HashMap::new();
        overrides.insert(1, Rgba::opaque(0, 128, 255));
        let fallback = Rgba::opaque(0, 0, 0);
        assert_eq!(
            resolve_palette_entry(&theme, &overrides, Some(1), fallback),
            Rgba::opaque(0, 128, 255)
        );
    }

    #[test]
    fn ansi_bright_adds_eight() {
        let theme = Theme::default();
        let overrides = HashMap::new();
        let fallback = Rgba::default();
        let bright = terminal_color_to_rgba(
            ColorTag::AnsiBright(1),
            &theme,
            &overrides,
            fallback,
            false,
        );
        let plain9 =
            terminal_color_to_rgba(ColorTag::Ansi(9), &theme, &overrides, fallback, false);
        assert_eq!(bright, plain9);
    }

    #[test]
    fn inverse_swaps_fg_bg() {
        let theme = Theme::default();
        let overrides = HashMap::new();
        let mut attr = CellAttr { inverse: true, ..CellAttr::default() };
        attr.foreground = ColorTag::Rgb(1, 2, 3);
        attr.background = ColorTag::Rgb(4, 5, 6);
        let (fg, bg) = resolve_cell_colors(&attr, &theme, &overrides, Rgba::default(), Rgba::default());
        assert_eq!(fg, Some(Rgba::opaque(4, 5, 6)));
        assert_eq!(bg, Some(Rgba::opaque(1, 2, 3)));
    }

    #[test]
    fn hidden_clears_foreground_only() {
        let theme = Theme::default();
        let overrides = HashMap::new();
        let mut attr = CellAttr { hidden: true, ..CellAttr::default() };
        attr.background = ColorTag::Rgb(4, 5, 6);
        let (fg, bg) = resolve_cell_colors(&attr, &theme, &overrides, Rgba::default(), Rgba::default());
        assert_eq!(fg, None);
        assert_eq!(bg, Some(Rgba::opaque(4, 5, 6)));
    }

    #[test]
    fn resolve_cell_colors_is_idempotent() {
        let theme = Theme::default();
        let overrides = HashMap::new();
        let attr = CellAttr::default();
        let a = resolve_cell_colors(&attr, &theme, &overrides, Rgba::default(), Rgba::default());
        let b = resolve_cell_colors(&attr, &theme, &overrides, Rgba::default(), Rgba::default());
        assert_eq!(a, b);
    }

    #[test]
    fn parses_short_hex() {
        assert_eq!(parse_css_color("#f00").unwrap(), Rgba::opaque(255, 0, 0));
    }

    #[test]
    fn parses_long_hex_with_alpha() {
        assert_eq!(parse_css_color("#ff000080").unwrap(), Rgba(255, 0, 0, 128));
    }

    #[test]
    fn parses_rgb_function() {
        assert_eq!(parse_css_color("rgb(10, 20, 30)").unwrap(), Rgba::opaque(10, 20, 30));
    }

    #[test]
    fn parses_rgba_with_percent() {
        let c = parse_css_color("rgba(50%, 0%, 100%, 0.5)").unwrap();
        assert_eq!(c, Rgba(128, 0, 255, 128));
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_css_color("not-a-color").is_err());
    }
}
