/// Linear `[0, 1]` RGB to a `#rrggbb` string. Channels are clamped.
pub fn rgb_to_hex(rgb: [f32; 3]) -> String {
    let [r, g, b] = rgb.map(|c| (c.clamp(0.0, 1.0) * 255.0).round() as u8);
    format!("#{r:02x}{g:02x}{b:02x}")
}

/// Parse `#rrggbb` or `#rgb` (leading `#` optional, case-insensitive).
pub fn hex_to_rgb(hex: &str) -> Option<[f32; 3]> {
    let s = hex.trim().trim_start_matches('#');
    let channel = |v: u8| v as f32 / 255.0;
    match s.len() {
        6 => {
            let v = u32::from_str_radix(s, 16).ok()?;
            Some([
                channel((v >> 16) as u8),
                channel((v >> 8) as u8),
                channel(v as u8),
            ])
        }
        3 => {
            let v = u16::from_str_radix(s, 16).ok()?;
            let expand = |n: u16| ((n & 0xf) as u8) * 17;
            Some([
                channel(expand(v >> 8)),
                channel(expand(v >> 4)),
                channel(expand(v)),
            ])
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_and_parses() {
        assert_eq!(rgb_to_hex([1.0, 0.5, 0.0]), "#ff8000");
        assert_eq!(hex_to_rgb("#ff0000"), Some([1.0, 0.0, 0.0]));
        assert_eq!(hex_to_rgb("0F0"), Some([0.0, 1.0, 0.0]));
    }

    #[test]
    fn rejects_malformed_hex() {
        assert_eq!(hex_to_rgb("#12345"), None);
        assert_eq!(hex_to_rgb("#gg0000"), None);
        assert_eq!(hex_to_rgb(""), None);
    }

    #[test]
    fn out_of_range_channels_clamp() {
        assert_eq!(rgb_to_hex([-1.0, 2.0, f32::NAN]), "#00ff00");
    }
}
