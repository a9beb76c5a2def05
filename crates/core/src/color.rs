pub fn srgb_to_linear(value: f32) -> f32 {
    if value <= 0.04045 {
        value / 12.92
    } else {
        ((value + 0.055) / 1.055).powf(2.4)
    }
}

/// Converts a `0xRRGGBB` sRGB hex color to linear RGB.
pub fn hex_to_linear(hex: u32) -> [f32; 3] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [srgb_to_linear(r), srgb_to_linear(g), srgb_to_linear(b)]
}

pub fn mean_channel(rgb: [f32; 3]) -> f32 {
    (rgb[0] + rgb[1] + rgb[2]) / 3.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_channels_map_to_linear() {
        assert_eq!(hex_to_linear(0xffffff), [1.0, 1.0, 1.0]);
        assert_eq!(hex_to_linear(0x000000), [0.0, 0.0, 0.0]);
        let cyan = hex_to_linear(0x00ffff);
        assert_eq!(cyan[0], 0.0);
        assert!((cyan[1] - 1.0).abs() < 1.0e-6);
    }
}
