//! sRGB / CIE Lab conversions and the two blend operators used by effects.
//!
//! Colour interpolation in the animation path is linear in Lab so transitions
//! read as perceptually even ramps; the plain RGB blend exists only for
//! endpoint computation where both endpoints share chroma (dimming).

use crate::foundation::core::Rgba8;

// D65 reference white.
const XN: f64 = 0.950_47;
const YN: f64 = 1.0;
const ZN: f64 = 1.088_83;

/// CIE L*a*b* coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lab {
    /// Lightness.
    pub l: f64,
    /// Green-red axis.
    pub a: f64,
    /// Blue-yellow axis.
    pub b: f64,
}

fn srgb_linearise(c: f64) -> f64 {
    if c <= 0.040_45 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn srgb_delinearise(c: f64) -> f64 {
    if c <= 0.003_130_8 {
        12.92 * c
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

fn lab_f(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA * DELTA * DELTA {
        t.cbrt()
    } else {
        t / (3.0 * DELTA * DELTA) + 4.0 / 29.0
    }
}

fn lab_f_inv(t: f64) -> f64 {
    const DELTA: f64 = 6.0 / 29.0;
    if t > DELTA {
        t * t * t
    } else {
        3.0 * DELTA * DELTA * (t - 4.0 / 29.0)
    }
}

/// Convert an sRGB pixel to Lab. Alpha is ignored.
pub fn to_lab(c: Rgba8) -> Lab {
    let r = srgb_linearise(f64::from(c.r) / 255.0);
    let g = srgb_linearise(f64::from(c.g) / 255.0);
    let b = srgb_linearise(f64::from(c.b) / 255.0);

    let x = 0.412_456_4 * r + 0.357_576_1 * g + 0.180_437_5 * b;
    let y = 0.212_672_9 * r + 0.715_152_2 * g + 0.072_175_0 * b;
    let z = 0.019_333_9 * r + 0.119_192_0 * g + 0.950_304_1 * b;

    let fx = lab_f(x / XN);
    let fy = lab_f(y / YN);
    let fz = lab_f(z / ZN);

    Lab {
        l: 116.0 * fy - 16.0,
        a: 500.0 * (fx - fy),
        b: 200.0 * (fy - fz),
    }
}

/// Convert Lab back to an opaque sRGB pixel, clamping out-of-gamut values.
pub fn from_lab(lab: Lab) -> Rgba8 {
    let fy = (lab.l + 16.0) / 116.0;
    let fx = fy + lab.a / 500.0;
    let fz = fy - lab.b / 200.0;

    let x = XN * lab_f_inv(fx);
    let y = YN * lab_f_inv(fy);
    let z = ZN * lab_f_inv(fz);

    let r = 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z;
    let g = -0.969_266_0 * x + 1.876_010_8 * y + 0.041_556_0 * z;
    let b = 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z;

    fn channel(c: f64) -> u8 {
        (srgb_delinearise(c).clamp(0.0, 1.0) * 255.0).round() as u8
    }

    Rgba8::rgb(channel(r), channel(g), channel(b))
}

/// Perceptual blend: linear interpolation in Lab with `t` clamped to `[0, 1]`.
pub fn blend_lab(c0: Rgba8, c1: Rgba8, t: f64) -> Rgba8 {
    let t = t.clamp(0.0, 1.0);
    let a = to_lab(c0);
    let b = to_lab(c1);
    from_lab(Lab {
        l: a.l + (b.l - a.l) * t,
        a: a.a + (b.a - a.a) * t,
        b: a.b + (b.b - a.b) * t,
    })
}

/// Straight per-channel sRGB blend with `t` clamped to `[0, 1]`.
pub fn blend_rgb(c0: Rgba8, c1: Rgba8, t: f64) -> Rgba8 {
    let t = t.clamp(0.0, 1.0);
    fn channel(a: u8, b: u8, t: f64) -> u8 {
        let a = f64::from(a);
        let b = f64::from(b);
        (a + (b - a) * t).round().clamp(0.0, 255.0) as u8
    }
    Rgba8::rgb(
        channel(c0.r, c1.r, t),
        channel(c0.g, c1.g, t),
        channel(c0.b, c1.b, t),
    )
}

#[cfg(test)]
#[path = "../../tests/unit/color/space.rs"]
mod tests;
