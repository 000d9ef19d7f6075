//! Surface appearance and its randomization.

/// How a surface is painted. Coordinates passed to [`Texture::sample`] are
/// the disc-local position in `[-1, 1]^2`.
#[derive(Clone, Debug, PartialEq)]
pub enum Texture {
    Rgb([u8; 3]),
    Checker {
        a: [u8; 3],
        b: [u8; 3],
        cells: u8,
    },
    Gradient {
        from: [u8; 3],
        to: [u8; 3],
        vertical: bool,
    },
}

fn random_rgb(rng: &mut fastrand::Rng) -> [u8; 3] {
    [rng.u8(..), rng.u8(..), rng.u8(..)]
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(from: [u8; 3], to: [u8; 3], t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0; 3];
    for ((o, a), b) in out.iter_mut().zip(from).zip(to) {
        *o = (f32::from(a) + (f32::from(b) - f32::from(a)) * t).round() as u8;
    }
    out
}

impl Texture {
    /// Solid colour from an RGBA model colour; alpha is ignored.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_rgba(rgba: [f32; 4]) -> Self {
        let c = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::Rgb([c(rgba[0]), c(rgba[1]), c(rgba[2])])
    }

    /// Draw a random solid, checker or gradient texture.
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        match rng.u8(..3) {
            0 => Self::Rgb(random_rgb(rng)),
            1 => Self::Checker {
                a: random_rgb(rng),
                b: random_rgb(rng),
                cells: rng.u8(2..=8),
            },
            _ => Self::Gradient {
                from: random_rgb(rng),
                to: random_rgb(rng),
                vertical: rng.bool(),
            },
        }
    }

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn sample(&self, u: f32, v: f32) -> [u8; 3] {
        match self {
            Self::Rgb(rgb) => *rgb,
            Self::Checker { a, b, cells } => {
                let n = f32::from(*cells);
                let i = ((u + 1.0) * 0.5 * n).floor() as i32;
                let j = ((v + 1.0) * 0.5 * n).floor() as i32;
                if (i + j) % 2 == 0 {
                    *a
                } else {
                    *b
                }
            }
            Self::Gradient { from, to, vertical } => {
                let t = if *vertical { v } else { u };
                lerp(*from, *to, (t + 1.0) * 0.5)
            }
        }
    }
}
