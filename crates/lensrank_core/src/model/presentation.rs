//! Values describing what the display layer should show next.

use serde::{Deserialize, Serialize};

/// Rotation hint applied to a resampled presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Quarter,
    Half,
    ThreeQuarter,
}

impl Rotation {
    const ALL: [Rotation; 4] = [
        Rotation::None,
        Rotation::Quarter,
        Rotation::Half,
        Rotation::ThreeQuarter,
    ];

    /// Returns the counter-clockwise angle in degrees.
    pub fn degrees(self) -> u16 {
        match self {
            Self::None => 0,
            Self::Quarter => 90,
            Self::Half => 180,
            Self::ThreeQuarter => 270,
        }
    }

    /// Draws one of the four right-angle rotations uniformly.
    pub fn random<R: rand::Rng>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

/// One image presentation, stable until the next navigation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    /// Catalog position of the presented record.
    pub index: usize,
    pub identifier: String,
    pub rotation: Rotation,
    /// Set when this presentation re-shows an already scored record.
    pub resampled: bool,
}

impl Presentation {
    /// Formats the position label shown beside the image.
    pub fn position_label(&self, catalog_len: usize) -> String {
        format!(
            "{}, current position: {} out of {}",
            self.identifier,
            self.index + 1,
            catalog_len
        )
    }
}

/// Outcome of resolving which record to show next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Present(Presentation),
    /// Every record is scored and nothing can be resampled.
    EndOfQueue,
    /// The catalog holds no records at all.
    EmptyCatalog,
}

impl Resolution {
    /// Returns the presentation when one was resolved.
    pub fn presentation(&self) -> Option<&Presentation> {
        match self {
            Self::Present(presentation) => Some(presentation),
            Self::EndOfQueue | Self::EmptyCatalog => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Presentation, Rotation};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn random_rotation_only_yields_right_angles() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [false; 4];
        for _ in 0..200 {
            let degrees = Rotation::random(&mut rng).degrees();
            assert_eq!(degrees % 90, 0);
            seen[usize::from(degrees / 90)] = true;
        }
        assert!(seen.iter().all(|hit| *hit), "all four rotations should occur");
    }

    #[test]
    fn position_label_is_one_based() {
        let presentation = Presentation {
            index: 0,
            identifier: "lens_0001.jpg".to_string(),
            rotation: Rotation::None,
            resampled: false,
        };
        assert_eq!(
            presentation.position_label(12),
            "lens_0001.jpg, current position: 1 out of 12"
        );
    }
}
