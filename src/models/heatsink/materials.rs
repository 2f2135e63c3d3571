use crate::physics::{Material, MaterialId};

pub const MICROPROCESSOR_ID: MaterialId = 0;
pub const CERAMIC_ID: MaterialId = 1;
/// Shared by the sink base and every fin.
pub const SINK_ID: MaterialId = 2;

/// Silicon die: k = 0.15, q = 0.5, starting at 70 °C.
pub fn microprocessor() -> Material {
    Material {
        id: MICROPROCESSOR_ID,
        conductivity: 0.15,
        source: 0.5,
        initial_guess: 343.0,
    }
}

/// Ceramic cap on top of the die, starting at 27 °C.
pub fn ceramic() -> Material {
    Material {
        id: CERAMIC_ID,
        conductivity: 0.23,
        source: 0.0,
        initial_guess: 300.0,
    }
}

/// Aluminium sink, starting at 27 °C.
pub fn sink() -> Material {
    Material {
        id: SINK_ID,
        conductivity: 0.248,
        source: 0.0,
        initial_guess: 300.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_pass_validation() {
        for m in [microprocessor(), ceramic(), sink()] {
            assert_eq!(
                Material::new(m.id, m.conductivity, m.source, m.initial_guess),
                Ok(m)
            );
        }
    }
}
