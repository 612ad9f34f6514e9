//! Dynamic state of the plant.

use serde::{Deserialize, Serialize};

/// Reactor and jacket temperatures, °C.
///
/// The model never clamps these; physically they stay between the cold and
/// hot utility temperatures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlantState {
    /// Reactor contents temperature `T`
    pub reactor_temp: f64,
    /// Jacket temperature `Tj`
    pub jacket_temp: f64,
}

impl Default for PlantState {
    /// Near-steady state for the default constants at the default valve position.
    fn default() -> Self {
        Self {
            reactor_temp: 31.0,
            jacket_temp: 47.732_220_315_153_8,
        }
    }
}

impl PlantState {
    pub fn new(reactor_temp: f64, jacket_temp: f64) -> Self {
        Self {
            reactor_temp,
            jacket_temp,
        }
    }

    pub fn to_array(self) -> [f64; 2] {
        [self.reactor_temp, self.jacket_temp]
    }

    pub fn from_array(values: [f64; 2]) -> Self {
        Self::new(values[0], values[1])
    }

    pub fn is_finite(&self) -> bool {
        self.reactor_temp.is_finite() && self.jacket_temp.is_finite()
    }

    /// Component-wise `self + other`.
    pub fn add(&self, other: &Self) -> Self {
        Self::new(
            self.reactor_temp + other.reactor_temp,
            self.jacket_temp + other.jacket_temp,
        )
    }

    /// Component-wise `factor * self`.
    pub fn scale(&self, factor: f64) -> Self {
        Self::new(self.reactor_temp * factor, self.jacket_temp * factor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_conversion() {
        let s = PlantState::new(20.0, 60.0);
        assert_eq!(s.to_array(), [20.0, 60.0]);
        assert_eq!(PlantState::from_array([20.0, 60.0]), s);
    }

    #[test]
    fn arithmetic() {
        let a = PlantState::new(1.0, 2.0);
        let b = PlantState::new(0.5, -1.0);
        assert_eq!(a.add(&b), PlantState::new(1.5, 1.0));
        assert_eq!(a.scale(2.0), PlantState::new(2.0, 4.0));
    }

    #[test]
    fn finiteness() {
        assert!(PlantState::default().is_finite());
        assert!(!PlantState::new(f64::NAN, 1.0).is_finite());
    }
}
