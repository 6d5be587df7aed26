//! Cesantía en edad avanzada reduction factors by claim age

#[derive(Debug, Clone)]
pub struct AgeFactorTable {
    /// (age, factor) sorted by age
    factors: Vec<(u32, f64)>,
}

impl AgeFactorTable {
    pub fn official() -> Self {
        Self::from_loaded(&[
            (60, 0.75),
            (61, 0.80),
            (62, 0.85),
            (63, 0.90),
            (64, 0.95),
            (65, 1.00),
        ])
    }

    pub fn from_loaded(factors: &[(u32, f64)]) -> Self {
        let mut factors = factors.to_vec();
        factors.sort_by_key(|(age, _)| *age);
        Self { factors }
    }

    /// Youngest age with a factor; claims below it are not allowed
    pub fn minimum_age(&self) -> u32 {
        self.factors.first().map(|(age, _)| *age).unwrap_or(65)
    }

    /// Factor for a claim age; ages past the table use the last row (vejez, 100%).
    /// Returns `None` below the minimum age.
    pub fn factor(&self, age: u32) -> Option<f64> {
        if age < self.minimum_age() {
            return None;
        }
        self.factors
            .iter()
            .rev()
            .find(|(a, _)| *a <= age)
            .map(|(_, f)| *f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_factors() {
        let table = AgeFactorTable::official();
        assert_eq!(table.factor(59), None);
        assert_eq!(table.factor(60), Some(0.75));
        assert_eq!(table.factor(61), Some(0.80));
        assert_eq!(table.factor(65), Some(1.0));
        assert_eq!(table.factor(70), Some(1.0));
        assert_eq!(table.minimum_age(), 60);
    }
}
