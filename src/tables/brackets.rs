//! Ley 73 (Art. 167) pension brackets
//!
//! Each bracket covers salaries up to a multiple of UMA and gives a base
//! percentage ("cuantía básica") plus an increment for every 52 weeks
//! contributed beyond the first 500.

/// One bracket row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PensionBracket {
    /// Upper bound in UMA multiples (inclusive); the last row is open ended
    pub up_to_veces_uma: f64,
    /// Base percentage of the average salary
    pub base_pct: f64,
    /// Additional percentage per 52-week block above 500 weeks
    pub increment_pct: f64,
}

#[derive(Debug, Clone)]
pub struct PensionBracketTable {
    brackets: Vec<PensionBracket>,
}

impl PensionBracketTable {
    pub fn official() -> Self {
        let rows = [
            (1.00, 80.00, 0.563),
            (1.25, 77.11, 0.814),
            (1.50, 58.18, 1.178),
            (1.75, 49.23, 1.430),
            (2.00, 42.67, 1.615),
            (2.25, 37.65, 1.756),
            (2.50, 33.68, 1.868),
            (2.75, 30.48, 1.958),
            (3.00, 27.83, 2.033),
            (3.25, 25.60, 2.096),
            (3.50, 23.70, 2.149),
            (3.75, 22.07, 2.195),
            (4.00, 20.65, 2.235),
            (4.25, 19.39, 2.271),
            (4.50, 18.29, 2.302),
            (4.75, 17.30, 2.330),
            (5.00, 16.41, 2.355),
            (5.25, 15.61, 2.377),
            (5.50, 14.88, 2.398),
            (5.75, 14.22, 2.416),
            (6.00, 13.62, 2.433),
            (f64::INFINITY, 13.00, 2.450),
        ];
        Self::from_loaded(
            &rows
                .iter()
                .map(|&(up_to, base, inc)| PensionBracket {
                    up_to_veces_uma: up_to,
                    base_pct: base,
                    increment_pct: inc,
                })
                .collect::<Vec<_>>(),
        )
    }

    /// Rows are sorted by threshold so lookups can scan in order
    pub fn from_loaded(brackets: &[PensionBracket]) -> Self {
        let mut brackets = brackets.to_vec();
        brackets.sort_by(|a, b| a.up_to_veces_uma.total_cmp(&b.up_to_veces_uma));
        Self { brackets }
    }

    /// Bracket for a salary expressed in UMA multiples.
    ///
    /// Values above the last finite threshold fall into the top bracket.
    pub fn lookup(&self, veces_uma: f64) -> Option<&PensionBracket> {
        self.brackets
            .iter()
            .find(|b| veces_uma <= b.up_to_veces_uma)
            .or_else(|| self.brackets.last())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bracket_boundaries() {
        let table = PensionBracketTable::official();
        assert_eq!(table.lookup(0.5).unwrap().base_pct, 80.00);
        assert_eq!(table.lookup(1.0).unwrap().base_pct, 80.00);
        assert_eq!(table.lookup(1.01).unwrap().base_pct, 77.11);
        assert_eq!(table.lookup(1.2295).unwrap().increment_pct, 0.814);
        assert_eq!(table.lookup(6.0).unwrap().base_pct, 13.62);
        assert_eq!(table.lookup(8.75).unwrap().base_pct, 13.00);
        assert_eq!(table.lookup(25.0).unwrap().increment_pct, 2.450);
    }

    #[test]
    fn test_higher_salary_lower_base_pct() {
        let table = PensionBracketTable::official();
        let low = table.lookup(1.5).unwrap();
        let high = table.lookup(5.0).unwrap();
        assert!(low.base_pct > high.base_pct);
        assert!(low.increment_pct < high.increment_pct);
    }
}
