//! Static catalog of the three interview rounds.
//!
//! The active round ordinal is server-authoritative; this table only provides
//! the display metadata for each ordinal.

/// Number of rounds in an interview.
pub const ROUND_COUNT: u32 = 3;

/// Metadata for one interview round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundSpec {
    /// Round ordinal, 1-indexed.
    pub ordinal: u32,
    pub name: &'static str,
    pub description: &'static str,
    /// Expected number of questions in this round.
    pub questions: u32,
    pub focus_areas: &'static [&'static str],
}

const ROUNDS: [RoundSpec; ROUND_COUNT as usize] = [
    RoundSpec {
        ordinal: 1,
        name: "Screening Round",
        description: "Initial screening to assess basic qualifications and fit",
        questions: 4,
        focus_areas: &["Background", "Motivation", "Communication", "Cultural Fit"],
    },
    RoundSpec {
        ordinal: 2,
        name: "Technical Round",
        description: "Deep technical assessment of skills and knowledge",
        questions: 5,
        focus_areas: &[
            "Core Skills",
            "Technical Depth",
            "Problem Solving",
            "Best Practices",
        ],
    },
    RoundSpec {
        ordinal: 3,
        name: "Scenario Round",
        description: "Real-world problem-solving and decision-making scenarios",
        questions: 3,
        focus_areas: &[
            "Analytical Thinking",
            "Decision Making",
            "Leadership",
            "Strategic Thinking",
        ],
    },
];

/// Returns the catalog entry for an ordinal, falling back to the first round
/// if the ordinal is outside 1..=3. The fallback should be unreachable as
/// long as round ordinals come from the service.
pub fn get(ordinal: u32) -> &'static RoundSpec {
    ROUNDS
        .iter()
        .find(|r| r.ordinal == ordinal)
        .unwrap_or(&ROUNDS[0])
}

/// Returns all rounds in order.
pub fn all() -> &'static [RoundSpec] {
    &ROUNDS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_ordinal() {
        assert_eq!(get(2).name, "Technical Round");
        assert_eq!(get(3).questions, 3);
    }

    #[test]
    fn test_out_of_range_falls_back_to_first() {
        assert_eq!(get(0).ordinal, 1);
        assert_eq!(get(7).ordinal, 1);
    }

    #[test]
    fn test_catalog_is_ordered_and_complete() {
        let ordinals: Vec<u32> = all().iter().map(|r| r.ordinal).collect();
        assert_eq!(ordinals, vec![1, 2, 3]);
    }
}
