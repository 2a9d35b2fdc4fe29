//! Deterministic names and colours for detected proposals.

/// Colours assigned to detected proposals, cycled by component index.
pub const PROPOSAL_PALETTE: [&str; 8] = [
    "#3B82F6", "#10B981", "#F59E0B", "#EF4444", "#8B5CF6", "#EC4899", "#14B8A6", "#F97316",
];

/// Name of the `index`-th detected proposal (0-based).
///
/// Letters run `A`..`Z`, then continue as `AA`, `AB`, ... so names stay
/// alphabetic however many components a canvas has.
///
/// # Examples
/// ```
/// use trip_canvas::domain::proposals::proposal_name;
///
/// assert_eq!(proposal_name(0), "Proposal A");
/// assert_eq!(proposal_name(25), "Proposal Z");
/// assert_eq!(proposal_name(26), "Proposal AA");
/// ```
pub fn proposal_name(index: usize) -> String {
    format!("Proposal {}", letters(index))
}

/// Colour of the `index`-th detected proposal.
pub fn proposal_color(index: usize) -> &'static str {
    PROPOSAL_PALETTE[index % PROPOSAL_PALETTE.len()]
}

fn letters(index: usize) -> String {
    let mut remaining = index + 1;
    let mut out = Vec::new();
    while remaining > 0 {
        remaining -= 1;
        let offset = u8::try_from(remaining % 26).unwrap_or_default();
        out.push(char::from(b'A' + offset));
        remaining /= 26;
    }
    out.iter().rev().collect()
}
