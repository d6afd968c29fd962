pub mod dashboard;
pub mod queue;
pub mod session;

use crate::scheduler::MAX_BOX;

pub(crate) fn create_box_bar(box_level: u8) -> String {
    let filled = box_level.min(MAX_BOX) as usize;
    let empty = MAX_BOX as usize - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn box_bar_fills_per_box() {
        assert_eq!(create_box_bar(0), "░░░░░░");
        assert_eq!(create_box_bar(2), "██░░░░");
        assert_eq!(create_box_bar(6), "██████");
    }

    #[test]
    fn box_bar_clamps_out_of_range() {
        assert_eq!(create_box_bar(9), "██████");
    }
}
