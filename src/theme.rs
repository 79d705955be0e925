// Glyphs for the plain-text menu printed by the binary.

pub const CHECKMARK: &str = "✓";
pub const NO_CHECKMARK: &str = " ";
pub const SEPARATOR: &str = "────────────────────────";
pub const HIDDEN_SUFFIX: &str = " (hidden)";

pub const POSITION_WIDTH: usize = 3;
