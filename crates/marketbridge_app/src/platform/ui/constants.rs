pub const PROGRESS_BAR_WIDTH: usize = 30;
pub const CARD_INDENT: &str = "  ";
pub const BLOCK_INDENT: &str = "    ";
pub const BULLET: &str = "•";
pub const HEADER_RULE: char = '─';
