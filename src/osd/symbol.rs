//! Character codes of the overlay font used by the instruments

pub const VARIO_UP_2A: u16 = 0x155;
pub const VARIO_DOWN_2A: u16 = 0x15A;

pub const HEADING_N: u16 = 0x18;
pub const HEADING_S: u16 = 0x19;
pub const HEADING_E: u16 = 0x1A;
pub const HEADING_W: u16 = 0x1B;
pub const HEADING_DIVIDED_LINE: u16 = 0x1C;
pub const HEADING_LINE: u16 = 0x1D;
