pub struct Cmd;
impl Cmd {
    // Init
    pub const SWRESET: u8 = 0x01;
    pub const SLPIN: u8 = 0x10;
    pub const SLPOUT: u8 = 0x11;
    pub const INVOFF: u8 = 0x20;
    pub const INVON: u8 = 0x21;
    pub const DISPOFF: u8 = 0x28;
    pub const DISPON: u8 = 0x29;
    pub const MADCTL: u8 = 0x36;
    pub const PIXFMT: u8 = 0x3A;

    // Update
    pub const CASET: u8 = 0x2A;
    pub const PASET: u8 = 0x2B;
    pub const RAMWR: u8 = 0x2C;
}

/*
ILI9341 datasheet, level 1 commands used here:
0x01 - Software Reset
0x10 - Enter Sleep Mode
0x11 - Sleep Out
0x20 - Display Inversion OFF
0x21 - Display Inversion ON
0x28 - Display OFF
0x29 - Display ON
0x2A - Column Address Set
0x2B - Page Address Set
0x2C - Memory Write
0x36 - Memory Access Control
0x3A - COLMOD: Pixel Format Set
*/
