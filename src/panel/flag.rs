/// Parameter values for the ILI9341 commands in [`super::cmd::Cmd`].
pub struct Flag;
#[allow(missing_docs)]
impl Flag {
    // Memory Access Control (0x36) bits
    pub const MADCTL_MY: u8 = 0x80; // Row address order
    pub const MADCTL_MX: u8 = 0x40; // Column address order
    pub const MADCTL_MV: u8 = 0x20; // Row / column exchange
    pub const MADCTL_ML: u8 = 0x10; // Vertical refresh order
    pub const MADCTL_BGR: u8 = 0x08; // BGR colour filter panel
    pub const MADCTL_MH: u8 = 0x04; // Horizontal refresh order

    // Pixel Format Set (0x3A)
    pub const PIXFMT_16BIT: u8 = 0x55; // RGB565 on both interfaces
    pub const PIXFMT_18BIT: u8 = 0x66;

    // Delays in milliseconds
    pub const RST_DELAY_MS: u32 = 120;
    pub const SLPOUT_DELAY_MS: u32 = 120;
    pub const SLPIN_DELAY_MS: u32 = 5;
}
