#![allow(dead_code)]

pub const GB_WIDTH: usize = 160;
pub const GB_HEIGHT: usize = 144;
pub const BYTES_PER_PIXEL: usize = 4; // RGBA8888
pub const FRAME_BUFFER_SIZE: usize = GB_WIDTH * GB_HEIGHT * BYTES_PER_PIXEL;

pub const DOTS_PER_SCANLINE: u32 = 456;
pub const SCANLINES_PER_FRAME: u8 = 154;
pub const OAM_SCAN_DOTS: u32 = 80;

pub const HBLANK_MODE: u8 = 0;
pub const VBLANK_MODE: u8 = 1;
pub const OAM_SCAN_MODE: u8 = 2;
pub const DRAWING_MODE: u8 = 3;

pub const LCDC_BG_WIN_ENABLE: u8 = 0;
pub const LCDC_OBJ_ENABLE: u8 = 1;
pub const LCDC_OBJ_SIZE: u8 = 2;
pub const LCDC_BG_MAP_AREA: u8 = 3;
pub const LCDC_TILE_DATA_AREA: u8 = 4;
pub const LCDC_WINDOW_ENABLE: u8 = 5;
pub const LCDC_WINDOW_MAP_AREA: u8 = 6;
pub const LCDC_LCD_ENABLE: u8 = 7;

pub const STAT_LYC_EQ_LY_FLAG: u8 = 2;
pub const STAT_MODE_0_HBLANK_IE: u8 = 3;
pub const STAT_MODE_1_VBLANK_IE: u8 = 4;
pub const STAT_MODE_2_OAM_IE: u8 = 5;
pub const STAT_LYC_EQ_LY_IE: u8 = 6;

pub const OAM_PALETTE_NUM: u8 = 4;
pub const OAM_X_FLIP: u8 = 5;
pub const OAM_Y_FLIP: u8 = 6;
pub const OAM_BG_PRIORITY: u8 = 7;

pub const MAX_SPRITES_PER_LINE: usize = 10;
pub const FIFO_CAPACITY: usize = 16;
