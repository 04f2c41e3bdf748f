#![allow(unused)]

// IST8310
pub const IST8310_DEVICE_ID: u8 = 0x10;

pub const IST8310_WHO_AM_I: u8 = 0x00;
pub const IST8310_DATA_START: u8 = 0x03;
pub const IST8310_CNTL1: u8 = 0x0A;
pub const IST8310_CNTL2: u8 = 0x0B;

pub const IST8310_DATA_SIZE: usize = 6;

pub const IST8310_CNTL1_SINGLE: u8 = 0x01;
pub const IST8310_CNTL2_SRST: u8 = 0x01;
