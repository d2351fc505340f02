#![no_std]
#![no_main]

#[cfg(feature = "defmt")]
use defmt::{info, warn};
#[cfg(feature = "defmt")]
use defmt_rtt as _;
use panic_halt as _;

#[cfg(not(feature = "defmt"))]
macro_rules! info {
    ($($arg:tt)*) => {};
}

#[cfg(not(feature = "defmt"))]
macro_rules! warn {
    ($($arg:tt)*) => {};
}

use riscv_rt::entry;
use switchless_core::store::{FACTORY_IMAGE, STORE_SIZE};
use switchless_core::{Switchless, VERSION};
use switchless_firmware::ch32v003_hardware::memory::PAGE_SIZE;
use switchless_firmware::init_board;

/// Factory image padded to the erased-flash value
const fn store_page() -> [u8; PAGE_SIZE] {
    let mut page = [0xFF; PAGE_SIZE];
    let mut i = 0;
    while i < STORE_SIZE {
        page[i] = FACTORY_IMAGE[i];
        i += 1;
    }
    page
}

/// Settings page contents at programming time
#[link_section = ".eeprom"]
#[used]
static STORE_IMAGE: [u8; PAGE_SIZE] = store_page();

#[entry]
fn main() -> ! {
    info!("Switchless {} starting", VERSION);

    let board = init_board();
    match Switchless::new(board) {
        Ok(mut switchless) => {
            info!("Restored region {:?}", switchless.settings().region);
            switchless.run()
        }
        Err(_e) => {
            warn!("Startup failed: {:?}", _e);
            loop {
                unsafe { riscv::asm::wfi() };
            }
        }
    }
}
