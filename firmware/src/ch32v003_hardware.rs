//! CH32V003 specific hardware implementations
//!
//! Register-level GPIO, the EXTI wake source for the button and a settings
//! store emulated in the last flash page. Generic embedded-hal adapters from
//! `switchless_core::hal` sit on top of the pin types defined here.

use core::convert::Infallible;

use embassy_time::Delay;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use portable_atomic::{AtomicBool, Ordering};
use switchless_core::hal::{
    ButtonInput, EmbeddedHalButton, HalError, NonVolatileStore, PinOutputPort, ResetLine, SwitchlessHal,
};
use switchless_core::store::STORE_SIZE;

use crate::time_driver;

// ========================================
// Register map
// ========================================

const RCC_BASE: u32 = 0x4002_1000;
const RCC_APB2PCENR: u32 = RCC_BASE + 0x18;
const RCC_AFIOEN: u32 = 1 << 0;
const RCC_IOPCEN: u32 = 1 << 4;
const RCC_IOPDEN: u32 = 1 << 5;

pub const GPIOC_BASE: u32 = 0x4001_1000;
pub const GPIOD_BASE: u32 = 0x4001_1400;
const GPIO_CFGLR: u32 = 0x00;
const GPIO_INDR: u32 = 0x08;
const GPIO_OUTDR: u32 = 0x0C;
const GPIO_BSHR: u32 = 0x10;

/// CFGLR nibbles (CNF[1:0] MODE[1:0])
const MODE_INPUT_FLOATING: u32 = 0b0100;
const MODE_INPUT_PULL: u32 = 0b1000;
const MODE_OUTPUT_PP_10MHZ: u32 = 0b0001;

const AFIO_BASE: u32 = 0x4001_0000;
const AFIO_EXTICR: u32 = AFIO_BASE + 0x08;

const EXTI_BASE: u32 = 0x4001_0400;
const EXTI_INTENR: u32 = EXTI_BASE + 0x00;
const EXTI_FTENR: u32 = EXTI_BASE + 0x0C;
const EXTI_INTFR: u32 = EXTI_BASE + 0x14;

const PFIC_BASE: u32 = 0xE000_E000;
pub(crate) const PFIC_IENR1: u32 = PFIC_BASE + 0x100;
pub(crate) const PFIC_IRER1: u32 = PFIC_BASE + 0x180;
const EXTI7_0_IRQN: u32 = 20;

const FLASH_BASE: u32 = 0x4002_2000;
const FLASH_KEYR: u32 = FLASH_BASE + 0x04;
const FLASH_STATR: u32 = FLASH_BASE + 0x0C;
const FLASH_CTLR: u32 = FLASH_BASE + 0x10;
const FLASH_ADDR: u32 = FLASH_BASE + 0x14;
const FLASH_MODEKEYR: u32 = FLASH_BASE + 0x24;
const FLASH_KEY1: u32 = 0x4567_0123;
const FLASH_KEY2: u32 = 0xCDEF_89AB;

/// FLASH_CTLR bits
const FLASH_STRT: u32 = 1 << 6;
const FLASH_LOCK: u32 = 1 << 7;
const FLASH_FLOCK: u32 = 1 << 15;
const FLASH_FTPG: u32 = 1 << 16;
const FLASH_FTER: u32 = 1 << 17;
const FLASH_BUFLOAD: u32 = 1 << 18;
const FLASH_BUFRST: u32 = 1 << 19;

/// FLASH_STATR bits
const FLASH_BSY: u32 = 1 << 0;
const FLASH_EOP: u32 = 1 << 5;

/// Busy polls before a flash operation is declared failed
const FLASH_TIMEOUT: u32 = 100_000;

pub(crate) fn reg_read(addr: u32) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

pub(crate) fn reg_write(addr: u32, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

pub(crate) fn reg_modify(addr: u32, clear: u32, set: u32) {
    reg_write(addr, (reg_read(addr) & !clear) | set);
}

/// CH32V003 pin configuration constants
pub mod pins {
    use super::{GPIOC_BASE, GPIOD_BASE};

    /// Button, active low with pull-up, EXTI line 0
    pub const BUTTON: (u32, u8) = (GPIOC_BASE, 0);
    /// Video standard select: low = 50Hz
    pub const VIDEO: (u32, u8) = (GPIOC_BASE, 1);
    /// Console /RESET, driven only while resetting
    pub const RESET: (u32, u8) = (GPIOC_BASE, 2);
    /// LED pair
    pub const LED_GREEN: (u32, u8) = (GPIOC_BASE, 3);
    pub const LED_RED: (u32, u8) = (GPIOC_BASE, 4);
    /// Region jumpers JP6, JP10, JP12
    pub const REGION: [(u32, u8); 3] = [(GPIOD_BASE, 2), (GPIOD_BASE, 3), (GPIOD_BASE, 4)];
}

/// CH32V003 memory layout information
pub mod memory {
    /// Flash page holding the settings store (see memory.x)
    pub const STORE_PAGE_ADDR: u32 = 0x0800_3FC0;
    /// Fast erase/program page size
    pub const PAGE_SIZE: usize = 64;
}

// ========================================
// GPIO
// ========================================

/// Raw GPIO pin: port base address and pin number (0-7)
#[derive(Copy, Clone)]
pub struct Ch32v003Pin {
    port: u32,
    pin: u8,
}

impl Ch32v003Pin {
    pub const fn new((port, pin): (u32, u8)) -> Self {
        Self { port, pin }
    }

    fn configure(&self, mode: u32) {
        let shift = self.pin as u32 * 4;
        reg_modify(self.port + GPIO_CFGLR, 0xF << shift, mode << shift);
    }

    fn write(&self, high: bool) {
        // BSHR: bits 0-15 set, bits 16-31 reset
        let bit = if high { 1 << self.pin } else { 1 << (self.pin + 16) };
        reg_write(self.port + GPIO_BSHR, bit);
    }

    fn read(&self) -> bool {
        reg_read(self.port + GPIO_INDR) & (1 << self.pin) != 0
    }

    fn is_set_high(&self) -> bool {
        reg_read(self.port + GPIO_OUTDR) & (1 << self.pin) != 0
    }

    /// Push-pull output, starting low
    pub fn into_output(self) -> Ch32v003Output {
        self.write(false);
        self.configure(MODE_OUTPUT_PP_10MHZ);
        Ch32v003Output(self)
    }

    /// Input with internal pull-up
    pub fn into_pull_up_input(self) -> Ch32v003Input {
        self.configure(MODE_INPUT_PULL);
        // OUTDR selects pull-up over pull-down
        self.write(true);
        Ch32v003Input(self)
    }
}

/// Push-pull output pin
pub struct Ch32v003Output(Ch32v003Pin);

impl ErrorType for Ch32v003Output {
    type Error = Infallible;
}

impl OutputPin for Ch32v003Output {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.write(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.write(true);
        Ok(())
    }
}

/// Input pin
pub struct Ch32v003Input(Ch32v003Pin);

impl ErrorType for Ch32v003Input {
    type Error = Infallible;
}

impl InputPin for Ch32v003Input {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Ok(self.0.read())
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Ok(!self.0.read())
    }
}

// ========================================
// Console reset line
// ========================================

/// /RESET: floating input while idle so the console's own reset works,
/// push-pull low only while asserting.
pub struct Ch32v003ResetLine(Ch32v003Pin);

impl Ch32v003ResetLine {
    pub fn new(pin: Ch32v003Pin) -> Self {
        pin.configure(MODE_INPUT_FLOATING);
        Self(pin)
    }
}

impl ResetLine for Ch32v003ResetLine {
    fn assert_reset(&mut self) -> Result<(), HalError> {
        self.0.write(false);
        self.0.configure(MODE_OUTPUT_PP_10MHZ);
        Ok(())
    }

    fn release(&mut self) -> Result<(), HalError> {
        self.0.configure(MODE_INPUT_FLOATING);
        self.0.write(true);
        if self.0.is_set_high() {
            Ok(())
        } else {
            Err(HalError::GpioError)
        }
    }
}

// ========================================
// Button with EXTI wake
// ========================================

/// Set by the EXTI handler on a falling edge of the button line
static BUTTON_EDGE: AtomicBool = AtomicBool::new(false);

/// Button sampled through GPIO, woken through EXTI
pub struct ExtiButton {
    input: EmbeddedHalButton<Ch32v003Input>,
    line: u8,
}

impl ExtiButton {
    /// Route the pin's EXTI line to its port and trigger on the falling edge
    pub fn new(pin: Ch32v003Pin) -> Self {
        let line = pin.pin;
        let port_select = match pin.port {
            GPIOC_BASE => 0b10,
            GPIOD_BASE => 0b11,
            _ => 0b00,
        };
        let shift = line as u32 * 2;
        reg_modify(AFIO_EXTICR, 0b11 << shift, port_select << shift);
        reg_modify(EXTI_FTENR, 0, 1 << line);
        reg_modify(EXTI_INTENR, 0, 1 << line);
        reg_write(PFIC_IENR1, 1 << EXTI7_0_IRQN);

        Self {
            input: EmbeddedHalButton::new(pin.into_pull_up_input()),
            line,
        }
    }
}

impl ButtonInput for ExtiButton {
    fn is_pressed(&mut self) -> Result<bool, HalError> {
        self.input.is_pressed()
    }

    fn wait_for_press(&mut self) -> Result<(), HalError> {
        // Edges seen during the last gesture do not count
        reg_write(EXTI_INTFR, 1 << self.line);
        BUTTON_EDGE.store(false, Ordering::Release);

        time_driver::suspend();
        loop {
            // WFI with interrupts masked still wakes on a pending EXTI; the
            // handler runs once the critical section ends.
            let woke = critical_section::with(|_| {
                if BUTTON_EDGE.load(Ordering::Acquire) {
                    true
                } else {
                    unsafe { riscv::asm::wfi() };
                    false
                }
            });
            if woke {
                break;
            }
        }
        time_driver::resume();

        #[cfg(feature = "defmt")]
        defmt::debug!("Woken by button");
        Ok(())
    }
}

#[no_mangle]
extern "C" fn EXTI7_0_IRQHandler() {
    let line = pins::BUTTON.1;
    if reg_read(EXTI_INTFR) & (1 << line) != 0 {
        reg_write(EXTI_INTFR, 1 << line);
        BUTTON_EDGE.store(true, Ordering::Release);
    }
}

// ========================================
// Flash-emulated settings store
// ========================================

/// Settings store in one fast-erase flash page
pub struct FlashStore {
    page: u32,
}

impl FlashStore {
    pub const fn new(page: u32) -> Self {
        Self { page }
    }

    fn wait_idle() -> Result<(), HalError> {
        for _ in 0..FLASH_TIMEOUT {
            if reg_read(FLASH_STATR) & FLASH_BSY == 0 {
                reg_write(FLASH_STATR, FLASH_EOP);
                return Ok(());
            }
        }
        Err(HalError::StorageError)
    }

    fn unlock() {
        reg_write(FLASH_KEYR, FLASH_KEY1);
        reg_write(FLASH_KEYR, FLASH_KEY2);
        reg_write(FLASH_MODEKEYR, FLASH_KEY1);
        reg_write(FLASH_MODEKEYR, FLASH_KEY2);
    }

    fn lock() {
        reg_modify(FLASH_CTLR, 0, FLASH_LOCK | FLASH_FLOCK);
    }

    /// Fast-erase the page and program it with `image`
    fn rewrite_page(&self, image: &[u8; memory::PAGE_SIZE]) -> Result<(), HalError> {
        reg_modify(FLASH_CTLR, 0, FLASH_FTER);
        reg_write(FLASH_ADDR, self.page);
        reg_modify(FLASH_CTLR, 0, FLASH_STRT);
        Self::wait_idle()?;
        reg_modify(FLASH_CTLR, FLASH_FTER, 0);

        reg_modify(FLASH_CTLR, 0, FLASH_FTPG);
        reg_modify(FLASH_CTLR, 0, FLASH_BUFRST);
        Self::wait_idle()?;
        for (i, word) in image.chunks_exact(4).enumerate() {
            let word = u32::from_le_bytes([word[0], word[1], word[2], word[3]]);
            reg_write(self.page + (i as u32) * 4, word);
            reg_modify(FLASH_CTLR, 0, FLASH_BUFLOAD);
            Self::wait_idle()?;
        }
        reg_write(FLASH_ADDR, self.page);
        reg_modify(FLASH_CTLR, 0, FLASH_STRT);
        Self::wait_idle()?;
        reg_modify(FLASH_CTLR, FLASH_FTPG, 0);
        Ok(())
    }

    fn read_raw(&self, offset: usize) -> u8 {
        unsafe { core::ptr::read_volatile((self.page as usize + offset) as *const u8) }
    }
}

impl NonVolatileStore for FlashStore {
    fn read_byte(&mut self, addr: usize) -> Result<u8, HalError> {
        if addr >= STORE_SIZE {
            return Err(HalError::InvalidAddress);
        }
        Ok(self.read_raw(addr))
    }

    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), HalError> {
        if addr >= STORE_SIZE {
            return Err(HalError::InvalidAddress);
        }
        if self.read_raw(addr) == value {
            return Ok(());
        }

        let mut image = [0u8; memory::PAGE_SIZE];
        for (offset, byte) in image.iter_mut().enumerate() {
            *byte = self.read_raw(offset);
        }
        image[addr] = value;

        critical_section::with(|_| {
            Self::unlock();
            let result = self.rewrite_page(&image);
            Self::lock();
            result
        })?;

        if self.read_raw(addr) == value {
            Ok(())
        } else {
            Err(HalError::StorageError)
        }
    }
}

// ========================================
// Board
// ========================================

/// Complete CH32V003 board
pub struct Ch32v003Board {
    button: ExtiButton,
    outputs: PinOutputPort<Ch32v003Output>,
    reset: Ch32v003ResetLine,
    store: FlashStore,
    delay: Delay,
}

impl SwitchlessHal for Ch32v003Board {
    type Button = ExtiButton;
    type Outputs = PinOutputPort<Ch32v003Output>;
    type Reset = Ch32v003ResetLine;
    type Store = FlashStore;
    type Delay = Delay;

    fn button(&mut self) -> &mut Self::Button {
        &mut self.button
    }

    fn outputs(&mut self) -> &mut Self::Outputs {
        &mut self.outputs
    }

    fn reset_line(&mut self) -> &mut Self::Reset {
        &mut self.reset
    }

    fn store(&mut self) -> &mut Self::Store {
        &mut self.store
    }

    fn delay(&mut self) -> &mut Self::Delay {
        &mut self.delay
    }
}

/// Enable clocks, configure every pin and start the tick
pub fn init_board() -> Ch32v003Board {
    reg_modify(RCC_APB2PCENR, 0, RCC_AFIOEN | RCC_IOPCEN | RCC_IOPDEN);

    let output = |p: (u32, u8)| Ch32v003Pin::new(p).into_output();
    let outputs = PinOutputPort::new(
        output(pins::VIDEO),
        pins::REGION.map(output),
        [output(pins::LED_GREEN), output(pins::LED_RED)],
    );

    let board = Ch32v003Board {
        button: ExtiButton::new(Ch32v003Pin::new(pins::BUTTON)),
        outputs,
        reset: Ch32v003ResetLine::new(Ch32v003Pin::new(pins::RESET)),
        store: FlashStore::new(memory::STORE_PAGE_ADDR),
        delay: Delay,
    };

    time_driver::init();

    #[cfg(feature = "defmt")]
    defmt::info!("Board initialized");
    board
}
