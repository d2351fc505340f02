//! SysTick-backed embassy time driver for CH32V003
//!
//! Ticks at 1kHz. Only `now()` is provided: the firmware uses blocking
//! delays, so no alarms are ever scheduled.

use embassy_time_driver::{AlarmHandle, Driver};
use portable_atomic::{AtomicU32, Ordering};

use crate::ch32v003_hardware::{reg_modify, reg_write, PFIC_IENR1, PFIC_IRER1};

/// System timer (STK) registers
const STK_BASE: u32 = 0xE000_F000;
const STK_CTLR: u32 = STK_BASE + 0x00;
const STK_SR: u32 = STK_BASE + 0x04;
const STK_CNTL: u32 = STK_BASE + 0x08;
const STK_CMPLR: u32 = STK_BASE + 0x10;

/// STK_CTLR bits
const STK_STE: u32 = 1 << 0; // Counter enable
const STK_STIE: u32 = 1 << 1; // Interrupt enable
const STK_STCLK: u32 = 1 << 2; // HCLK as clock source
const STK_STRE: u32 = 1 << 3; // Auto-reload on compare

const SYSTICK_IRQN: u32 = 12;

/// Core clock after reset (internal 24MHz RC)
pub const HCLK_HZ: u32 = 24_000_000;

/// Tick counter driver
pub struct SysTickDriver {
    tick_count: AtomicU32,
}

impl SysTickDriver {
    const fn new() -> Self {
        Self {
            tick_count: AtomicU32::new(0),
        }
    }

    /// Increment tick count (called from the SysTick interrupt)
    fn tick(&self) {
        self.tick_count.fetch_add(1, Ordering::Relaxed);
    }
}

impl Driver for SysTickDriver {
    fn now(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed) as u64
    }

    unsafe fn allocate_alarm(&self) -> Option<AlarmHandle> {
        None
    }

    fn set_alarm_callback(&self, _alarm: AlarmHandle, _callback: fn(*mut ()), _ctx: *mut ()) {}

    fn set_alarm(&self, _alarm: AlarmHandle, _timestamp: u64) -> bool {
        false
    }
}

embassy_time_driver::time_driver_impl!(static DRIVER: SysTickDriver = SysTickDriver::new());

/// Start the 1ms tick
pub fn init() {
    reg_write(STK_CTLR, 0);
    reg_write(STK_CNTL, 0);
    reg_write(STK_CMPLR, HCLK_HZ / 1_000 - 1);
    reg_write(STK_SR, 0);
    reg_write(PFIC_IENR1, 1 << SYSTICK_IRQN);
    resume();
}

/// Stop the tick so it cannot wake the core from sleep
pub fn suspend() {
    reg_modify(STK_CTLR, STK_STE | STK_STIE, 0);
    reg_write(PFIC_IRER1, 1 << SYSTICK_IRQN);
}

/// Restart the tick after sleep. Time does not advance while suspended.
pub fn resume() {
    reg_write(PFIC_IENR1, 1 << SYSTICK_IRQN);
    reg_modify(STK_CTLR, 0, STK_STE | STK_STIE | STK_STCLK | STK_STRE);
}

#[no_mangle]
extern "C" fn SysTick() {
    reg_write(STK_SR, 0);
    DRIVER.tick();
}

// Critical section implementation for single-core RISC-V
critical_section::set_impl!(RiscvCriticalSection);

struct RiscvCriticalSection;

unsafe impl critical_section::Impl for RiscvCriticalSection {
    unsafe fn acquire() -> critical_section::RawRestoreState {
        let mstatus = riscv::register::mstatus::read();
        riscv::register::mstatus::clear_mie();
        mstatus.mie() as u8
    }

    unsafe fn release(was_enabled: critical_section::RawRestoreState) {
        if was_enabled != 0 {
            riscv::register::mstatus::set_mie();
        }
    }
}
