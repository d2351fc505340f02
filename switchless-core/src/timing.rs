//! Fixed interaction timings and the blocking delay helper
//!
//! These values are the user-visible behavior: the blink cadence alone tells
//! the two video standards apart, so none of them is configurable.

use crate::hal::{DelayNs, SwitchlessHal};

/// Settle time after the wake edge
pub const DEBOUNCE_MS: u32 = 5;
/// Presses released within this window reset the console
pub const SHORT_PRESS_MS: u32 = 250;
/// LEDs stay dark this long while a long press is being held
pub const HOLD_FEEDBACK_MS: u32 = 1000;
/// Current region is shown this long before cycling starts
pub const REGION_GRACE_MS: u32 = 1000;
/// Interval between region advances while held
pub const CYCLE_STEP_MS: u32 = 1000;
/// Low time of the console reset pulse
pub const RESET_PULSE_MS: u32 = 200;
/// Initial blank before showing the video standard
pub const BLANK_MS: u32 = 200;
/// 50Hz indicator: one slow blink
pub const SLOW_BLINK_MS: u32 = 200;
/// 60Hz indicator: several fast blinks
pub const FAST_BLINK_MS: u32 = 75;
pub const FAST_BLINK_COUNT: u8 = 3;

/// Offset from the wake edge at which the short/long split is sampled
pub const SHORT_PRESS_CHECK_MS: u32 = DEBOUNCE_MS + SHORT_PRESS_MS;
/// Offset at which a held press decides between toggle and region change
pub const HOLD_CHECK_MS: u32 = SHORT_PRESS_CHECK_MS + HOLD_FEEDBACK_MS;
/// Offset of the first region cycling check
pub const FIRST_CYCLE_CHECK_MS: u32 = HOLD_CHECK_MS + REGION_GRACE_MS;

/// Busy-wait for `ms` milliseconds. Nothing else is serviced meanwhile.
pub fn pause<H: SwitchlessHal>(hal: &mut H, ms: u32) {
    hal.delay().delay_ms(ms);
}
