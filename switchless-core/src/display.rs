//! LED feedback: the video standard is told apart by blink cadence alone

use crate::hal::{HalError, SwitchlessHal};
use crate::outputs::{apply_led_color, show_leds};
use crate::timing::{pause, BLANK_MS, FAST_BLINK_COUNT, FAST_BLINK_MS, SLOW_BLINK_MS};
use crate::types::{Settings, VideoStandard};

/// Blink count and half-period for a video standard
pub const fn blink_cadence(standard: VideoStandard) -> (u8, u32) {
    match standard {
        VideoStandard::Pal50 => (1, SLOW_BLINK_MS),
        VideoStandard::Ntsc60 => (FAST_BLINK_COUNT, FAST_BLINK_MS),
    }
}

/// Switch both LEDs off for `duration_ms`, then restore the current region's colour
pub fn darken_leds<H: SwitchlessHal>(hal: &mut H, settings: &Settings, duration_ms: u32) -> Result<(), HalError> {
    show_leds(hal, None)?;
    pause(hal, duration_ms);
    apply_led_color(hal, &settings.colors, settings.region)
}

/// Blink the current video standard: once slowly for 50Hz, three times
/// quickly for 60Hz. Unless `skip_blank` is set, the LEDs first go dark
/// for a moment so the pattern starts from a visible reset.
pub fn display_video_standard<H: SwitchlessHal>(
    hal: &mut H,
    settings: &Settings,
    skip_blank: bool,
) -> Result<(), HalError> {
    if !skip_blank {
        darken_leds(hal, settings, BLANK_MS)?;
    }

    let (count, half_period) = blink_cadence(settings.video_standard);
    for _ in 0..count {
        pause(hal, half_period);
        darken_leds(hal, settings, half_period)?;
    }
    Ok(())
}
