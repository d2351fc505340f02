//! Output drivers for the console lines and status LEDs

use crate::hal::{Field, HalError, Line, OutputPort, ResetLine, SwitchlessHal};
use crate::timing::pause;
use crate::types::{ColorTable, LedColor, Region, VideoStandard};

/// Drive the region select lines with the region's 3-bit code
pub fn apply_region<H: SwitchlessHal>(hal: &mut H, region: Region) -> Result<(), HalError> {
    hal.outputs().set_field(Field::RegionSelect, region.select_code())
}

/// Light the LEDs in the colour configured for `region`
pub fn apply_led_color<H: SwitchlessHal>(
    hal: &mut H,
    colors: &ColorTable,
    region: Region,
) -> Result<(), HalError> {
    show_leds(hal, Some(colors.color_for(region)))
}

/// Light the LEDs in `color`, or switch both off
pub fn show_leds<H: SwitchlessHal>(hal: &mut H, color: Option<LedColor>) -> Result<(), HalError> {
    hal.outputs().set_field(Field::Leds, color.map_or(0, |c| c.code()))
}

/// Drive the video standard line
pub fn apply_video_standard<H: SwitchlessHal>(hal: &mut H, standard: VideoStandard) -> Result<(), HalError> {
    hal.outputs().set_line(Line::VideoStandard, standard.is_high())
}

/// Hold the console in reset for `duration_ms`, then let the line float again
pub fn pulse_reset<H: SwitchlessHal>(hal: &mut H, duration_ms: u32) -> Result<(), HalError> {
    #[cfg(feature = "defmt")]
    defmt::info!("Console reset ({} ms)", duration_ms);

    hal.reset_line().assert_reset()?;
    pause(hal, duration_ms);
    hal.reset_line().release()
}
