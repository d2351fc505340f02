//! Settings persistence
//!
//! Store layout:
//!
//! | Byte  | Content                                   |
//! |-------|-------------------------------------------|
//! | 0     | current region index                      |
//! | 1     | current video standard (bit 0)            |
//! | 2..5  | LED colour per region (1=green, 2=red, 3=orange) |
//! | 5..8  | reserved                                  |
//! | 8..16 | build signature, never read at runtime    |
//!
//! Colour bytes are set when the store is burned; `save` never rewrites them.

use crate::display::display_video_standard;
use crate::hal::{HalError, NonVolatileStore, SwitchlessHal};
use crate::outputs::{apply_led_color, apply_region, apply_video_standard};
use crate::types::{ColorTable, Region, Settings, VideoStandard, REGION_COUNT};

pub const STORE_SIZE: usize = 16;
pub const ADDR_REGION: usize = 0;
pub const ADDR_VIDEO_STANDARD: usize = 1;
pub const ADDR_COLORS: usize = 2;
pub const SIGNATURE: core::ops::Range<usize> = 8..STORE_SIZE;

/// Store contents as burned at the factory
pub const FACTORY_IMAGE: [u8; STORE_SIZE] = [
    0, 0, 1, 3, 2, 0, 0, 0, //
    b' ', b'H', b'i', b' ', b';', b')', b'!', b' ',
];

impl Settings {
    /// Reconstruct settings from the store, validating every byte.
    ///
    /// An out-of-range region index falls back to the first region and
    /// colour bytes outside 1..=3 keep the compiled-in default.
    pub fn read_from<S: NonVolatileStore>(store: &mut S) -> Result<Self, HalError> {
        let mut colors = ColorTable::new();
        for region in Region::ALL {
            let code = store.read_byte(ADDR_COLORS + region.index())?;
            colors.apply_override(region, code);
        }

        let region = Region::from_index(store.read_byte(ADDR_REGION)? as usize).unwrap_or(Region::Eu);
        let video_standard = VideoStandard::from_bit(store.read_byte(ADDR_VIDEO_STANDARD)?);

        Ok(Self {
            region,
            video_standard,
            colors,
        })
    }

    /// Persist the region index and video standard
    pub fn write_to<S: NonVolatileStore>(&self, store: &mut S) -> Result<(), HalError> {
        store.write_byte(ADDR_REGION, self.region.index() as u8)?;
        store.write_byte(ADDR_VIDEO_STANDARD, self.video_standard.as_bit())
    }
}

/// Startup restore: read settings, drive every output from them and show the
/// restored video standard without the initial blank.
///
/// The stored standard is applied as-is even when it differs from the
/// region's default; an explicit toggle outlives the region choice.
pub fn load<H: SwitchlessHal>(hal: &mut H) -> Result<Settings, HalError> {
    let settings = Settings::read_from(hal.store())?;

    #[cfg(feature = "defmt")]
    defmt::info!(
        "Loaded settings: {:?} {:?}",
        settings.region,
        settings.video_standard
    );

    apply_region(hal, settings.region)?;
    apply_video_standard(hal, settings.video_standard)?;
    apply_led_color(hal, &settings.colors, settings.region)?;
    display_video_standard(hal, &settings, true)?;
    Ok(settings)
}

/// Persist the settings that change at runtime
pub fn save<H: SwitchlessHal>(hal: &mut H, settings: &Settings) -> Result<(), HalError> {
    #[cfg(feature = "defmt")]
    defmt::debug!("Saving settings");

    settings.write_to(hal.store())
}

const _: () = assert!(ADDR_COLORS + REGION_COUNT <= SIGNATURE.start);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::mock::{MockBoard, SimClock};
    use crate::types::LedColor;

    #[test]
    fn test_factory_image_loads_defaults() {
        let clock = SimClock::new();
        let mut board = MockBoard::new(&clock);

        let settings = Settings::read_from(&mut board.store).unwrap();
        assert_eq!(settings.region, Region::Eu);
        assert_eq!(settings.video_standard, VideoStandard::Pal50);
        assert_eq!(settings.colors, ColorTable::new());
    }

    #[test]
    fn test_out_of_range_region_falls_back() {
        let clock = SimClock::new();
        let mut image = FACTORY_IMAGE;
        image[ADDR_REGION] = 3;
        let mut board = MockBoard::with_store(&clock, image);

        let settings = Settings::read_from(&mut board.store).unwrap();
        assert_eq!(settings.region, Region::Eu);
    }

    #[test]
    fn test_colour_overrides() {
        let clock = SimClock::new();
        let mut image = FACTORY_IMAGE;
        image[ADDR_COLORS] = 2; // EU red
        image[ADDR_COLORS + 1] = 0; // invalid, keep orange
        image[ADDR_COLORS + 2] = 7; // invalid, keep red
        let mut board = MockBoard::with_store(&clock, image);

        let settings = Settings::read_from(&mut board.store).unwrap();
        assert_eq!(settings.colors.color_for(Region::Eu), LedColor::Red);
        assert_eq!(settings.colors.color_for(Region::Usa), LedColor::Orange);
        assert_eq!(settings.colors.color_for(Region::Japan), LedColor::Red);
    }

    #[test]
    fn test_save_writes_only_runtime_bytes() {
        let clock = SimClock::new();
        let mut image = FACTORY_IMAGE;
        image[ADDR_COLORS] = 3;
        let mut board = MockBoard::with_store(&clock, image);

        let settings = Settings {
            region: Region::Japan,
            video_standard: VideoStandard::Ntsc60,
            colors: ColorTable::new(),
        };
        save(&mut board, &settings).unwrap();

        assert_eq!(clock.store_writes(), 2);
        assert_eq!(board.store.bytes[ADDR_REGION], 2);
        assert_eq!(board.store.bytes[ADDR_VIDEO_STANDARD], 1);
        assert_eq!(board.store.bytes[ADDR_COLORS], 3);
        assert_eq!(&board.store.bytes[SIGNATURE], b" Hi ;)! ");
    }

    #[test]
    fn test_load_applies_stored_override_over_region_default() {
        let clock = SimClock::new();
        let mut image = FACTORY_IMAGE;
        image[ADDR_REGION] = 1; // USA defaults to 60Hz
        image[ADDR_VIDEO_STANDARD] = 0;
        let mut board = MockBoard::with_store(&clock, image);

        let settings = load(&mut board).unwrap();
        assert_eq!(settings.region, Region::Usa);
        assert_eq!(settings.video_standard, VideoStandard::Pal50);
        assert_eq!(board.outputs.region_code(), Region::Usa.select_code());
        assert!(!board.outputs.video_high());
        assert_eq!(board.outputs.led_code(), LedColor::Orange.code());
        // One slow blink, no initial blank
        assert_eq!(clock.now_ms(), 400);
        assert_eq!(clock.store_writes(), 0);
    }
}
