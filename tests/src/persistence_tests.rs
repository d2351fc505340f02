//! Load/save properties over arbitrary store contents

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use switchless_core::hal::mock::{MockBoard, SimClock};
    use switchless_core::store::{self, ADDR_COLORS, ADDR_REGION, ADDR_VIDEO_STANDARD, FACTORY_IMAGE, STORE_SIZE};
    use switchless_core::{LedColor, Region, Settings, VideoStandard, REGION_COUNT};

    fn arb_region() -> impl Strategy<Value = Region> {
        prop::sample::select(Region::ALL.to_vec())
    }

    fn arb_standard() -> impl Strategy<Value = VideoStandard> {
        prop_oneof![Just(VideoStandard::Pal50), Just(VideoStandard::Ntsc60)]
    }

    proptest! {
        #[test]
        fn stored_region_index_is_clamped(index in any::<u8>()) {
            let clock = SimClock::new();
            let mut image = FACTORY_IMAGE;
            image[ADDR_REGION] = index;
            let mut board = MockBoard::with_store(&clock, image);

            let settings = Settings::read_from(&mut board.store).unwrap();
            if (index as usize) < REGION_COUNT {
                prop_assert_eq!(settings.region.index(), index as usize);
            } else {
                prop_assert_eq!(settings.region, Region::Eu);
            }
        }

        #[test]
        fn colour_override_only_for_valid_codes(region in arb_region(), code in any::<u8>()) {
            let clock = SimClock::new();
            let mut image = FACTORY_IMAGE;
            image[ADDR_COLORS + region.index()] = code;
            let mut board = MockBoard::with_store(&clock, image);

            let settings = Settings::read_from(&mut board.store).unwrap();
            let expected = match code {
                1..=3 => LedColor::from_code(code).unwrap(),
                _ => region.default_color(),
            };
            prop_assert_eq!(settings.colors.color_for(region), expected);
        }

        #[test]
        fn save_then_load_round_trips(
            region in arb_region(),
            standard in arb_standard(),
            colors in proptest::array::uniform3(0u8..=5),
        ) {
            let clock = SimClock::new();
            let mut image = FACTORY_IMAGE;
            image[ADDR_COLORS..ADDR_COLORS + REGION_COUNT].copy_from_slice(&colors);
            let mut board = MockBoard::with_store(&clock, image);
            let original = store::load(&mut board).unwrap();

            let mut changed = original;
            changed.region = region;
            changed.video_standard = standard;
            store::save(&mut board, &changed).unwrap();

            let reloaded = store::load(&mut board).unwrap();
            prop_assert_eq!(reloaded.region, region);
            prop_assert_eq!(reloaded.video_standard, standard);
            prop_assert_eq!(reloaded.colors, original.colors);
            prop_assert_eq!(&board.store.bytes[ADDR_COLORS..ADDR_COLORS + REGION_COUNT], &colors[..]);
        }

        #[test]
        fn load_never_fails_on_garbage(bytes in proptest::array::uniform16(any::<u8>())) {
            let clock = SimClock::new();
            let mut board = MockBoard::with_store(&clock, bytes);

            let settings = store::load(&mut board).unwrap();
            prop_assert_eq!(board.outputs.region_code(), settings.region.select_code());
            prop_assert_eq!(board.outputs.video_high(), bytes[ADDR_VIDEO_STANDARD] & 1 == 1);
            prop_assert_eq!(board.outputs.led_code(), settings.current_color().code());
            prop_assert_eq!(clock.store_writes(), 0);
        }
    }

    #[test]
    fn factory_image_fits_store() {
        assert_eq!(FACTORY_IMAGE.len(), STORE_SIZE);
        assert_eq!(store::SIGNATURE.len(), 8);

        let clock = SimClock::new();
        let mut board = MockBoard::new(&clock);
        let settings = Settings::read_from(&mut board.store).unwrap();
        assert_eq!(settings, switchless_core::factory_settings());
    }
}
