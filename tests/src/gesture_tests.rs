//! Gesture classification tests: every press duration window end to end

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use switchless_core::hal::mock::SimClock;
    use switchless_core::store::{ADDR_REGION, ADDR_VIDEO_STANDARD, FACTORY_IMAGE, STORE_SIZE};
    use switchless_core::test_utils::press_patterns::{self, BOUNCE, GRACE_RELEASE, MEDIUM, SHORT};
    use switchless_core::test_utils::scenario::press_once;
    use switchless_core::timing::{FIRST_CYCLE_CHECK_MS, HOLD_CHECK_MS, SHORT_PRESS_CHECK_MS};
    use switchless_core::{Gesture, Region, VideoStandard};

    fn image(region: Region, standard: VideoStandard) -> [u8; STORE_SIZE] {
        let mut image = FACTORY_IMAGE;
        image[ADDR_REGION] = region.index() as u8;
        image[ADDR_VIDEO_STANDARD] = standard.as_bit();
        image
    }

    #[rstest]
    #[case::bounce(BOUNCE)]
    #[case::just_under_debounce(4)]
    fn spurious_wake_has_no_side_effects(#[case] duration: u32) {
        let clock = SimClock::new();
        let outcome = press_once(&clock, FACTORY_IMAGE, duration);

        assert_eq!(outcome.gesture, Ok(Gesture::Bounce));
        assert_eq!(outcome.after, outcome.before);
        assert_eq!(outcome.reset_pulses, 0);
        assert_eq!(outcome.store_writes, 0);
    }

    /// Scenario A: released before the 250ms split
    #[rstest]
    #[case::barely_debounced(6)]
    #[case::typical(SHORT)]
    #[case::last_moment(SHORT_PRESS_CHECK_MS)]
    fn short_press_resets_console_only(#[case] duration: u32) {
        let clock = SimClock::new();
        let outcome = press_once(&clock, image(Region::Japan, VideoStandard::Pal50), duration);

        assert_eq!(outcome.gesture, Ok(Gesture::ConsoleReset));
        assert_eq!(outcome.reset_pulses, 1);
        assert_eq!(outcome.store_writes, 0);
        assert_eq!(outcome.after, outcome.before);
    }

    /// Scenario B: held past the split, released while the LEDs are dark
    #[rstest]
    #[case::pal_to_ntsc(VideoStandard::Pal50, VideoStandard::Ntsc60, MEDIUM)]
    #[case::ntsc_to_pal(VideoStandard::Ntsc60, VideoStandard::Pal50, MEDIUM)]
    #[case::just_past_split(VideoStandard::Pal50, VideoStandard::Ntsc60, SHORT_PRESS_CHECK_MS + 1)]
    #[case::last_moment(VideoStandard::Pal50, VideoStandard::Ntsc60, HOLD_CHECK_MS)]
    fn medium_press_toggles_standard(
        #[case] from: VideoStandard,
        #[case] to: VideoStandard,
        #[case] duration: u32,
    ) {
        let clock = SimClock::new();
        let outcome = press_once(&clock, image(Region::Usa, from), duration);

        assert_eq!(outcome.gesture, Ok(Gesture::VideoStandardToggled(to)));
        assert_eq!(outcome.after.video_standard, to);
        assert_eq!(outcome.after.region, Region::Usa);
        assert_eq!(outcome.reset_pulses, 0);
        assert_eq!(outcome.store_writes, 2);
        assert_eq!(outcome.store[ADDR_VIDEO_STANDARD], to.as_bit());
        assert_eq!(outcome.video_high, to.is_high());
        assert_eq!(outcome.region_code, Region::Usa.select_code());
    }

    /// Scenario C: held through one or more cycle steps
    #[rstest]
    #[case::one_step(Region::Eu, 1, Region::Usa)]
    #[case::two_steps(Region::Eu, 2, Region::Japan)]
    #[case::wraps(Region::Japan, 1, Region::Eu)]
    #[case::full_circle(Region::Usa, 3, Region::Usa)]
    #[case::past_full_circle(Region::Eu, 4, Region::Usa)]
    fn long_press_commits_region(#[case] from: Region, #[case] steps: u32, #[case] to: Region) {
        let clock = SimClock::new();
        let outcome = press_once(&clock, image(from, VideoStandard::Pal50), press_patterns::cycle(steps));

        assert_eq!(outcome.gesture, Ok(Gesture::RegionChanged(to)));
        assert_eq!(outcome.after.region, to);
        assert_eq!(outcome.after.video_standard, to.default_video_standard());
        assert_eq!(outcome.region_code, to.select_code());
        assert_eq!(outcome.video_high, to.default_video_standard().is_high());
        assert_eq!(outcome.store[ADDR_REGION], to.index() as u8);
        assert_eq!(outcome.store_writes, 2);
        assert_eq!(outcome.reset_pulses, 1);
    }

    /// Scenario D: released during the grace period, before any advance
    #[rstest]
    #[case::just_past_hold(HOLD_CHECK_MS + 1)]
    #[case::typical(GRACE_RELEASE)]
    #[case::last_moment(FIRST_CYCLE_CHECK_MS)]
    fn release_before_first_step_keeps_region(#[case] duration: u32) {
        let clock = SimClock::new();
        let outcome = press_once(&clock, image(Region::Japan, VideoStandard::Ntsc60), duration);

        assert_eq!(outcome.gesture, Ok(Gesture::RegionKept));
        assert_eq!(outcome.after, outcome.before);
        assert_eq!(outcome.reset_pulses, 0);
        assert_eq!(outcome.store_writes, 0);
        assert_eq!(outcome.region_code, Region::Japan.select_code());
    }

    #[test]
    fn toggled_standard_survives_region_default() {
        // A Japanese console forced to 50Hz keeps 50Hz across a power cycle
        let clock = SimClock::new();
        let first = press_once(&clock, image(Region::Japan, VideoStandard::Ntsc60), MEDIUM);
        assert_eq!(first.after.video_standard, VideoStandard::Pal50);

        let clock = SimClock::new();
        let second = press_once(&clock, first.store, SHORT);
        assert_eq!(second.before.region, Region::Japan);
        assert_eq!(second.before.video_standard, VideoStandard::Pal50);
        assert!(!second.video_high);
    }
}
