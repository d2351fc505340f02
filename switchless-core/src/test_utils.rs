//! Test utilities for switchless core functionality

pub mod press_patterns {
    //! Press durations landing in each gesture window
    //!
    //! The line is sampled at fixed offsets from the wake edge, so a press
    //! of `d` ms counts as held at every sample point `t < d`.

    use crate::timing::{
        CYCLE_STEP_MS, DEBOUNCE_MS, FIRST_CYCLE_CHECK_MS, HOLD_CHECK_MS, SHORT_PRESS_CHECK_MS,
    };

    /// Glitch shorter than the debounce time
    pub const BOUNCE: u32 = DEBOUNCE_MS - 2;

    /// Released before the short/long split
    pub const SHORT: u32 = SHORT_PRESS_CHECK_MS / 2;

    /// Released while the LEDs are dark
    pub const MEDIUM: u32 = (SHORT_PRESS_CHECK_MS + HOLD_CHECK_MS) / 2;

    /// Released while the current region is shown
    pub const GRACE_RELEASE: u32 = (HOLD_CHECK_MS + FIRST_CYCLE_CHECK_MS) / 2;

    /// Held long enough for exactly `steps` region advances (`steps >= 1`)
    pub const fn cycle(steps: u32) -> u32 {
        FIRST_CYCLE_CHECK_MS + (steps - 1) * CYCLE_STEP_MS + CYCLE_STEP_MS / 2
    }
}

pub mod scenario {
    //! One-shot press scenarios against the mock board

    use crate::controller::Switchless;
    use crate::hal::mock::{MockBoard, SimClock};
    use crate::hal::HalError;
    use crate::store::STORE_SIZE;
    use crate::types::{Gesture, Settings};

    /// Time the press starts, well after the startup display
    pub const PRESS_AT_MS: u32 = 10_000;

    /// Observed result of a single press
    #[derive(Debug)]
    pub struct PressOutcome {
        pub gesture: Result<Gesture, HalError>,
        pub before: Settings,
        pub after: Settings,
        pub reset_pulses: usize,
        pub store_writes: usize,
        pub store: [u8; STORE_SIZE],
        pub region_code: u8,
        pub video_high: bool,
    }

    /// Boot a board from `image`, then press the button for `duration_ms`
    pub fn press_once(clock: &SimClock, image: [u8; STORE_SIZE], duration_ms: u32) -> PressOutcome {
        let mut board = MockBoard::with_store(clock, image);
        board.button.press(PRESS_AT_MS, duration_ms);

        let mut switchless = match Switchless::new(board) {
            Ok(s) => s,
            Err(e) => panic!("startup failed: {:?}", e),
        };
        let before = *switchless.settings();
        clock.clear_trace();

        let gesture = switchless.poll();
        let board = switchless.hal();
        PressOutcome {
            gesture,
            before,
            after: *switchless.settings(),
            reset_pulses: clock.reset_pulses(),
            store_writes: clock.store_writes(),
            store: board.store.bytes,
            region_code: board.outputs.region_code(),
            video_high: board.outputs.video_high(),
        }
    }
}
