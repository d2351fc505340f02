//! Button state machine: classifies one press into a reset, a video standard
//! toggle or a region change, and carries it out.
//!
//! Timeline, measured from the wake edge:
//!
//! ```text
//!   5ms  released -> bounce, ignored
//! 255ms  released -> console reset
//!        held     -> LEDs dark for 1s
//! 1255ms released -> toggle 50/60Hz
//!        held     -> show region for 1s
//! 2255ms held     -> advance region, then every 1s while held
//!        released -> commit if advanced at least once
//! ```
//!
//! The line is only sampled at these points; delays are blocking.

use crate::display::{darken_leds, display_video_standard};
use crate::hal::{ButtonInput, HalError, SwitchlessHal};
use crate::outputs::{apply_led_color, apply_region, apply_video_standard, pulse_reset};
use crate::store::save;
use crate::timing::{pause, CYCLE_STEP_MS, DEBOUNCE_MS, HOLD_FEEDBACK_MS, REGION_GRACE_MS, RESET_PULSE_MS, SHORT_PRESS_MS};
use crate::types::{Gesture, PressState, Settings};

/// Result of one state handler
enum Step {
    Next(PressState),
    Done(Gesture),
}

/// Press handling FSM
pub struct ButtonFsm {
    state: PressState,
}

impl ButtonFsm {
    /// Create new FSM, idle
    pub const fn new() -> Self {
        Self {
            state: PressState::Idle,
        }
    }

    /// Get current FSM state
    pub fn current_state(&self) -> PressState {
        self.state
    }

    /// Handle one press, starting right after the wake edge. Always ends Idle,
    /// also when a HAL operation fails.
    pub fn handle_press<H: SwitchlessHal>(&mut self, hal: &mut H, settings: &mut Settings) -> Result<Gesture, HalError> {
        self.state = PressState::Idle;
        let result = self.run_to_completion(hal, settings);
        self.state = PressState::Idle;

        #[cfg(feature = "defmt")]
        match &result {
            Ok(gesture) => defmt::info!("Gesture: {:?}", gesture),
            Err(e) => defmt::warn!("Gesture aborted: {:?}", e),
        }

        result
    }

    fn run_to_completion<H: SwitchlessHal>(&mut self, hal: &mut H, settings: &mut Settings) -> Result<Gesture, HalError> {
        loop {
            #[cfg(feature = "defmt")]
            defmt::trace!("FSM State: {:?}", self.state);

            let step = match self.state {
                // Woken by an edge
                PressState::Idle => Step::Next(PressState::Debounce),
                PressState::Debounce => Self::handle_debounce(hal)?,
                PressState::ShortHold => Self::handle_short_hold(hal)?,
                PressState::HoldFeedback => Self::handle_hold_feedback(hal, settings)?,
                PressState::RegionGrace => Self::handle_region_grace(hal),
                PressState::Cycling { steps } => Self::handle_cycling(hal, settings, steps)?,
            };

            match step {
                Step::Next(state) => self.state = state,
                Step::Done(gesture) => return Ok(gesture),
            }
        }
    }

    /// Reject edges that do not survive the settle time
    fn handle_debounce<H: SwitchlessHal>(hal: &mut H) -> Result<Step, HalError> {
        pause(hal, DEBOUNCE_MS);
        if hal.button().is_pressed()? {
            Ok(Step::Next(PressState::ShortHold))
        } else {
            Ok(Step::Done(Gesture::Bounce))
        }
    }

    /// Short press resets the console
    fn handle_short_hold<H: SwitchlessHal>(hal: &mut H) -> Result<Step, HalError> {
        pause(hal, SHORT_PRESS_MS);
        if hal.button().is_pressed()? {
            return Ok(Step::Next(PressState::HoldFeedback));
        }
        pulse_reset(hal, RESET_PULSE_MS)?;
        Ok(Step::Done(Gesture::ConsoleReset))
    }

    /// Released during the dark period: toggle the video standard
    fn handle_hold_feedback<H: SwitchlessHal>(hal: &mut H, settings: &mut Settings) -> Result<Step, HalError> {
        darken_leds(hal, settings, HOLD_FEEDBACK_MS)?;
        if hal.button().is_pressed()? {
            return Ok(Step::Next(PressState::RegionGrace));
        }

        settings.video_standard = settings.video_standard.toggled();
        apply_video_standard(hal, settings.video_standard)?;
        save(hal, settings)?;
        // LEDs were just dark for a second, no extra blank needed
        display_video_standard(hal, settings, true)?;
        Ok(Step::Done(Gesture::VideoStandardToggled(settings.video_standard)))
    }

    /// Leave the current region on display so the button can be let go
    fn handle_region_grace<H: SwitchlessHal>(hal: &mut H) -> Step {
        pause(hal, REGION_GRACE_MS);
        Step::Next(PressState::Cycling { steps: 0 })
    }

    /// Advance while held; on release commit the region if it moved
    fn handle_cycling<H: SwitchlessHal>(hal: &mut H, settings: &mut Settings, steps: u8) -> Result<Step, HalError> {
        if hal.button().is_pressed()? {
            // Only the LEDs follow the candidate; select lines change on commit
            let candidate = settings.region.next();
            apply_led_color(hal, &settings.colors, candidate)?;
            settings.region = candidate;
            pause(hal, CYCLE_STEP_MS);
            return Ok(Step::Next(PressState::Cycling {
                steps: steps.saturating_add(1),
            }));
        }

        if steps == 0 {
            return Ok(Step::Done(Gesture::RegionKept));
        }

        Self::commit_region(hal, settings)?;
        Ok(Step::Done(Gesture::RegionChanged(settings.region)))
    }

    /// Switch the console to the selected region and restart it
    fn commit_region<H: SwitchlessHal>(hal: &mut H, settings: &mut Settings) -> Result<(), HalError> {
        apply_region(hal, settings.region)?;
        settings.video_standard = settings.region.default_video_standard();
        apply_video_standard(hal, settings.video_standard)?;
        save(hal, settings)?;
        display_video_standard(hal, settings, false)?;
        pulse_reset(hal, RESET_PULSE_MS)
    }
}

impl Default for ButtonFsm {
    fn default() -> Self {
        Self::new()
    }
}
