//! Main loop: sleep until the button goes down, handle the press, sleep again

use crate::fsm::ButtonFsm;
use crate::hal::{ButtonInput, HalError, ResetLine, SwitchlessHal};
use crate::store::load;
use crate::types::{Gesture, PressState, Settings};

/// Switchless mod controller owning the hardware and the live settings
pub struct Switchless<H: SwitchlessHal> {
    hal: H,
    settings: Settings,
    fsm: ButtonFsm,
}

impl<H: SwitchlessHal> Switchless<H> {
    /// Bring the board up: release the console reset line and restore the
    /// stored settings onto the outputs.
    pub fn new(mut hal: H) -> Result<Self, HalError> {
        hal.reset_line().release()?;
        let settings = load(&mut hal)?;

        Ok(Self {
            hal,
            settings,
            fsm: ButtonFsm::new(),
        })
    }

    /// Current settings
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Current state of the press FSM
    pub fn state(&self) -> PressState {
        self.fsm.current_state()
    }

    /// Access to the hardware
    pub fn hal(&self) -> &H {
        &self.hal
    }

    /// Sleep until the next press and handle it
    pub fn poll(&mut self) -> Result<Gesture, HalError> {
        self.hal.button().wait_for_press()?;
        self.fsm.handle_press(&mut self.hal, &mut self.settings)
    }

    /// Run forever. Failures are logged and the loop goes back to sleep.
    pub fn run(&mut self) -> ! {
        #[cfg(feature = "defmt")]
        defmt::info!("Main loop started");

        loop {
            match self.poll() {
                Ok(_gesture) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("Back to sleep after {:?}", _gesture);
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("Press handling failed: {:?}", _e);
                }
            }
        }
    }
}
