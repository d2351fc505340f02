//! Hardware Abstraction Layer for the switchless mod

pub use embedded_hal::delay::DelayNs;

use embedded_hal::digital::{InputPin, OutputPin};

/// Error types for HAL operations
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HalError {
    /// GPIO operation failed
    GpioError,
    /// Non-volatile store read or write failed
    StorageError,
    /// Wake interrupt could not be armed or never fired
    InterruptError,
    /// Store address outside the backing array
    InvalidAddress,
}

#[cfg(feature = "std")]
impl core::fmt::Display for HalError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            HalError::GpioError => write!(f, "GPIO operation failed"),
            HalError::StorageError => write!(f, "Non-volatile store access failed"),
            HalError::InterruptError => write!(f, "Wake interrupt failed"),
            HalError::InvalidAddress => write!(f, "Store address out of range"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

/// Single-bit output lines
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// VF line: low = 50Hz, high = 60Hz
    VideoStandard,
}

/// Multi-bit output fields
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    /// Region select jumpers, 3 bits
    RegionSelect,
    /// Red/green LED pair, 2 bits
    Leds,
}

impl Field {
    /// Number of bits in this field
    pub const fn width(&self) -> u8 {
        match self {
            Field::RegionSelect => 3,
            Field::Leds => 2,
        }
    }

    /// Mask of the valid value bits
    pub const fn mask(&self) -> u8 {
        (1 << self.width()) - 1
    }
}

/// Trait for the momentary button (the only input and wake source)
pub trait ButtonInput {
    /// Check if the button is currently held down
    fn is_pressed(&mut self) -> Result<bool, HalError>;

    /// Block until the next press edge. Re-arms the wake trigger and clears
    /// any pending edge before suspending.
    fn wait_for_press(&mut self) -> Result<(), HalError>;
}

/// Trait for the console-facing output lines
pub trait OutputPort {
    /// Drive a single named line
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), HalError>;

    /// Write a multi-bit field without disturbing any other bit
    fn set_field(&mut self, field: Field, value: u8) -> Result<(), HalError>;
}

/// Trait for the console reset line (open-drain, idle undriven)
pub trait ResetLine {
    /// Drive the line low as an output
    fn assert_reset(&mut self) -> Result<(), HalError>;

    /// Return the line to high impedance
    fn release(&mut self) -> Result<(), HalError>;
}

/// Trait for the byte-addressable non-volatile store
pub trait NonVolatileStore {
    /// Read one byte
    fn read_byte(&mut self, addr: usize) -> Result<u8, HalError>;

    /// Write one byte. Completes synchronously.
    fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), HalError>;
}

/// Complete switchless HAL interface
pub trait SwitchlessHal {
    type Button: ButtonInput;
    type Outputs: OutputPort;
    type Reset: ResetLine;
    type Store: NonVolatileStore;
    type Delay: DelayNs;

    /// Access to the button
    fn button(&mut self) -> &mut Self::Button;

    /// Access to the output lines
    fn outputs(&mut self) -> &mut Self::Outputs;

    /// Access to the console reset line
    fn reset_line(&mut self) -> &mut Self::Reset;

    /// Access to the settings store
    fn store(&mut self) -> &mut Self::Store;

    /// Access to the blocking delay
    fn delay(&mut self) -> &mut Self::Delay;
}

/// Generic button for embedded-hal compatible input pins.
///
/// Active low: the pin is pulled up and grounded while pressed. Without a
/// wake interrupt, `wait_for_press` polls for a high-to-low transition.
pub struct EmbeddedHalButton<P> {
    pin: P,
}

impl<P> EmbeddedHalButton<P>
where
    P: InputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P> ButtonInput for EmbeddedHalButton<P>
where
    P: InputPin,
{
    fn is_pressed(&mut self) -> Result<bool, HalError> {
        self.pin.is_low().map_err(|_| HalError::GpioError)
    }

    fn wait_for_press(&mut self) -> Result<(), HalError> {
        // A press already in progress is not an edge
        while self.is_pressed()? {}
        while !self.is_pressed()? {}
        Ok(())
    }
}

/// Output port built from individual embedded-hal output pins
pub struct PinOutputPort<P> {
    video: P,
    /// JP6, JP10, JP12 (bit 0..2 of the select code)
    region: [P; 3],
    /// Green, red (bit 0..1 of the colour code)
    leds: [P; 2],
}

impl<P> PinOutputPort<P>
where
    P: OutputPin,
{
    pub fn new(video: P, region: [P; 3], leds: [P; 2]) -> Self {
        Self { video, region, leds }
    }

    fn write_pin(pin: &mut P, high: bool) -> Result<(), HalError> {
        if high {
            pin.set_high().map_err(|_| HalError::GpioError)
        } else {
            pin.set_low().map_err(|_| HalError::GpioError)
        }
    }
}

impl<P> OutputPort for PinOutputPort<P>
where
    P: OutputPin,
{
    fn set_line(&mut self, line: Line, high: bool) -> Result<(), HalError> {
        match line {
            Line::VideoStandard => Self::write_pin(&mut self.video, high),
        }
    }

    fn set_field(&mut self, field: Field, value: u8) -> Result<(), HalError> {
        let value = value & field.mask();
        let pins: &mut [P] = match field {
            Field::RegionSelect => &mut self.region,
            Field::Leds => &mut self.leds,
        };
        for (bit, pin) in pins.iter_mut().enumerate() {
            Self::write_pin(pin, value & (1 << bit) != 0)?;
        }
        Ok(())
    }
}

/// Reset line on an open-drain output pin: low asserts, high floats
pub struct OpenDrainReset<P> {
    pin: P,
}

impl<P> OpenDrainReset<P>
where
    P: OutputPin,
{
    pub fn new(pin: P) -> Self {
        Self { pin }
    }
}

impl<P> ResetLine for OpenDrainReset<P>
where
    P: OutputPin,
{
    fn assert_reset(&mut self) -> Result<(), HalError> {
        self.pin.set_low().map_err(|_| HalError::GpioError)
    }

    fn release(&mut self) -> Result<(), HalError> {
        self.pin.set_high().map_err(|_| HalError::GpioError)
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub mod mock {
    //! Mock implementations for testing
    //!
    //! All components share a [`SimClock`]: the mock delay advances it, the
    //! mock button answers from a scripted press timeline, and every output
    //! change is recorded with its timestamp.

    use super::*;
    use crate::store::{FACTORY_IMAGE, STORE_SIZE};
    use core::cell::{Cell, RefCell};
    use heapless::Vec;

    pub const TRACE_CAPACITY: usize = 256;
    pub const MAX_PRESSES: usize = 8;

    /// Bit positions of the mock port registers
    pub const REGION_SHIFT: u8 = 0;
    pub const LED_SHIFT: u8 = 4;
    pub const VIDEO_BIT: u8 = 1;

    /// Observable hardware event
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub enum TraceEvent {
        Wake,
        Line { line: Line, high: bool },
        Field { field: Field, value: u8 },
        ResetAsserted,
        ResetReleased,
        StoreWrite { addr: usize, value: u8 },
    }

    /// Event with the simulated time it happened at
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Stamped {
        pub at_ms: u32,
        pub event: TraceEvent,
    }

    /// Simulated millisecond clock and event trace
    #[derive(Default)]
    pub struct SimClock {
        now_ms: Cell<u32>,
        trace: RefCell<Vec<Stamped, TRACE_CAPACITY>>,
    }

    impl SimClock {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn now_ms(&self) -> u32 {
            self.now_ms.get()
        }

        pub fn advance(&self, ms: u32) {
            self.now_ms.set(self.now_ms.get() + ms);
        }

        pub fn set(&self, ms: u32) {
            self.now_ms.set(ms);
        }

        pub fn record(&self, event: TraceEvent) {
            let at_ms = self.now_ms();
            // A full trace only loses the tail; tests size their scenarios below it
            self.trace.borrow_mut().push(Stamped { at_ms, event }).ok();
        }

        /// Snapshot of the recorded events
        pub fn trace(&self) -> Vec<Stamped, TRACE_CAPACITY> {
            self.trace.borrow().clone()
        }

        pub fn clear_trace(&self) {
            self.trace.borrow_mut().clear();
        }

        /// Number of recorded events matching `pred`
        pub fn count(&self, pred: impl Fn(&TraceEvent) -> bool) -> usize {
            self.trace.borrow().iter().filter(|s| pred(&s.event)).count()
        }

        /// Number of reset pulses (assertions) recorded
        pub fn reset_pulses(&self) -> usize {
            self.count(|e| *e == TraceEvent::ResetAsserted)
        }

        /// Number of store writes recorded
        pub fn store_writes(&self) -> usize {
            self.count(|e| matches!(e, TraceEvent::StoreWrite { .. }))
        }
    }

    /// Button answering from a scripted list of presses
    pub struct MockButton<'a> {
        clock: &'a SimClock,
        /// (start, duration) in simulated milliseconds
        presses: Vec<(u32, u32), MAX_PRESSES>,
    }

    impl<'a> MockButton<'a> {
        pub fn new(clock: &'a SimClock) -> Self {
            Self { clock, presses: Vec::new() }
        }

        /// Schedule a press starting at `start_ms`, held for `duration_ms`
        pub fn press(&mut self, start_ms: u32, duration_ms: u32) {
            self.presses.push((start_ms, duration_ms)).ok();
        }
    }

    impl ButtonInput for MockButton<'_> {
        fn is_pressed(&mut self) -> Result<bool, HalError> {
            let now = self.clock.now_ms();
            Ok(self
                .presses
                .iter()
                .any(|&(start, duration)| now >= start && now < start + duration))
        }

        fn wait_for_press(&mut self) -> Result<(), HalError> {
            let now = self.clock.now_ms();
            let next = self
                .presses
                .iter()
                .map(|&(start, _)| start)
                .filter(|&start| start >= now)
                .min()
                .ok_or(HalError::InterruptError)?;
            self.clock.set(next);
            self.clock.record(TraceEvent::Wake);
            Ok(())
        }
    }

    /// Output port modeled as two 8-bit port registers
    pub struct MockOutputs<'a> {
        clock: &'a SimClock,
        /// Region select code in bits 0..2
        pub port_a: u8,
        /// Video line at bit 1, LEDs in bits 4..5
        pub port_b: u8,
        led_writes_left: Option<usize>,
    }

    impl<'a> MockOutputs<'a> {
        pub fn new(clock: &'a SimClock) -> Self {
            Self {
                clock,
                port_a: 0,
                port_b: 0,
                led_writes_left: None,
            }
        }

        /// Let `writes` more LED writes through, then fail every one after
        pub fn fail_leds_after(&mut self, writes: usize) {
            self.led_writes_left = Some(writes);
        }

        pub fn region_code(&self) -> u8 {
            (self.port_a >> REGION_SHIFT) & Field::RegionSelect.mask()
        }

        pub fn led_code(&self) -> u8 {
            (self.port_b >> LED_SHIFT) & Field::Leds.mask()
        }

        pub fn video_high(&self) -> bool {
            self.port_b & (1 << VIDEO_BIT) != 0
        }
    }

    impl OutputPort for MockOutputs<'_> {
        fn set_line(&mut self, line: Line, high: bool) -> Result<(), HalError> {
            match line {
                Line::VideoStandard => {
                    if high {
                        self.port_b |= 1 << VIDEO_BIT;
                    } else {
                        self.port_b &= !(1 << VIDEO_BIT);
                    }
                }
            }
            self.clock.record(TraceEvent::Line { line, high });
            Ok(())
        }

        fn set_field(&mut self, field: Field, value: u8) -> Result<(), HalError> {
            if field == Field::Leds {
                match self.led_writes_left {
                    Some(0) => return Err(HalError::GpioError),
                    Some(ref mut left) => *left -= 1,
                    None => {}
                }
            }
            let value = value & field.mask();
            match field {
                Field::RegionSelect => {
                    self.port_a = (self.port_a & !(field.mask() << REGION_SHIFT)) | (value << REGION_SHIFT);
                }
                Field::Leds => {
                    self.port_b = (self.port_b & !(field.mask() << LED_SHIFT)) | (value << LED_SHIFT);
                }
            }
            self.clock.record(TraceEvent::Field { field, value });
            Ok(())
        }
    }

    /// Reset line remembering whether it is driven
    pub struct MockReset<'a> {
        clock: &'a SimClock,
        asserted: bool,
    }

    impl<'a> MockReset<'a> {
        pub fn new(clock: &'a SimClock) -> Self {
            Self { clock, asserted: false }
        }

        pub fn is_asserted(&self) -> bool {
            self.asserted
        }
    }

    impl ResetLine for MockReset<'_> {
        fn assert_reset(&mut self) -> Result<(), HalError> {
            self.asserted = true;
            self.clock.record(TraceEvent::ResetAsserted);
            Ok(())
        }

        fn release(&mut self) -> Result<(), HalError> {
            self.asserted = false;
            self.clock.record(TraceEvent::ResetReleased);
            Ok(())
        }
    }

    /// In-memory byte store
    pub struct MockStore<'a> {
        clock: &'a SimClock,
        pub bytes: [u8; STORE_SIZE],
    }

    impl<'a> MockStore<'a> {
        pub fn new(clock: &'a SimClock, bytes: [u8; STORE_SIZE]) -> Self {
            Self { clock, bytes }
        }
    }

    impl NonVolatileStore for MockStore<'_> {
        fn read_byte(&mut self, addr: usize) -> Result<u8, HalError> {
            self.bytes.get(addr).copied().ok_or(HalError::InvalidAddress)
        }

        fn write_byte(&mut self, addr: usize, value: u8) -> Result<(), HalError> {
            let slot = self.bytes.get_mut(addr).ok_or(HalError::InvalidAddress)?;
            *slot = value;
            self.clock.record(TraceEvent::StoreWrite { addr, value });
            Ok(())
        }
    }

    /// Delay that advances the simulated clock instead of sleeping
    pub struct MockDelay<'a> {
        clock: &'a SimClock,
        pending_ns: u32,
    }

    impl<'a> MockDelay<'a> {
        pub fn new(clock: &'a SimClock) -> Self {
            Self { clock, pending_ns: 0 }
        }
    }

    impl DelayNs for MockDelay<'_> {
        fn delay_ns(&mut self, ns: u32) {
            let total = self.pending_ns as u64 + ns as u64;
            self.clock.advance((total / 1_000_000) as u32);
            self.pending_ns = (total % 1_000_000) as u32;
        }

        fn delay_ms(&mut self, ms: u32) {
            self.clock.advance(ms);
        }
    }

    /// Mock hardware collection
    pub struct MockBoard<'a> {
        pub button: MockButton<'a>,
        pub outputs: MockOutputs<'a>,
        pub reset: MockReset<'a>,
        pub store: MockStore<'a>,
        pub delay: MockDelay<'a>,
    }

    impl<'a> MockBoard<'a> {
        /// Board with a factory-programmed store
        pub fn new(clock: &'a SimClock) -> Self {
            Self::with_store(clock, FACTORY_IMAGE)
        }

        pub fn with_store(clock: &'a SimClock, bytes: [u8; STORE_SIZE]) -> Self {
            Self {
                button: MockButton::new(clock),
                outputs: MockOutputs::new(clock),
                reset: MockReset::new(clock),
                store: MockStore::new(clock, bytes),
                delay: MockDelay::new(clock),
            }
        }
    }

    impl<'a> SwitchlessHal for MockBoard<'a> {
        type Button = MockButton<'a>;
        type Outputs = MockOutputs<'a>;
        type Reset = MockReset<'a>;
        type Store = MockStore<'a>;
        type Delay = MockDelay<'a>;

        fn button(&mut self) -> &mut Self::Button {
            &mut self.button
        }

        fn outputs(&mut self) -> &mut Self::Outputs {
            &mut self.outputs
        }

        fn reset_line(&mut self) -> &mut Self::Reset {
            &mut self.reset
        }

        fn store(&mut self) -> &mut Self::Store {
            &mut self.store
        }

        fn delay(&mut self) -> &mut Self::Delay {
            &mut self.delay
        }
    }
}
