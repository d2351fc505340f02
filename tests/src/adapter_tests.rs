//! embedded-hal adapter tests against mocked pins

#[cfg(test)]
mod tests {
    use embedded_hal_mock::eh1::pin::{Mock as PinMock, State, Transaction};
    use switchless_core::hal::{ButtonInput, EmbeddedHalButton, OpenDrainReset, OutputPort, PinOutputPort, ResetLine};
    use switchless_core::{Field, Line, LedColor, Region};

    #[test]
    fn button_is_active_low() {
        let pin = PinMock::new(&[Transaction::get(State::Low), Transaction::get(State::High)]);
        let mut done = pin.clone();
        let mut button = EmbeddedHalButton::new(pin);

        assert!(button.is_pressed().unwrap());
        assert!(!button.is_pressed().unwrap());
        done.done();
    }

    #[test]
    fn polling_wait_needs_a_fresh_edge() {
        // Held from before the wait, released, then pressed again
        let pin = PinMock::new(&[
            Transaction::get(State::Low),
            Transaction::get(State::High),
            Transaction::get(State::High),
            Transaction::get(State::Low),
        ]);
        let mut done = pin.clone();
        let mut button = EmbeddedHalButton::new(pin);

        button.wait_for_press().unwrap();
        done.done();
    }

    fn output_port(
        video: &[Transaction],
        region: [&[Transaction]; 3],
        leds: [&[Transaction]; 2],
    ) -> (PinOutputPort<PinMock>, [PinMock; 6]) {
        let video = PinMock::new(video);
        let region = region.map(|expected| PinMock::new(expected));
        let leds = leds.map(|expected| PinMock::new(expected));
        let handles = [
            video.clone(),
            region[0].clone(),
            region[1].clone(),
            region[2].clone(),
            leds[0].clone(),
            leds[1].clone(),
        ];
        (PinOutputPort::new(video, region, leds), handles)
    }

    #[test]
    fn region_code_maps_to_jumper_pins() {
        let high = [Transaction::set(State::High)];
        let low = [Transaction::set(State::Low)];
        // EU = 0b110: JP6 low, JP10 high, JP12 high
        let (mut port, mut handles) = output_port(&[], [&low, &high, &high], [&[], &[]]);

        port.set_field(Field::RegionSelect, Region::Eu.select_code()).unwrap();
        handles.iter_mut().for_each(|pin| pin.done());
    }

    #[test]
    fn led_colour_and_video_line() {
        let (mut port, mut handles) = output_port(
            &[Transaction::set(State::High)],
            [&[], &[], &[]],
            [
                &[Transaction::set(State::Low), Transaction::set(State::Low)],
                &[Transaction::set(State::High), Transaction::set(State::Low)],
            ],
        );

        port.set_line(Line::VideoStandard, true).unwrap();
        port.set_field(Field::Leds, LedColor::Red.code()).unwrap();
        port.set_field(Field::Leds, 0).unwrap();
        handles.iter_mut().for_each(|pin| pin.done());
    }

    #[test]
    fn reset_asserts_low_and_floats_high() {
        let pin = PinMock::new(&[Transaction::set(State::Low), Transaction::set(State::High)]);
        let mut done = pin.clone();
        let mut reset = OpenDrainReset::new(pin);

        reset.assert_reset().unwrap();
        reset.release().unwrap();
        done.done();
    }
}
