mod common;

use std::sync::Arc;

use common::{new_log, recording_bus, take, transmits, DcRecorder, Event, Recorder, Registers};
use esp32spi_databus::esp32spi::{
    BusConfig, BusId, ConfigError, ControlLinePorts, DataBus, Esp32Spi, NoLock, Phase,
    RegisterControlLine, SpiHostRegistry, DATA_BUF_LEN,
};
use proptest::prelude::*;

#[test]
fn small_transaction_is_one_transmit_at_end_write() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write(0x01);
    bus.write16(0x1234);
    bus.write32(0xAABB_CCDD);
    bus.write_bytes(&[9, 8, 7]);
    assert!(transmits(&take(&log)).is_empty());
    bus.end_write();

    assert_eq!(
        transmits(&take(&log)),
        vec![vec![0x01, 0x12, 0x34, 0xAA, 0xBB, 0xCC, 0xDD, 9, 8, 7]]
    );
}

#[test]
fn repeat_and_pattern_expand_on_the_wire() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write_repeat(0x55AA, 3);
    bus.end_write();
    bus.begin_write();
    bus.write_pattern(&[1, 2], 3);
    bus.end_write();

    assert_eq!(
        transmits(&take(&log)),
        vec![
            vec![0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA],
            vec![1, 2, 1, 2, 1, 2],
        ]
    );
}

#[test]
fn long_repeat_streams_full_blocks() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write_repeat(0xF800, 1000);
    bus.end_write();

    let chunks = transmits(&take(&log));
    assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 2000);
    assert!(chunks.iter().all(|c| c.len() <= DATA_BUF_LEN));
    assert!(chunks.iter().flatten().copied().eq([0xF8, 0x00].into_iter().cycle().take(2000)));
}

#[test]
fn dc_switches_around_command_bytes() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write_command(0x2A);
    bus.write(0x00);
    bus.end_write();

    let events = take(&log);
    let events: Vec<_> = events
        .into_iter()
        .filter(|e| !matches!(e, Event::Configure(_)))
        .collect();
    assert_eq!(
        events,
        vec![
            Event::Dc(Phase::Data),
            Event::Dc(Phase::Command),
            Event::Tx(vec![0x2A]),
            Event::Dc(Phase::Data),
            Event::Tx(vec![0x00]),
        ]
    );
}

#[test]
fn raw_bytes_and_pixels_stay_in_the_command_phase() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write_command(0x2C);
    bus.write_bytes(&[1, 2]);
    bus.write_pixels(&[3, 4]);
    bus.end_write();

    let events: Vec<_> = take(&log)
        .into_iter()
        .filter(|e| !matches!(e, Event::Configure(_)))
        .collect();
    assert_eq!(
        events,
        vec![
            Event::Dc(Phase::Data),
            Event::Dc(Phase::Command),
            Event::Tx(vec![0x2C, 1, 2, 3, 4]),
        ]
    );
}

#[test]
fn command16_goes_out_msb_first_with_dc_low() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.send_command16(0x2C00);

    let events = take(&log);
    let tx = events
        .iter()
        .position(|e| *e == Event::Tx(vec![0x2C, 0x00]))
        .unwrap();
    assert_eq!(events[tx - 1], Event::Dc(Phase::Command));
}

#[test]
fn send_helpers_wrap_their_own_transaction() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.send_command(0x11);
    bus.send_data(0x55);
    bus.send_data16(0x0140);
    bus.send_data32(0x0000_00EF);

    assert!(!bus.is_open());
    assert_eq!(
        transmits(&take(&log)),
        vec![
            vec![0x11],
            vec![0x55],
            vec![0x01, 0x40],
            vec![0x00, 0x00, 0x00, 0xEF],
        ]
    );
}

#[test]
fn flushing_twice_transmits_once() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write(0xAB);
    bus.flush_data_buf();
    bus.flush_data_buf();
    bus.end_write();

    assert_eq!(transmits(&take(&log)), vec![vec![0xAB]]);
}

#[test]
fn nine_bit_command_keeps_byte_order() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.write(0x01);
    bus.write_9bit_command(0xFFFF_F12A);
    bus.write(0x02);
    bus.end_write();

    let events: Vec<_> = take(&log)
        .into_iter()
        .filter(|e| matches!(e, Event::Tx(_) | Event::Bits(..)))
        .collect();
    assert_eq!(
        events,
        vec![
            Event::Tx(vec![0x01]),
            Event::Bits(0x12A, 9),
            Event::Tx(vec![0x02]),
        ]
    );
}

#[test]
fn begin_write_reapplies_device_settings() {
    let log = new_log();
    let mut bus = recording_bus(&log);

    bus.begin_write();
    bus.end_write();

    let events = take(&log);
    assert!(matches!(events.first(), Some(Event::Configure(s)) if s.frequency() == 40_000_000));
}

#[test]
fn register_control_line_toggles_set_and_clear() {
    let log = new_log();
    let config = BusConfig::new(2, -1, 18, 23, -1);
    let ports = ControlLinePorts::from_config(&config).unwrap().unwrap();
    let dc = RegisterControlLine::new(ports, Registers(log.clone()));
    let host = common::host_with::<NoLock>(&log);
    let mut bus: Esp32Spi<_, _, _> = Esp32Spi::new(config, host, dc, None);
    bus.begin(0);
    take(&log);

    bus.begin_write();
    bus.write_command(0x2C);
    bus.write16(0xFFFF);
    bus.end_write();

    let events: Vec<_> = take(&log)
        .into_iter()
        .filter(|e| !matches!(e, Event::Configure(_)))
        .collect();
    assert_eq!(
        events,
        vec![
            Event::Reg(0x3FF4_4008, 1 << 2),
            Event::Reg(0x3FF4_400C, 1 << 2),
            Event::Tx(vec![0x2C]),
            Event::Reg(0x3FF4_4008, 1 << 2),
            Event::Tx(vec![0xFF, 0xFF]),
        ]
    );
}

#[test]
fn invalid_dc_pins_are_rejected() {
    let config = BusConfig::new(36, -1, 18, 23, -1);
    assert_eq!(
        ControlLinePorts::from_config(&config),
        Err(ConfigError::InputOnlyPin(36))
    );
    let config = BusConfig::new(-1, -1, 18, 23, -1);
    assert_eq!(ControlLinePorts::from_config(&config), Ok(None));
}

#[test]
fn two_devices_share_one_registered_host() {
    let log = new_log();
    let mut registry: SpiHostRegistry<Recorder, NoLock> = SpiHostRegistry::new();
    registry.register(BusId::Hspi, Recorder(log.clone())).unwrap();
    assert!(matches!(
        registry.register(BusId::Hspi, Recorder(log.clone())),
        Err(ConfigError::SlotOccupied(2))
    ));

    let slow = BusConfig::new(-1, -1, 14, 13, -1).with_speed(1_000_000);
    let fast = BusConfig::new(-1, -1, 14, 13, -1);
    let mut a: Esp32Spi<_, _, _> =
        Esp32Spi::new(slow, registry.host_by_number(2).unwrap(), DcRecorder(log.clone()), None);
    let mut b: Esp32Spi<_, _, _> =
        Esp32Spi::new(fast, registry.host(BusId::Hspi).unwrap(), DcRecorder(log.clone()), None);
    assert!(Arc::ptr_eq(a.host(), b.host()));
    a.begin(0);
    b.begin(0);
    take(&log);

    a.send_data(1);
    b.send_data(2);

    let configured: Vec<u32> = take(&log)
        .into_iter()
        .filter_map(|e| match e {
            Event::Configure(s) => Some(s.frequency()),
            _ => None,
        })
        .collect();
    assert_eq!(configured, vec![1_000_000, 40_000_000]);
}

proptest! {
    #[test]
    fn short_transactions_arrive_whole(
        writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..16), 0..8)
    ) {
        let total: usize = writes.iter().map(Vec::len).sum();
        prop_assume!(total <= DATA_BUF_LEN);

        let log = new_log();
        let mut bus = recording_bus(&log);
        bus.begin_write();
        for w in &writes {
            bus.write_bytes(w);
        }
        bus.end_write();

        let expected: Vec<u8> = writes.concat();
        let chunks = transmits(&take(&log));
        if expected.is_empty() {
            prop_assert!(chunks.is_empty());
        } else {
            prop_assert_eq!(chunks, vec![expected]);
        }
    }

    #[test]
    fn long_transactions_keep_every_byte_in_order(
        writes in prop::collection::vec(prop::collection::vec(any::<u8>(), 0..150), 1..10)
    ) {
        let log = new_log();
        let mut bus = recording_bus(&log);
        bus.begin_write();
        for w in &writes {
            bus.write_pixels(w);
        }
        bus.end_write();

        let chunks = transmits(&take(&log));
        prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= DATA_BUF_LEN));
        prop_assert_eq!(chunks.concat(), writes.concat());
    }
}
