//! Recording doubles shared by the integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use esp32spi_databus::esp32spi::{
    BusConfig, BusId, BusLock, BusSettings, ControlLine, Esp32Spi, NoLock, Phase, RegisterWrite,
    SpiHost, SpiPeripheral,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Configure(BusSettings),
    Dc(Phase),
    Tx(Vec<u8>),
    Bits(u32, u8),
    Reg(usize, u32),
}

pub type Log = Arc<Mutex<Vec<Event>>>;

pub fn new_log() -> Log {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn take(log: &Log) -> Vec<Event> {
    std::mem::take(&mut *log.lock().unwrap())
}

/// Only the transmitted chunks, in order
pub fn transmits(events: &[Event]) -> Vec<Vec<u8>> {
    events
        .iter()
        .filter_map(|e| match e {
            Event::Tx(bytes) => Some(bytes.clone()),
            _ => None,
        })
        .collect()
}

pub struct Recorder(pub Log);

impl SpiPeripheral for Recorder {
    fn configure(&mut self, settings: &BusSettings) {
        self.0.lock().unwrap().push(Event::Configure(*settings));
    }

    fn transmit(&mut self, bytes: &[u8]) {
        self.0.lock().unwrap().push(Event::Tx(bytes.to_vec()));
    }

    fn transmit_bits(&mut self, word: u32, bits: u8) {
        self.0.lock().unwrap().push(Event::Bits(word, bits));
    }
}

pub struct DcRecorder(pub Log);

impl ControlLine for DcRecorder {
    fn assert_command(&mut self) {
        self.0.lock().unwrap().push(Event::Dc(Phase::Command));
    }

    fn assert_data(&mut self) {
        self.0.lock().unwrap().push(Event::Dc(Phase::Data));
    }
}

pub struct Registers(pub Log);

impl RegisterWrite for Registers {
    fn write(&mut self, addr: usize, value: u32) {
        self.0.lock().unwrap().push(Event::Reg(addr, value));
    }
}

pub fn host_with<L: BusLock + Default>(log: &Log) -> Arc<SpiHost<Recorder, L>> {
    Arc::new(SpiHost::new(BusId::Vspi, Recorder(log.clone())))
}

/// Bus with a recording peripheral and DC recorder on one shared log, after `begin`
pub fn recording_bus(log: &Log) -> Esp32Spi<Recorder, NoLock, DcRecorder> {
    let mut bus = Esp32Spi::new(
        BusConfig::new(2, -1, 18, 23, -1),
        host_with(log),
        DcRecorder(log.clone()),
        None,
    );
    esp32spi_databus::DataBus::begin(&mut bus, 0);
    take(log);
    bus
}
