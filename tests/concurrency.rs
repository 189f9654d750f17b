mod common;

use std::sync::Arc;
use std::thread;

use common::{new_log, take, transmits, DcRecorder, Recorder};
use esp32spi_databus::esp32spi::{BlockingLock, BusConfig, BusId, DataBus, Esp32Spi, SpiHost};

const TRANSACTIONS: usize = 50;
const BYTES_PER_TRANSACTION: usize = 100;

#[test]
fn blocking_lock_keeps_transactions_whole() {
    let log = new_log();
    let host: Arc<SpiHost<Recorder, BlockingLock>> =
        Arc::new(SpiHost::new(BusId::Vspi, Recorder(log.clone())));

    let workers: Vec<_> = [0xA5u8, 0x5A]
        .into_iter()
        .map(|id| {
            let host = Arc::clone(&host);
            let log = log.clone();
            thread::spawn(move || {
                let mut bus: Esp32Spi<_, _, _> = Esp32Spi::new(
                    BusConfig::new(-1, -1, 18, 23, -1),
                    host,
                    DcRecorder(log),
                    None,
                );
                bus.begin(0);
                for _ in 0..TRANSACTIONS {
                    bus.begin_write();
                    for _ in 0..BYTES_PER_TRANSACTION {
                        bus.write(id);
                        thread::yield_now();
                    }
                    bus.end_write();
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().unwrap();
    }

    assert!(!host.lock().is_held());

    // Each transaction is one full block followed by the remainder, both
    // carrying the same writer's bytes.
    let chunks = transmits(&take(&log));
    assert_eq!(chunks.len(), 2 * 2 * TRANSACTIONS);
    for pair in chunks.chunks(2) {
        assert_eq!(pair[0].len(), 64);
        assert_eq!(pair[1].len(), BYTES_PER_TRANSACTION - 64);
        let id = pair[0][0];
        assert!(pair.iter().flatten().all(|&b| b == id));
    }
}
