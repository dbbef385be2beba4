#![no_main]

use std::sync::{Arc, OnceLock};

use codec::{ConnectionId, InboundDecoder, WireLimits};
use libfuzzer_sys::fuzz_target;
use schema::MessageRegistry;

fn registry() -> Arc<MessageRegistry> {
    static REGISTRY: OnceLock<Arc<MessageRegistry>> = OnceLock::new();
    Arc::clone(REGISTRY.get_or_init(|| {
        Arc::new(defs::load().expect("bundled definitions load").messages)
    }))
}

fuzz_target!(|data: &[u8]| {
    let Some((&split, data)) = data.split_first() else {
        return;
    };
    let mut decoder =
        InboundDecoder::new(ConnectionId::new(0), registry(), WireLimits::for_testing());
    let mut out = Vec::new();

    // Split the stream at an arbitrary point; the decoder must not care.
    let at = usize::from(split).min(data.len());
    for chunk in [&data[..at], &data[at..]] {
        let fed = decoder.feed(chunk).and_then(|()| decoder.drain(&mut out));
        if let Err(err) = fed {
            assert!(err.is_fatal());
            assert_eq!(decoder.next_dispatch(), Err(err));
            return;
        }
    }
});
