#![no_main]

use libfuzzer_sys::fuzz_target;
use replay::model::PlayTime;
use replay::store::decode_track_name;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(decoded) = decode_track_name(text) {
        let _ = decoded.len();
    }
    if let Ok(at) = PlayTime::parse(text) {
        let _ = at.date();
    }
});
