#![no_main]

use std::io::SeekFrom;

use byterange::http::header::{self, HeaderMap, HeaderValue};
use byterange::http::StatusCode;
use byterange::{handle_response, MemoryBody};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("multipart/byteranges; boundary=X-BOUNDARY"),
    );

    let body = MemoryBody::new(data.to_vec());
    let mut file = match handle_response("fuzz", StatusCode::PARTIAL_CONTENT, &headers, body) {
        Ok(file) => file,
        Err(_) => return,
    };

    let mut breaks = 0;
    while breaks < 3 {
        let pos = file.tell();
        let step = match file.read(1) {
            Ok(bytes) if bytes.is_empty() => break,
            Ok(_) => file.seek(SeekFrom::Current(3)).map(|_| ()),
            Err(err) => Err(err),
        };

        if let Err(err) = step {
            if err.is_fatal() {
                break;
            }
            breaks += 1;
        }
        assert!(file.tell() >= pos);
    }
});
