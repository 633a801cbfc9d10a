#![no_main]
use libfuzzer_sys::fuzz_target;
use x509_name_constraints::cidr::{cidr_to_text, parse_cidr};

fuzz_target!(|data: &[u8]| {
    if let Ok(text) = std::str::from_utf8(data) {
        if let Ok(cidr) = parse_cidr(text) {
            let rendered = cidr_to_text(cidr.as_bytes()).expect("valid CIDR must render");
            assert_eq!(parse_cidr(&rendered), Ok(cidr));
        }
    }
});
