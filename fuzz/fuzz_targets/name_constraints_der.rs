#![no_main]
use libfuzzer_sys::fuzz_target;
use x509_name_constraints::{GeneralNameKind, NameConstraints};

fuzz_target!(|data: &[u8]| {
    if let Ok(nc) = NameConstraints::from_der(data) {
        let _ = nc.to_der();
        let _ = nc.check(GeneralNameKind::DNSName, b"www.example.com");
        let _ = nc.clone().merge(nc);
    }
});
