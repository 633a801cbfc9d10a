use std::net::IpAddr;
use x509_name_constraints::error::NameConstraintsError;
use x509_name_constraints::{CheckResult, GeneralNameKind, NameConstraints};

fn check_ip(nc: &NameConstraints, ip: &str) -> CheckResult {
    let ip: IpAddr = ip.parse().expect("invalid test address");
    nc.check_ip_addr(&ip)
}

fn assert_accepted(nc: &NameConstraints, ips: &[&str]) {
    for ip in ips {
        assert_eq!(check_ip(nc, ip), CheckResult::Acceptable, "{} should be accepted", ip);
    }
}

fn assert_rejected(nc: &NameConstraints, ips: &[&str]) {
    for ip in ips {
        assert_eq!(check_ip(nc, ip), CheckResult::Rejected, "{} should be rejected", ip);
    }
}

fn permitted(ranges: &[&str]) -> NameConstraints {
    let mut nc = NameConstraints::new();
    for range in ranges {
        nc.add_permitted_cidr(range).expect("add_permitted_cidr");
    }
    nc
}

fn merged(a: &[&str], b: &[&str]) -> NameConstraints {
    permitted(a).merge(permitted(b)).expect("merge failed")
}

#[test]
fn generation_reading_checking() {
    let mut nc = permitted(&["203.0.113.0/24", "2001:DB8::/32"]);
    nc.add_excluded_cidr("203.0.113.0/26").expect("add_excluded_cidr");
    nc.add_excluded_cidr("2001:DB8::/34").expect("add_excluded_cidr");

    // invalid network mask
    let mut ip = "2001:DB8::/34"
        .parse::<x509_name_constraints::Cidr>()
        .expect("cidr")
        .as_bytes()
        .to_vec();
    ip[30] = 2;
    assert_eq!(
        nc.add_excluded(GeneralNameKind::IPAddress, &ip),
        Err(NameConstraintsError::MalformedCidr)
    );
    // invalid size
    assert_eq!(
        nc.add_permitted(GeneralNameKind::IPAddress, &ip[..31]),
        Err(NameConstraintsError::IllegalParameter)
    );

    // write and read back the extension
    let der = nc.to_der().expect("to_der");
    let nc = NameConstraints::from_der(&der).expect("from_der");
    let num_permitted = (0..)
        .take_while(|&i| nc.permitted_at(i).is_ok())
        .count();
    let num_excluded = (0..).take_while(|&i| nc.excluded_at(i).is_ok()).count();
    assert_eq!(num_permitted, 2);
    assert_eq!(num_excluded, 2);

    assert_accepted(&nc, &["203.0.113.250", "2001:DB8:4000::"]);
    assert_rejected(
        &nc,
        &["203.0.114.0", "203.0.113.10", "2001:DB9::", "2001:DB8:10::"],
    );
}

#[test]
fn universal_constraint() {
    let mut nc = NameConstraints::new();
    nc.add_excluded_cidr("2001:DB8::/0").expect("add_excluded_cidr");
    assert_eq!(nc.excluded()[0].to_string(), "IPAddress(::/0)");
    assert_rejected(&nc, &["2001:DB8:10::", "::"]);
    // other family is not constrained
    assert_accepted(&nc, &["192.0.2.1"]);
}

#[test]
fn simple_intersection() {
    let nc = merged(&["203.0.113.0/24"], &["203.0.113.0/26"]);
    assert_accepted(&nc, &["203.0.113.2"]);
    assert_rejected(&nc, &["203.0.113.250", "203.0.114.0"]);
}

#[test]
fn empty_intersection() {
    let nc = merged(&["127.0.113.0/24"], &["255.0.113.0/24"]);
    assert!(nc.permitted().is_empty());
    assert_eq!(nc.excluded()[0].to_string(), "IPAddress(0.0.0.0/0)");
    assert_rejected(
        &nc,
        &["127.0.113.2", "255.0.0.2", "255.0.113.2", "0.0.0.0", "10.1.2.3"],
    );
}

#[test]
fn mediocre_intersection() {
    let nc = merged(&["127.0.113.0/24"], &["127.0.113.0/26", "255.0.113.0/24"]);
    assert_accepted(&nc, &["127.0.113.2"]);
    assert_rejected(&nc, &["127.0.113.250", "255.0.0.2", "255.0.113.2"]);
}

#[test]
fn difficult_intersection() {
    let nc = merged(
        &["0.0.0.0/3", "88.0.0.0/5"],
        &["0.0.0.0/5", "16.0.0.0/5", "64.0.0.0/3"],
    );
    assert_accepted(&nc, &["0.0.113.2", "16.0.0.0", "89.125.7.187"]);
    assert_rejected(
        &nc,
        &[
            "15.255.255.255",
            "31.12.25.2",
            "63.255.255.255",
            "64.0.0.0",
            "96.0.0.0",
        ],
    );
}

#[test]
fn ipv6_intersection() {
    let nc = merged(&["affb::/16", "affd:0000::/20"], &["affb:aa00::/24"]);
    assert_accepted(&nc, &["affb:aa00::"]);
    assert_rejected(
        &nc,
        &[
            "affa:ffff:ffff:ffff:ffff:ffff:ffff:ffff",
            "affb:a500::",
            "affb:ab01::",
            "affc::",
            "affd:0fff::",
            "affd:1000::",
        ],
    );
}

#[test]
fn empty_ipv4_intersection_ipv6_unrestricted() {
    let nc = merged(&["bfa6::/16"], &["255.0.113.0/24"]);
    assert_accepted(&nc, &["bfa6:ab01::"]);
    assert_rejected(&nc, &["255.0.113.2", "127.0.113.2", "1.2.3.4", "bfa7::"]);
}

#[test]
fn empty_ipv4_intersection_ipv6_remains() {
    let nc = merged(&["127.0.113.0/24", "bfa6::/16"], &["255.0.113.0/24"]);
    assert_rejected(&nc, &["127.0.113.2", "255.0.0.2", "255.0.113.2", "bfa7::"]);
    // IPv6 is only restricted by the first set
    assert_accepted(&nc, &["bfa6:ab01::"]);
}

#[test]
fn empty_ipv4v6_intersections() {
    let nc = merged(
        &["127.0.113.0/24", "bfa6::/16"],
        &["255.0.113.0/24", "cfa6::/16"],
    );
    assert!(nc.permitted().is_empty());
    assert_eq!(nc.excluded().len(), 2);
    assert_rejected(
        &nc,
        &[
            "127.0.113.2",
            "255.0.0.2",
            "255.0.113.2",
            "bfa6:ab01::",
            "bfa7::",
            "cfa7:00cc::",
        ],
    );
}

#[test]
fn ipv4v6_single_constraint_each() {
    // the family permitted by the first set is kept, the one only the second set permits is
    // fully excluded
    let nc = merged(&["127.0.113.0/24"], &["bfa6::/16"]);
    assert_rejected(&nc, &["255.0.0.2", "bfa6:ab01::", "bfa7::"]);
    assert_accepted(&nc, &["127.0.113.2"]);

    let nc = merged(&["bfa6::/16"], &["127.0.113.0/24"]);
    assert_rejected(&nc, &["127.0.113.2", "255.0.0.2", "bfa7::"]);
    assert_accepted(&nc, &["bfa6:ab01::"]);
}

#[test]
fn cross_family_without_constraint() {
    let nc = permitted(&["10.0.0.0/8"]);
    assert_accepted(&nc, &["::1", "2001:db8::"]);
    let nc = permitted(&["2001:db8::/32"]);
    assert_accepted(&nc, &["10.0.0.1"]);
}

struct Ranges {
    permitted: &'static [&'static str],
    excluded: &'static [&'static str],
}

struct MergeCase {
    sets: [Ranges; 3],
    accepted: &'static [&'static str],
    rejected: &'static [&'static str],
}

const MERGE_CASES: &[MergeCase] = &[
    // IPv4, nested ranges
    MergeCase {
        sets: [
            Ranges {
                permitted: &["10.0.0.0/8", "192.168.0.0/16"],
                excluded: &["10.1.2.128/25"],
            },
            Ranges {
                permitted: &["10.1.0.0/16", "172.16.0.0/12"],
                excluded: &[],
            },
            Ranges {
                permitted: &["10.1.2.0/24", "10.2.0.0/16"],
                excluded: &["10.1.2.64/32", "10.1.2.65/32"],
            },
        ],
        accepted: &["10.1.2.3", "10.1.2.127", "10.1.2.66", "2001:db8::1"],
        rejected: &[
            "10.1.2.64",
            "10.1.2.65",
            "10.1.2.128",
            "10.1.2.200",
            "10.1.3.1",
            "10.2.0.1",
            "192.168.1.1",
            "172.16.0.1",
        ],
    },
    // IPv4, empty intersection of the first two sets
    MergeCase {
        sets: [
            Ranges {
                permitted: &["10.0.0.0/8"],
                excluded: &[],
            },
            Ranges {
                permitted: &["11.0.0.0/8"],
                excluded: &[],
            },
            Ranges {
                permitted: &["10.1.0.0/16"],
                excluded: &[],
            },
        ],
        accepted: &[],
        rejected: &["10.1.0.1", "11.0.0.1", "192.0.2.1"],
    },
    // IPv6, with single addresses
    MergeCase {
        sets: [
            Ranges {
                permitted: &["2001:db8::/32"],
                excluded: &["2001:db8:1:2::5/128", "2001:db8:1:2:8000::/65"],
            },
            Ranges {
                permitted: &["2001:db8:1::/48", "fd00::/8"],
                excluded: &["2001:db8:1:2::7/128"],
            },
            Ranges {
                permitted: &["2001:db8:1:2::/64"],
                excluded: &[],
            },
        ],
        accepted: &[
            "2001:db8:1:2::4",
            "2001:db8:1:2::6",
            "2001:db8:1:2:7fff:ffff:ffff:ffff",
            "192.0.2.1",
        ],
        rejected: &[
            "2001:db8:1:2::5",
            "2001:db8:1:2::7",
            "2001:db8:1:2:8000::",
            "2001:db8:1:3::",
            "2001:db8:2::",
            "fd00::1",
        ],
    },
];

fn build(ranges: &Ranges) -> NameConstraints {
    let mut nc = permitted(ranges.permitted);
    for range in ranges.excluded {
        nc.add_excluded_cidr(range).expect("add_excluded_cidr");
    }
    nc
}

fn reversed(nc: &NameConstraints) -> NameConstraints {
    let mut rev = NameConstraints::new();
    for value in nc.permitted().iter().rev() {
        let (kind, bytes) = value.as_pair();
        rev.add_permitted(kind, bytes).expect("add_permitted");
    }
    for value in nc.excluded().iter().rev() {
        let (kind, bytes) = value.as_pair();
        rev.add_excluded(kind, bytes).expect("add_excluded");
    }
    rev
}

fn case_names(case: &MergeCase) -> impl Iterator<Item = &&'static str> {
    case.accepted.iter().chain(case.rejected.iter())
}

#[test]
fn merge_cases_expected() {
    for case in MERGE_CASES {
        let [a, b, c] = &case.sets;
        let nc = build(a).merge(build(b)).expect("merge");
        let nc = nc.merge(build(c)).expect("merge");
        assert_accepted(&nc, case.accepted);
        assert_rejected(&nc, case.rejected);
    }
}

#[test]
fn merge_is_associative() {
    for case in MERGE_CASES {
        let [a, b, c] = &case.sets;
        let left = build(a)
            .merge(build(b))
            .and_then(|ab| ab.merge(build(c)))
            .expect("merge");
        let right = build(b)
            .merge(build(c))
            .and_then(|bc| build(a).merge(bc))
            .expect("merge");
        for ip in case_names(case) {
            assert_eq!(check_ip(&left, ip), check_ip(&right, ip), "{}", ip);
        }
    }
}

#[test]
fn merge_narrows_permits() {
    for case in MERGE_CASES {
        let [a, b, c] = &case.sets;
        let ab = build(a).merge(build(b)).expect("merge");
        let abc = ab.clone().merge(build(c)).expect("merge");
        for ip in case_names(case) {
            if check_ip(&ab, ip).is_acceptable() {
                assert_accepted(&build(a), &[*ip]);
                assert_accepted(&build(b), &[*ip]);
            }
            if check_ip(&abc, ip).is_acceptable() {
                assert_accepted(&ab, &[*ip]);
                assert_accepted(&build(c), &[*ip]);
            }
        }
    }
}

#[test]
fn merge_keeps_every_exclusion() {
    for case in MERGE_CASES {
        let [a, b, c] = &case.sets;
        let nc = build(a)
            .merge(build(b))
            .and_then(|ab| ab.merge(build(c)))
            .expect("merge");
        for set in &case.sets {
            for value in build(set).excluded() {
                assert!(nc.excluded().contains(value), "{} missing", value);
            }
        }
    }
}

#[test]
fn check_ignores_entry_order() {
    for case in MERGE_CASES {
        let [a, b, c] = &case.sets;
        let nc = build(a)
            .merge(build(b))
            .and_then(|ab| ab.merge(build(c)))
            .expect("merge");
        let sets = [build(a), build(b), build(c), nc];
        for set in &sets {
            let rev = reversed(set);
            for ip in case_names(case) {
                assert_eq!(check_ip(set, ip), check_ip(&rev, ip), "{}", ip);
            }
        }
    }
}

#[test]
fn ipv6_single_address() {
    let nc = permitted(&["2001:db8::1/128"]);
    assert_accepted(&nc, &["2001:db8::1", "192.0.2.1"]);
    assert_rejected(&nc, &["2001:db8::", "2001:db8::2", "2001:db9::1"]);

    let mut nc = permitted(&["2001:db8::/32"]);
    nc.add_excluded_cidr("2001:db8::1/128").expect("add_excluded_cidr");
    assert_rejected(&nc, &["2001:db8::1"]);
    assert_accepted(&nc, &["2001:db8::", "2001:db8::2"]);
}
