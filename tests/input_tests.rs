use ssh_check_rs::hosts::{expand_cidr, normalize_hosts};
use ssh_check_rs::inputs::{from_value_or_file, parse_items_str};
use ssh_check_rs::ports::normalize_ports;
use std::net::{IpAddr, Ipv4Addr};

#[test]
fn port_list_with_ranges_and_duplicates() {
    let raw: Vec<String> = ["22", "2222-2224", "2223", "65536", "x"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    // Dedup, preserve order of first appearance
    assert_eq!(normalize_ports(&raw), vec!["22", "2222", "2223", "2224"]);
}

#[test]
fn cidr_expansion_excludes_network_and_broadcast() {
    let ips = expand_cidr("10.0.0.0/30".parse().unwrap());
    assert_eq!(
        ips,
        vec![
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 1)),
            IpAddr::V4(Ipv4Addr::new(10, 0, 0, 2))
        ]
    );
}

#[tokio::test]
async fn hosts_are_lowercased_and_deduplicated() {
    let raw: Vec<String> = ["192.168.0.10", "192.168.0.10", "192.168.0.8/31", "FE80::1"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(
        normalize_hosts(&raw).await,
        vec!["192.168.0.10", "192.168.0.8", "192.168.0.9", "fe80::1"]
    );
}

#[test]
fn list_file_round_trip() {
    let path = std::env::temp_dir().join(format!("ssh-check-rs-users-{}.txt", std::process::id()));
    std::fs::write(&path, "# default accounts\nroot\nadmin\n\nubnt\nroot\n").unwrap();
    let users = from_value_or_file(None, Some(&path)).unwrap();
    assert_eq!(users, vec!["root", "admin", "ubnt"]);
    assert_eq!(users, parse_items_str(&std::fs::read_to_string(&path).unwrap()));
    let _ = std::fs::remove_file(&path);
}
