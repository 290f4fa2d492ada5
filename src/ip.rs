// src/ip.rs

use crate::error::{OplError, Result};
use std::net::Ipv4Addr;
use std::thread;
use std::time::Duration;

/// Plain-text services that answer with the caller's IPv4 address.
const LOOKUP_SOURCES: &[&str] = &[
    "https://api.ipify.org",
    "https://ipv4.icanhazip.com",
    "https://checkip.amazonaws.com",
    "https://ifconfig.me/ip",
];

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Asks every source at once and returns the address most of them agree on.
pub fn public_ipv4() -> Result<Ipv4Addr> {
    let client = reqwest::blocking::Client::builder()
        .timeout(LOOKUP_TIMEOUT)
        .build()?;

    consensus(LOOKUP_SOURCES, |url| query(&client, url)).ok_or(OplError::NoPublicIp)
}

fn query(client: &reqwest::blocking::Client, url: &str) -> Option<Ipv4Addr> {
    let answer = client
        .get(url)
        .send()
        .and_then(|resp| resp.error_for_status())
        .and_then(|resp| resp.text());
    match answer {
        Ok(body) => match body.trim().parse::<Ipv4Addr>() {
            Ok(ip) => Some(ip),
            Err(_) => {
                tracing::debug!(source = url, body = body.trim(), "unparseable IP answer");
                None
            }
        },
        Err(e) => {
            tracing::debug!(source = url, error = %e, "IP lookup failed");
            None
        }
    }
}

/// Runs `fetch` for every source on its own thread, then votes in source order.
fn consensus<F>(sources: &[&str], fetch: F) -> Option<Ipv4Addr>
where
    F: Fn(&str) -> Option<Ipv4Addr> + Sync,
{
    let votes: Vec<Ipv4Addr> = thread::scope(|scope| {
        let fetch = &fetch;
        let pending: Vec<_> = sources
            .iter()
            .map(|&url| scope.spawn(move || fetch(url)))
            .collect();
        pending
            .into_iter()
            .filter_map(|handle| handle.join().ok().flatten())
            .collect()
    });
    elect(votes)
}

/// Majority vote; ties go to the address seen first.
fn elect(votes: impl IntoIterator<Item = Ipv4Addr>) -> Option<Ipv4Addr> {
    let mut tally: Vec<(Ipv4Addr, usize)> = Vec::new();
    for ip in votes {
        match tally.iter_mut().find(|(seen, _)| *seen == ip) {
            Some((_, count)) => *count += 1,
            None => tally.push((ip, 1)),
        }
    }
    tally
        .iter()
        .fold(None, |best: Option<(Ipv4Addr, usize)>, &(ip, count)| match best {
            Some((_, top)) if top >= count => best,
            _ => Some((ip, count)),
        })
        .map(|(ip, _)| ip)
}

/// Splits `--ip a,b` into trimmed, non-empty addresses.
pub fn parse_ip_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
