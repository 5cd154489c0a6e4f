//! Parsers for port lookup tool output.
//!
//! Kept platform-independent so every parser is tested on every host.

use regex::Regex;

use crate::error::{Error, Result};

pub struct Utils;

impl Utils {
    /// Parse an address:port string.
    ///
    /// Handles multiple address formats:
    /// - IPv4: "127.0.0.1:3000" or "*:8080"
    /// - IPv6: "\[::1]:3000" or "\[fe80::1]:8080"
    /// - Scoped: "127.0.0.53%lo:53"
    pub fn parse_address(address: &str) -> Option<(String, u16)> {
        if address.starts_with('[') {
            // IPv6 format: [::1]:3000
            let bracket_end = address.find(']')?;
            if bracket_end + 1 >= address.len() || address.as_bytes()[bracket_end + 1] != b':' {
                return None;
            }
            let addr = &address[..=bracket_end];
            let port_str = &address[bracket_end + 2..];
            let port: u16 = port_str.parse().ok()?;
            Some((addr.to_string(), port))
        } else {
            // IPv4 format: 127.0.0.1:3000 or *:8080
            let last_colon = address.rfind(':')?;
            let addr = &address[..last_colon];
            let port_str = &address[last_colon + 1..];
            let port: u16 = port_str.parse().ok()?;
            let addr = if addr.is_empty() { "*" } else { addr };
            Some((addr.to_string(), port))
        }
    }

    /// Parse terse `lsof -t` output: one PID per line.
    pub fn parse_pid_lines(output: &str) -> Vec<u32> {
        output
            .lines()
            .filter_map(|line| line.trim().parse().ok())
            .collect()
    }

    /// Parse `ss -Htlnp` output, keeping PIDs bound to `port`.
    ///
    /// Expected format:
    /// ```text
    /// LISTEN 0 511 0.0.0.0:3002 0.0.0.0:* users:(("node",pid=4242,fd=21))
    /// ```
    /// A socket shared by several processes lists every one of them in the
    /// `users:` column.
    pub fn parse_ss_output(output: &str, port: u16) -> Result<Vec<u32>> {
        let pid_regex = Regex::new(r"pid=(\d+)")
            .map_err(|e| Error::ParseError(format!("Invalid ss pattern: {}", e)))?;

        let mut pids = Vec::new();
        for line in output.lines() {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 6 {
                continue;
            }

            match Utils::parse_address(columns[3]) {
                Some((_, p)) if p == port => {}
                _ => continue,
            }

            let users = columns[5..].join(" ");
            for caps in pid_regex.captures_iter(&users) {
                if let Ok(pid) = caps[1].parse::<u32>() {
                    pids.push(pid);
                }
            }
        }

        Ok(pids)
    }

    /// Parse `netstat -ano` output, keeping PIDs in LISTENING state on `port`.
    ///
    /// Example output:
    /// ```text
    ///   Proto  Local Address          Foreign Address        State           PID
    ///   TCP    0.0.0.0:135            0.0.0.0:0              LISTENING       1020
    ///   TCP    [::]:445               [::]:0                 LISTENING       4
    /// ```
    pub fn parse_netstat_output(output: &str, port: u16) -> Vec<u32> {
        let mut pids = Vec::new();

        for line in output.lines() {
            let line = line.trim();

            // Parse TCP lines only (skip UDP and headers)
            if !line.starts_with("TCP") {
                continue;
            }

            // Expected format: TCP, Local Address, Foreign Address, State, PID
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 5 || parts[3] != "LISTENING" {
                continue;
            }

            match Utils::parse_address(parts[1]) {
                Some((_, p)) if p == port => {}
                _ => continue,
            }

            if let Ok(pid) = parts[4].parse::<u32>() {
                pids.push(pid);
            }
        }

        pids
    }
}
