use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub stun_server: String,
    pub fallback_servers: Vec<String>,
    pub log_file: String,
    pub timeout_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            stun_server: "stun.l.google.com:19302".to_string(),
            fallback_servers: Vec::new(),
            log_file: "natprobe.log".to_string(),
            timeout_secs: 5,
        }
    }
}

impl AppConfig {
    pub fn load(path: &str) -> io::Result<Self> {
        let mut cfg = AppConfig::default();
        if !Path::new(path).exists() {
            return Ok(cfg);
        }

        let content = fs::read_to_string(path)?;
        let entries = parse_kv(&content);

        if let Some(server) = entries.get("stun_server") {
            cfg.stun_server = server.clone();
        }
        if let Some(servers) = entries.get("fallback_servers") {
            cfg.fallback_servers = servers
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(log) = entries.get("log_file") {
            cfg.log_file = log.clone();
        }
        if let Some(secs) = entries.get("timeout_secs").and_then(|v| v.parse().ok()) {
            cfg.timeout_secs = secs;
        }

        Ok(cfg)
    }
}

fn parse_kv(content: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some((k, v)) = line.split_once('=') {
            map.insert(k.trim().to_string(), v.trim().to_string());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_kv_ignores_comments_and_blanks() {
        let content = "# comment\n\nstun_server = stun.example.org:3478\ntimeout_secs = 2\n";
        let entries = parse_kv(content);

        assert_eq!(entries.len(), 2);
        assert_eq!(
            entries.get("stun_server").map(String::as_str),
            Some("stun.example.org:3478")
        );
    }

    #[test]
    fn test_fallback_servers_split() {
        let entries = parse_kv("fallback_servers = a:3478, b:3478,\n");
        let servers: Vec<String> = entries
            .get("fallback_servers")
            .unwrap()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        assert_eq!(servers, vec!["a:3478".to_string(), "b:3478".to_string()]);
    }
}
