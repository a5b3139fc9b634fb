//! User-data preparation for new machines

const CLOUD_CONFIG_HEADER: &str = "#cloud-config\n";

/// Normalize line endings and wrap plain scripts into a cloud-config payload
///
/// Input starting with `#cloud-config` is passed through. Anything else is
/// treated as shell commands separated by blank lines and sent as a JSON
/// `runcmd` document.
pub fn prepare_cloud_init(raw: &str) -> serde_json::Result<String> {
    let normalized = raw.replace("\r\n", "\n").replace('\r', "\n");

    if normalized.starts_with(CLOUD_CONFIG_HEADER) {
        return Ok(normalized);
    }

    let commands: Vec<&str> = normalized.split("\n\n").collect();
    serde_json::to_string(&serde_json::json!({ "runcmd": commands }))
}
