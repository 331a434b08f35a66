use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use super::record_id::string_or_empty;

/// 实验室中注册的设备（agent 上报，只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    #[serde(default, deserialize_with = "string_or_empty")]
    pub device_id: String,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default, deserialize_with = "string_or_empty")]
    pub status: String,
    #[serde(default)]
    pub last_seen: Option<String>,
}

impl Device {
    pub fn display_hostname(&self) -> &str {
        non_empty(self.hostname.as_deref()).unwrap_or("Unnamed Device")
    }

    pub fn display_ip(&self) -> &str {
        non_empty(self.ip.as_deref()).unwrap_or("N/A")
    }

    /// 最后在线时间，能解析时转换为本地时间
    pub fn display_last_seen(&self) -> String {
        match non_empty(self.last_seen.as_deref()) {
            None => "Never".to_string(),
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|_| raw.to_string()),
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_fallbacks() {
        let device: Device = serde_json::from_value(json!({
            "deviceId": "agent-42",
            "hostname": "",
            "status": "Offline"
        }))
        .unwrap();

        assert_eq!(device.display_hostname(), "Unnamed Device");
        assert_eq!(device.display_ip(), "N/A");
        assert_eq!(device.display_last_seen(), "Never");
    }

    #[test]
    fn test_unparsable_last_seen_is_shown_raw() {
        let device: Device = serde_json::from_value(json!({
            "deviceId": "agent-1",
            "hostname": "pc-01",
            "ip": "10.0.0.11",
            "status": "Active",
            "lastSeen": "yesterday"
        }))
        .unwrap();

        assert_eq!(device.display_hostname(), "pc-01");
        assert_eq!(device.display_ip(), "10.0.0.11");
        assert_eq!(device.display_last_seen(), "yesterday");
    }

    #[test]
    fn test_null_fields_do_not_break_device_list() {
        let devices: Vec<Device> = serde_json::from_value(json!([
            { "deviceId": "agent-1", "status": "Active" },
            { "deviceId": null, "hostname": null, "ip": null, "status": null, "lastSeen": null }
        ]))
        .unwrap();

        assert_eq!(devices.len(), 2);
        assert_eq!(devices[1].device_id, "");
        assert_eq!(devices[1].status, "");
        assert_eq!(devices[1].display_hostname(), "Unnamed Device");
        assert_eq!(devices[1].display_last_seen(), "Never");
    }
}
