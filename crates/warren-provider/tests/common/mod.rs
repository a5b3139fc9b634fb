use serde_json::{Value, json};
use std::sync::Arc;
use warren_provider::{ProviderConfig, WarrenClient};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const LOCATION: &str = "cyc01";

/// In-process stand-in for the platform API
pub struct TestPlatform {
    pub server: MockServer,
}

impl TestPlatform {
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn api_url(&self) -> String {
        format!("{}/v1", self.server.uri())
    }

    pub fn client(&self) -> Arc<WarrenClient> {
        let client = WarrenClient::builder()
            .api_url(self.api_url())
            .api_token(TOKEN)
            .location_slug(LOCATION)
            .build()
            .unwrap();
        Arc::new(client)
    }

    #[allow(dead_code)]
    pub fn provider_config(&self) -> ProviderConfig {
        ProviderConfig::new(TOKEN)
            .with_api_url(self.api_url())
            .with_location(LOCATION)
    }

    /// Location-scoped request path
    pub fn path(&self, resource: &str) -> String {
        format!("/v1/{}{}", LOCATION, resource)
    }

    /// Answer `GET resource` with a JSON body
    #[allow(dead_code)]
    pub async fn get_json(&self, resource: &str, body: Value) {
        Mock::given(method("GET"))
            .and(path(self.path(resource)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Answer `GET resource` with a JSON body a limited number of times
    #[allow(dead_code)]
    pub async fn get_json_times(&self, resource: &str, body: Value, times: u64) {
        Mock::given(method("GET"))
            .and(path(self.path(resource)))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .up_to_n_times(times)
            .mount(&self.server)
            .await;
    }

    #[allow(dead_code)]
    pub async fn get_not_found(&self, resource: &str) {
        Mock::given(method("GET"))
            .and(path(self.path(resource)))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "Not found"})))
            .mount(&self.server)
            .await;
    }

    /// Answer `GET /user-resource/vm?uuid=` for one machine
    #[allow(dead_code)]
    pub async fn get_virtual_machine(&self, vm: Value, times: Option<u64>) {
        let uuid = vm["uuid"].as_str().unwrap_or_default().to_string();
        let mock = Mock::given(method("GET"))
            .and(path(self.path("/user-resource/vm")))
            .and(query_param("uuid", uuid.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_json(vm));
        let mock = match times {
            Some(times) => mock.up_to_n_times(times),
            None => mock,
        };
        mock.mount(&self.server).await;
    }

    /// Empty list answers for the lookups every observation performs
    #[allow(dead_code)]
    pub async fn empty_lookups(&self) {
        self.get_json("/user-resource/vm/list", json!([])).await;
        self.get_json("/network/networks", json!([])).await;
    }
}

#[allow(dead_code)]
pub fn disk_json(uuid: &str, size_gb: i64) -> Value {
    json!({
        "uuid": uuid,
        "status": "Active",
        "user_id": 100,
        "billing_account_id": 9,
        "size_gb": size_gb,
        "source_image_type": "EMPTY",
        "source_image": null,
        "created_at": "2026-01-05 10:00:00",
        "updated_at": "2026-01-05 10:00:00",
        "snapshots": [],
        "status_comment": null
    })
}

#[allow(dead_code)]
pub fn vm_json(uuid: &str, status: &str, private_ipv4: &str) -> Value {
    json!({
        "uuid": uuid,
        "backup": false,
        "billing_account": 9,
        "created_at": "2026-01-05 10:00:00",
        "description": "",
        "hostname": "web",
        "mac": "52:54:00:12:34:56",
        "memory": 2048,
        "name": "web",
        "os_name": "ubuntu",
        "os_version": "22.04",
        "private_ipv4": private_ipv4,
        "public_ipv6": "2001:db8::10",
        "status": status,
        "storage": [
            {
                "created_at": "2026-01-05 10:00:00",
                "name": "sda",
                "primary": true,
                "replica": [],
                "size": 20,
                "user_id": 100,
                "uuid": format!("{}-boot", uuid)
            }
        ],
        "updated_at": "2026-01-05 10:00:00",
        "user_id": 100,
        "username": "user",
        "vcpu": 1
    })
}

#[allow(dead_code)]
pub fn network_json(uuid: &str, subnet: &str, vm_uuids: &[&str]) -> Value {
    json!({
        "uuid": uuid,
        "vlan_id": 17,
        "subnet": subnet,
        "subnet_ipv6": "fd00:10::/64",
        "name": format!("net-{}", uuid),
        "created_at": "2026-01-05 10:00:00",
        "updated_at": "2026-01-05 10:00:00",
        "type": "private",
        "is_default": false,
        "vm_uuids": vm_uuids,
        "resources_count": vm_uuids.len()
    })
}

#[allow(dead_code)]
pub fn floating_ip_json(id: i64, address: &str, assigned_to: &str) -> Value {
    let resource_type = if assigned_to.is_empty() { "" } else { "virtual_machine" };
    json!({
        "id": id,
        "is_ipv6": false,
        "address": address,
        "user_id": 100,
        "billing_account_id": 9,
        "type": "public",
        "name": "web",
        "enabled": true,
        "created_at": "2026-01-05 10:00:00",
        "updated_at": "2026-01-05 10:00:00",
        "uuid": format!("ip-{}", id),
        "assigned_to": assigned_to,
        "assigned_to_resource_type": resource_type,
        "assigned_to_private_ip": ""
    })
}
