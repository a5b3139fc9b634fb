mod common;

use common::{TestPlatform, network_json};
use serde_json::json;
use warren_cloud::CloudError;
use warren_provider::NetworkModel;
use warren_provider::data_sources::{
    LocationDataSource, LocationModel, NetworkDataSource, OsBaseImageDataSource, OsBaseImageModel,
};

fn locations() -> serde_json::Value {
    json!([
        {
            "slug": "tll",
            "display_name": "Tallinn",
            "is_default": true,
            "is_preferred": false,
            "description": "Estonia, Tallinn",
            "order_nr": 1,
            "country_code": "EE"
        },
        {
            "slug": "cyc01",
            "display_name": "Cyprus",
            "is_default": false,
            "is_preferred": true,
            "description": null,
            "order_nr": 2,
            "country_code": "CY"
        }
    ])
}

fn images() -> serde_json::Value {
    json!([
        {
            "os_name": "ubuntu",
            "display_name": "Ubuntu",
            "ui_position": 1,
            "is_default": true,
            "is_app_catalog": false,
            "icon": null,
            "versions": [
                {"os_version": "20.04", "display_name": "20.04 LTS", "published": true},
                {"os_version": "22.04", "display_name": "22.04 LTS", "published": true}
            ]
        },
        {
            "os_name": "debian",
            "display_name": "Debian",
            "ui_position": 2,
            "is_default": false,
            "is_app_catalog": false,
            "versions": [
                {"os_version": "12", "display_name": "12", "published": true}
            ]
        }
    ])
}

#[tokio::test]
async fn test_location_by_slug_and_flag() {
    let platform = TestPlatform::start().await;
    platform.get_json("/config/locations", locations()).await;

    let source = LocationDataSource::new(platform.client());

    let location = source
        .read(LocationModel {
            slug: Some("cyc01".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(location.display_name.as_deref(), Some("Cyprus"));
    assert_eq!(location.country_code.as_deref(), Some("CY"));
    assert_eq!(location.is_preferred, Some(true));

    let location = source
        .read(LocationModel {
            is_default: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(location.slug.as_deref(), Some("tll"));

    let err = source
        .read(LocationModel {
            display_name: Some("Tallinn".to_string()),
            is_default: Some(false),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "No location match found for display name: Tallinn (Default false)"
    );
}

#[tokio::test]
async fn test_location_lookup_needs_a_filter() {
    let platform = TestPlatform::start().await;
    let source = LocationDataSource::new(platform.client());

    let err = source.read(LocationModel::default()).await.unwrap_err();
    assert!(matches!(err, CloudError::InvalidConfig(_)));
}

#[tokio::test]
async fn test_network_by_name() {
    let platform = TestPlatform::start().await;

    let mut default_network = network_json("n-2", "10.2.0.0/24", &["vm-1"]);
    default_network["is_default"] = json!(true);
    platform
        .get_json(
            "/network/networks",
            json!([network_json("n-1", "10.1.0.0/24", &[]), default_network]),
        )
        .await;

    let source = NetworkDataSource::new(platform.client());

    let network = source
        .read(NetworkModel {
            name: Some("net-n-1".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(network.id.as_deref(), Some("n-1"));
    assert_eq!(network.subnet_ipv4.as_deref(), Some("10.1.0.0/24"));

    let network = source
        .read(NetworkModel {
            is_default: Some(true),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(network.id.as_deref(), Some("n-2"));
    assert_eq!(network.server_uuids, Some(vec!["vm-1".to_string()]));

    let err = source
        .read(NetworkModel {
            id: Some("n-9".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.to_string(), "No network match found for UUID: n-9");
}

#[tokio::test]
async fn test_os_base_image_with_version() {
    let platform = TestPlatform::start().await;
    platform.get_json("/config/vm_images", images()).await;

    let source = OsBaseImageDataSource::new(platform.client());

    let image = source
        .read(OsBaseImageModel {
            os_name: Some("ubuntu".to_string()),
            os_version: Some("22.04".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(image.display_name.as_deref(), Some("Ubuntu"));
    assert_eq!(image.os_version.as_deref(), Some("22.04"));
    assert_eq!(image.is_default, Some(true));
    assert_eq!(image.versions.as_ref().map(Vec::len), Some(2));

    let err = source
        .read(OsBaseImageModel {
            os_name: Some("debian".to_string()),
            os_version: Some("11".to_string()),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(err.to_string().contains("OS name: debian (Version 11)"));
}
